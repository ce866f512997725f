//! The sync coordinator: propagates local mutations to the paired device
//! and applies inbound instructions to the local store.
//!
//! Outbound protocol, in order:
//! 1. no counterpart installed — drop silently, there is nothing to sync to;
//! 2. session not activated — append to the durable pending queue; the
//!    queue is flushed FIFO once activation completes;
//! 3. activated and reachable — immediate unacknowledged send;
//! 4. send failure or unreachable — durable best-effort transfer (the
//!    transport stores and forwards).
//!
//! Inbound frames are decoded into typed instructions and dispatched with
//! role gating: template operations and the snapshot reply apply on the
//! companion device, the snapshot request is answered by the primary, and
//! historical/cache/user-info operations apply on both.

use std::fmt;

use crate::models::Workout;
use crate::store::DataStore;

use super::error::SyncError;
use super::instruction::Instruction;
use super::transport::Transport;

/// Which side of the pairing this device is.
///
/// The primary is the source of template operations and answers the
/// one-time snapshot request; the companion issues that request when it
/// first comes online.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    Primary,
    Companion,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Primary => write!(f, "primary"),
            DeviceRole::Companion => write!(f, "companion"),
        }
    }
}

impl std::str::FromStr for DeviceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(DeviceRole::Primary),
            "companion" => Ok(DeviceRole::Companion),
            other => Err(format!(
                "Invalid device role '{}'. Use primary or companion.",
                other
            )),
        }
    }
}

pub struct Companion<T: Transport> {
    pub transport: T,
    role: DeviceRole,
}

impl<T: Transport> Companion<T> {
    pub fn new(transport: T, role: DeviceRole) -> Self {
        Self { transport, role }
    }

    pub fn role(&self) -> DeviceRole {
        self.role
    }

    // Outbound notifications

    pub async fn add_template_workout(&mut self, store: &mut DataStore, workout: &Workout) {
        self.send(store, Instruction::AddTemplateWorkout(workout.clone()))
            .await;
    }

    pub async fn update_template_workout(&mut self, store: &mut DataStore, workout: &Workout) {
        self.send(store, Instruction::UpdateTemplateWorkout(workout.clone()))
            .await;
    }

    pub async fn delete_template_workout(&mut self, store: &mut DataStore, workout: &Workout) {
        self.send(store, Instruction::DeleteTemplateWorkout { id: workout.id })
            .await;
    }

    pub async fn delete_all_template_workouts(&mut self, store: &mut DataStore) {
        self.send(store, Instruction::DeleteAllTemplateWorkouts {})
            .await;
    }

    pub async fn add_historical_workout(&mut self, store: &mut DataStore, workout: &Workout) {
        self.send(store, Instruction::AddHistoricalWorkout(workout.clone()))
            .await;
    }

    pub async fn delete_all_historical_workouts(&mut self, store: &mut DataStore) {
        self.send(store, Instruction::DeleteAllHistoricalWorkouts {})
            .await;
    }

    pub async fn update_user_info(&mut self, store: &mut DataStore) {
        let info = store.user_info.clone();
        self.send(store, Instruction::UpdateUserInfo(info)).await;
    }

    pub async fn update_weights_cache(
        &mut self,
        store: &mut DataStore,
        cache: &crate::models::ExerciseWeightsCache,
    ) {
        self.send(store, Instruction::UpdateExerciseWeightsCache(cache.clone()))
            .await;
    }

    // Send path

    pub async fn send(&mut self, store: &mut DataStore, instruction: Instruction) {
        // Nothing to sync to.
        if !self.transport.counterpart_installed() {
            return;
        }

        // Hold the instruction durably until the session activates.
        if !self.transport.is_activated() {
            store.add_pending_instruction(instruction).await;
            return;
        }

        let frame = match instruction.encode() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode {} instruction: {}", instruction.operation(), e);
                return;
            }
        };

        if self.transport.is_reachable() {
            if let Err(e) = self.transport.send_message(&frame).await {
                tracing::warn!("Send failed, using durable fallback: {}", e);
                self.transfer_fallback(&frame).await;
            }
        } else {
            self.transfer_fallback(&frame).await;
        }
    }

    async fn transfer_fallback(&mut self, frame: &str) {
        if let Err(e) = self.transport.transfer(frame).await {
            tracing::warn!("Durable transfer failed: {}", e);
        }
    }

    /// Sends every queued instruction, oldest first. Instructions that
    /// still cannot be sent re-enter the queue via the send path.
    pub async fn flush_pending(&mut self, store: &mut DataStore) {
        for pending in store.take_pending_instructions().await {
            self.send(store, pending.instruction).await;
        }
    }

    // Session events

    /// Called once the transport session finishes activating.
    pub async fn on_activated(&mut self, store: &mut DataStore) {
        match self.role {
            DeviceRole::Primary => self.flush_pending(store).await,
            DeviceRole::Companion => {
                if !store.user_info.was_companion_installed {
                    if let Err(e) = self.request_all_workouts(store).await {
                        tracing::warn!("Initial full sync failed: {}", e);
                    }
                } else {
                    self.flush_pending(store).await;
                }
            }
        }
    }

    pub async fn on_reachability_changed(&mut self, store: &mut DataStore, reachable: bool) {
        tracing::debug!("Session reachability changed: {}", reachable);
        if self.role == DeviceRole::Companion
            && reachable
            && !store.user_info.was_companion_installed
        {
            if let Err(e) = self.request_all_workouts(store).await {
                tracing::warn!("Initial full sync failed: {}", e);
            }
        }
    }

    // Initial full sync

    /// Pulls the full snapshot from the primary. A no-op until the primary
    /// is reachable; retried from `on_reachability_changed`.
    pub async fn request_all_workouts(&mut self, store: &mut DataStore) -> Result<(), SyncError> {
        if !self.transport.is_reachable() {
            return Ok(());
        }
        let frame = Instruction::RequestAllWorkouts {}.encode()?;
        let reply = self.transport.request(&frame).await?;
        self.handle_frame(store, &reply).await
    }

    /// Builds the snapshot reply to an inbound request frame.
    pub async fn reply_frame(
        &mut self,
        store: &mut DataStore,
        frame: &str,
    ) -> Result<String, SyncError> {
        let instruction = Instruction::decode(frame)?;
        match instruction {
            Instruction::RequestAllWorkouts {} if self.role == DeviceRole::Primary => {
                let mut workouts = store.template_workouts.clone();
                workouts.extend(store.historical_workouts.iter().cloned());
                Ok(Instruction::ReplyWithAllWorkouts { workouts }.encode()?)
            }
            other => Err(SyncError::UnexpectedInstruction {
                operation: other.operation(),
                role: self.role,
            }),
        }
    }

    // Inbound dispatch

    pub async fn handle_frame(&mut self, store: &mut DataStore, frame: &str) -> Result<(), SyncError> {
        let instruction = Instruction::decode(frame)?;
        self.apply(store, instruction).await
    }

    pub async fn apply(
        &mut self,
        store: &mut DataStore,
        instruction: Instruction,
    ) -> Result<(), SyncError> {
        match (self.role, instruction) {
            // Applied on either side
            (_, Instruction::AddHistoricalWorkout(workout)) => {
                store.add_historical_workout(workout).await;
                Ok(())
            }
            (_, Instruction::UpdateExerciseWeightsCache(cache)) => {
                store.merge_weights_cache(&cache).await;
                Ok(())
            }
            (_, Instruction::UpdateUserInfo(info)) => {
                store.update_user_info(|local| local.apply(&info)).await;
                Ok(())
            }

            // Template operations flow primary -> companion
            (DeviceRole::Companion, Instruction::AddTemplateWorkout(workout)) => {
                store.add_template_workout(workout).await;
                Ok(())
            }
            (DeviceRole::Companion, Instruction::UpdateTemplateWorkout(workout)) => {
                store.update_template_workout(&workout).await?;
                Ok(())
            }
            (DeviceRole::Companion, Instruction::DeleteTemplateWorkout { id }) => {
                store.delete_template_workout(id).await;
                Ok(())
            }
            (DeviceRole::Companion, Instruction::DeleteAllTemplateWorkouts {}) => {
                store.delete_all_template_workouts().await;
                Ok(())
            }
            (DeviceRole::Companion, Instruction::DeleteAllHistoricalWorkouts {}) => {
                store.delete_all_historical_workouts().await;
                Ok(())
            }
            (DeviceRole::Companion, Instruction::ReplyWithAllWorkouts { workouts }) => {
                for workout in workouts {
                    if workout.is_template {
                        store.add_template_workout(workout).await;
                    } else {
                        store.add_historical_workout(workout).await;
                    }
                }
                // The one-time convergence is done; from now on this device
                // syncs incrementally, and the primary learns that too.
                store
                    .update_user_info(|info| info.was_companion_installed = true)
                    .await;
                self.update_user_info(store).await;
                Ok(())
            }

            (role, other) => Err(SyncError::UnexpectedInstruction {
                operation: other.operation(),
                role,
            }),
        }
    }
}
