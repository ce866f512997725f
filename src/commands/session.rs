use chrono::Utc;
use clap::{Args, Subcommand};

use crate::models::{ExerciseWeightsCache, Weight, WeightUnit, Workout};
use crate::stopwatch::format_mm_ss;
use crate::store::DataStore;
use crate::sync::{Companion, DetachedTransport};

use super::template::resolve_template;

#[derive(Args)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Start a workout session from a template
    Start {
        /// Template name or ID; defaults to the first template
        template: Option<String>,
    },

    /// Show the in-progress session
    Status,

    /// Record a completed set for an exercise in the session
    CompleteSet {
        /// Exercise name
        exercise: String,

        /// Reps performed
        #[arg(long, short)]
        reps: u32,

        /// Weight used
        #[arg(long, short)]
        weight: f64,

        /// Weight unit (kilograms or pounds); defaults to the preferred unit
        #[arg(long, short)]
        unit: Option<String>,
    },

    /// End the session, recording it as a historical workout
    Finish,

    /// Discard the in-progress session
    Cancel,
}

impl SessionCommand {
    pub async fn run(
        &self,
        store: &mut DataStore,
        companion: &mut Companion<DetachedTransport>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SessionSubcommand::Start { template } => {
                if let Some(active) = store.active_session().await? {
                    return Err(format!(
                        "A session of '{}' is already in progress. Finish or cancel it first.",
                        active.name
                    )
                    .into());
                }

                let template = match template {
                    Some(reference) => resolve_template(store, reference)?,
                    None => store
                        .suggested_template()
                        .ok_or("No templates. Create one with: gymtrack template create <name>")?,
                };

                let mut session = template.clean_copy();
                session.start();
                store.begin_session(&session).await;
                println!("Started '{}'. Record sets with: gymtrack session complete-set", session.name);
                Ok(())
            }

            SessionSubcommand::Status => {
                let session = require_active(store).await?;
                let elapsed = session
                    .start_time
                    .map(|start| (Utc::now() - start).to_std().unwrap_or_default())
                    .unwrap_or_default();
                println!("{} — elapsed {}", session.name, format_mm_ss(elapsed));
                for exercise in &session.exercises {
                    println!(
                        "  {}: {}/{} sets",
                        exercise.name, exercise.sets_done, exercise.sets_planned
                    );
                }
                Ok(())
            }

            SessionSubcommand::CompleteSet {
                exercise,
                reps,
                weight,
                unit,
            } => {
                let mut session = require_active(store).await?;
                let unit = match unit {
                    Some(unit) => unit.parse::<WeightUnit>()?,
                    None => store.user_info.weight_unit(),
                };
                let target = session
                    .exercises
                    .iter_mut()
                    .find(|e| e.name == *exercise)
                    .ok_or_else(|| format!("No exercise '{}' in this session", exercise))?;

                target.add_set(*reps, Weight::new(*weight, unit));
                let done = target.sets_done;
                let planned = target.sets_planned;
                store.save_session(&session).await;
                println!("{}: set {}/{} done", exercise, done, planned);
                Ok(())
            }

            SessionSubcommand::Finish => {
                let mut session = require_active(store).await?;
                session.end();
                store.complete_session(session.clone()).await;
                companion.add_historical_workout(store, &session).await;

                // Fold this session's completed weights into the caches and
                // tell the counterpart.
                for exercise in &session.exercises {
                    if exercise.sets_done == 0 {
                        continue;
                    }
                    let partial = ExerciseWeightsCache::from_exercise(exercise);
                    store.merge_weights_cache(&partial).await;
                    companion.update_weights_cache(store, &partial).await;
                }

                println!("Finished '{}'.", session.name);
                Ok(())
            }

            SessionSubcommand::Cancel => {
                let session = require_active(store).await?;
                store.discard_session(session.id).await;
                println!("Discarded session of '{}'.", session.name);
                Ok(())
            }
        }
    }
}

async fn require_active(store: &DataStore) -> Result<Workout, Box<dyn std::error::Error>> {
    Ok(store
        .active_session()
        .await?
        .ok_or("No session in progress. Start one with: gymtrack session start")?)
}
