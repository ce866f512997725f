use clap::{Args, Subcommand};

use crate::models::{AggregationMethod, WeightPreference};
use crate::store::DataStore;
use crate::sync::{Companion, DetachedTransport};

/// Per-device user settings, stored with the workout data (not in the
/// config file) so they travel through sync.
#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show current settings
    Show,

    /// Set the preferred weight unit (system, kilograms, pounds)
    Unit { value: String },

    /// Set the preferred trend aggregation (all, median, average, max, min)
    Method { value: String },
}

impl SettingsCommand {
    pub async fn run(
        &self,
        store: &mut DataStore,
        companion: &mut Companion<DetachedTransport>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SettingsSubcommand::Show => {
                let info = &store.user_info;
                println!("weight unit: {} (resolves to {})", info.weight_preference, info.weight_unit());
                println!("aggregation: {}", info.aggregation_method);
                println!("companion installed: {}", info.was_companion_installed);
                Ok(())
            }

            SettingsSubcommand::Unit { value } => {
                let preference = value.parse::<WeightPreference>()?;
                store
                    .update_user_info(|info| info.weight_preference = preference)
                    .await;
                companion.update_user_info(store).await;
                println!("Weight unit preference set to {}", preference);
                Ok(())
            }

            SettingsSubcommand::Method { value } => {
                let method = value.parse::<AggregationMethod>()?;
                store
                    .update_user_info(|info| info.aggregation_method = method)
                    .await;
                companion.update_user_info(store).await;
                println!("Aggregation method set to {}", method);
                Ok(())
            }
        }
    }
}
