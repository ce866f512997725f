use clap::{Args, Subcommand};

use crate::store::DataStore;
use crate::sync::{Companion, DetachedTransport};

use super::template::OutputFormat;

#[derive(Args)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub command: HistorySubcommand,
}

#[derive(Subcommand)]
pub enum HistorySubcommand {
    /// List completed workouts, most recent first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show at most this many workouts
        #[arg(long, short, default_value_t = 20)]
        limit: usize,
    },

    /// Delete all completed workouts
    Clear,
}

impl HistoryCommand {
    pub async fn run(
        &self,
        store: &mut DataStore,
        companion: &mut Companion<DetachedTransport>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            HistorySubcommand::List { format, limit } => {
                let workouts: Vec<_> = store.historical_workouts.iter().take(*limit).collect();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => {
                        if workouts.is_empty() {
                            println!("No completed workouts yet.");
                            return Ok(());
                        }
                        for workout in workouts {
                            let completed_sets: u32 =
                                workout.exercises.iter().map(|e| e.sets_done).sum();
                            let ended = workout
                                .end_time
                                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                                .unwrap_or_else(|| "?".to_string());
                            println!(
                                "{}  {} ({} set{} across {} exercise{})",
                                ended,
                                workout.name,
                                completed_sets,
                                if completed_sets == 1 { "" } else { "s" },
                                workout.exercises.len(),
                                if workout.exercises.len() == 1 { "" } else { "s" }
                            );
                        }
                    }
                }
                Ok(())
            }

            HistorySubcommand::Clear => {
                let count = store.historical_workouts.len();
                store.delete_all_historical_workouts().await;
                companion.delete_all_historical_workouts(store).await;
                println!("Deleted {} workout{}", count, if count == 1 { "" } else { "s" });
                Ok(())
            }
        }
    }
}
