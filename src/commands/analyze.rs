use clap::{Args, Subcommand};

use crate::analyzer::Analyzer;
use crate::models::AggregationMethod;
use crate::store::DataStore;

use super::template::OutputFormat;

#[derive(Args)]
pub struct AnalyzeCommand {
    #[command(subcommand)]
    pub command: AnalyzeSubcommand,
}

#[derive(Subcommand)]
pub enum AnalyzeSubcommand {
    /// Show the weight trend for an exercise
    Trend {
        /// Exercise name
        exercise: String,

        /// Aggregation per session (all, median, average, max, min);
        /// defaults to the preferred method
        #[arg(long, short)]
        method: Option<String>,

        /// Number of recent workouts to scan
        #[arg(long, short, default_value_t = 10)]
        limit: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List exercises appearing in history
    Exercises,
}

impl AnalyzeCommand {
    pub fn run(&self, store: &DataStore) -> Result<(), Box<dyn std::error::Error>> {
        let analyzer = Analyzer::new(store);
        match &self.command {
            AnalyzeSubcommand::Trend {
                exercise,
                method,
                limit,
                format,
            } => {
                let method = match method {
                    Some(method) => method.parse::<AggregationMethod>()?,
                    None => store.user_info.aggregation_method,
                };
                let trend = analyzer.weight_trend(exercise, method, *limit);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&trend)?);
                    }
                    OutputFormat::Text => {
                        if trend.is_empty() {
                            println!("No completed sets recorded for '{}'.", exercise);
                            return Ok(());
                        }
                        println!("{} ({}, most recent first):", exercise, method);
                        for weight in &trend {
                            println!("  {}", weight);
                        }
                    }
                }
                Ok(())
            }

            AnalyzeSubcommand::Exercises => {
                let names = analyzer.exercise_names();
                if names.is_empty() {
                    println!("No completed workouts yet.");
                } else {
                    for name in names {
                        println!("{}", name);
                    }
                }
                Ok(())
            }
        }
    }
}
