use clap::{Args, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::models::{Exercise, Weight, WeightUnit, Workout};
use crate::store::DataStore;
use crate::sync::{Companion, DetachedTransport};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Subcommand)]
pub enum TemplateSubcommand {
    /// Create a new template workout
    Create {
        /// Template name (e.g. "Leg Day")
        name: String,
    },

    /// List template workouts
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a template with its exercises
    Show {
        /// Template name or ID
        template: String,
    },

    /// Add an exercise to a template
    AddExercise {
        /// Template name or ID
        template: String,

        /// Exercise name
        name: String,

        /// Number of planned sets
        #[arg(long, short)]
        sets: u32,

        /// Planned reps per set
        #[arg(long, short)]
        reps: u32,

        /// Planned weight per set
        #[arg(long, short)]
        weight: f64,

        /// Weight unit (kilograms or pounds); defaults to the preferred unit
        #[arg(long, short)]
        unit: Option<String>,
    },

    /// Delete a template workout
    Delete {
        /// Template name or ID
        template: String,
    },

    /// Delete all template workouts
    DeleteAll,
}

impl TemplateCommand {
    pub async fn run(
        &self,
        store: &mut DataStore,
        companion: &mut Companion<DetachedTransport>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TemplateSubcommand::Create { name } => {
                let workout = Workout::new(name.clone());
                store.add_template_workout(workout.clone()).await;
                companion.add_template_workout(store, &workout).await;
                println!("Created template '{}' ({})", workout.name, workout.id);
                Ok(())
            }

            TemplateSubcommand::List { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&store.template_workouts)?);
                    }
                    OutputFormat::Text => {
                        if store.template_workouts.is_empty() {
                            println!("No templates. Create one with: gymtrack template create <name>");
                            return Ok(());
                        }
                        for workout in &store.template_workouts {
                            println!(
                                "{}  {} ({} exercise{})",
                                workout.id,
                                workout.name,
                                workout.exercises.len(),
                                if workout.exercises.len() == 1 { "" } else { "s" }
                            );
                        }
                    }
                }
                Ok(())
            }

            TemplateSubcommand::Show { template } => {
                let workout = resolve_template(store, template)?;
                println!("{} ({})", workout.name, workout.id);
                for exercise in &workout.exercises {
                    match exercise.set_details.first() {
                        Some(plan) => println!(
                            "  {}: {} x {} @ {}",
                            exercise.name,
                            exercise.sets_planned,
                            plan.reps_planned,
                            plan.weight_planned
                        ),
                        None => println!("  {}: {} sets", exercise.name, exercise.sets_planned),
                    }
                }
                Ok(())
            }

            TemplateSubcommand::AddExercise {
                template,
                name,
                sets,
                reps,
                weight,
                unit,
            } => {
                if *sets == 0 {
                    return Err("Number of sets must be positive".into());
                }
                let unit = match unit {
                    Some(unit) => unit.parse::<WeightUnit>()?,
                    None => store.user_info.weight_unit(),
                };
                let mut workout = resolve_template(store, template)?.clone();
                workout.add(Exercise::new(name.clone(), *sets, *reps, Weight::new(*weight, unit)));
                store.update_template_workout(&workout).await?;
                companion.update_template_workout(store, &workout).await;
                println!("Added {} to '{}'", name, workout.name);
                Ok(())
            }

            TemplateSubcommand::Delete { template } => {
                let workout = resolve_template(store, template)?.clone();
                store.delete_template_workout(workout.id).await;
                companion.delete_template_workout(store, &workout).await;
                println!("Deleted template '{}'", workout.name);
                Ok(())
            }

            TemplateSubcommand::DeleteAll => {
                let count = store.template_workouts.len();
                store.delete_all_template_workouts().await;
                companion.delete_all_template_workouts(store).await;
                println!("Deleted {} template{}", count, if count == 1 { "" } else { "s" });
                Ok(())
            }
        }
    }
}

/// Finds a template by ID or name.
pub fn resolve_template<'a>(
    store: &'a DataStore,
    reference: &str,
) -> Result<&'a Workout, String> {
    if let Ok(id) = Uuid::parse_str(reference) {
        if let Some(workout) = store.template_workouts.iter().find(|w| w.id == id) {
            return Ok(workout);
        }
    }
    store
        .template_workouts
        .iter()
        .find(|w| w.name == reference)
        .ok_or_else(|| format!("Template not found: {}", reference))
}
