// ABOUTME: Gymtrack CLI - command-line front end for the workout tracking client
// ABOUTME: Handles sign-in, templates, running a workout session, summaries, and history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors
//!
//! Usage:
//! ```bash
//! # Sign in (the session is persisted under the user config directory)
//! gymtrack-cli sign-in --email lifter@example.com --password secret
//!
//! # Browse templates and start one
//! gymtrack-cli templates
//! gymtrack-cli workout start 6f1c...
//!
//! # Log 100 kg x 5 on the first exercise, then rest
//! gymtrack-cli workout log 1 --weight 100 --reps 5
//! gymtrack-cli workout rest --slot 1
//!
//! # Finish and review
//! gymtrack-cli workout finish
//! gymtrack-cli history
//!
//! # Run a whole session offline
//! gymtrack-cli demo
//! ```

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use gymtrack::{
    client::GymtrackClient,
    config::ClientConfig,
    constants::limits::DEFAULT_HISTORY_LIMIT,
    errors::{AppError, AppResult},
    logging::LoggingConfig,
};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use commands::workout::SetArgs;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "gymtrack-cli",
    about = "Gymtrack workout tracking CLI",
    long_about = "Command-line client for templates, live workout sessions, and workout history."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Session file override
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Sign out and forget the stored session
    SignOut,

    /// Show the signed-in profile
    Whoami,

    /// Edit the profile
    Profile {
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// Weight unit (kg or lbs)
        #[arg(long)]
        unit: Option<String>,
    },

    /// List your workout templates
    Templates,

    /// Show one template with its exercises
    Template {
        template_id: Uuid,
    },

    /// Exercise catalog
    Exercises {
        #[command(subcommand)]
        action: ExerciseCommand,
    },

    /// Active workout session
    Workout {
        #[command(subcommand)]
        action: WorkoutCommand,
    },

    /// Summary of a finished workout
    Summary {
        workout_id: Uuid,
    },

    /// Completed workouts, newest first
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Run a full session against in-memory services
    Demo,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ExerciseCommand {
    /// Search by name
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Exercises working a muscle group
    Muscle {
        group: String,
    },

    /// Swap candidates for an exercise
    Alternatives {
        exercise_id: Uuid,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum WorkoutCommand {
    /// Start a workout from a template
    Start {
        template_id: Uuid,
    },

    /// Show the workout in progress
    Status,

    /// Log a set on exercise SLOT (1-based)
    Log {
        slot: usize,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        rpe: Option<f64>,
        #[arg(long)]
        warmup: bool,
        #[arg(long)]
        failure: bool,
        #[arg(long)]
        dropset: bool,
    },

    /// Change a logged set
    Edit {
        set_id: Uuid,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        reps: Option<u32>,
        #[arg(long)]
        rpe: Option<f64>,
    },

    /// Delete a logged set
    DeleteSet {
        set_id: Uuid,
    },

    /// Replace the exercise of SLOT
    Swap {
        slot: usize,
        exercise_id: Uuid,
    },

    /// Sets from the last time SLOT's exercise was done
    Previous {
        slot: usize,
    },

    /// Rest timer
    Rest {
        /// Use this exercise's rest time
        #[arg(long)]
        slot: Option<usize>,
        /// Explicit duration
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Finish the workout
    Finish,

    /// Give up the workout
    Abandon,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging
        .init()
        .map_err(|e| AppError::config(format!("Failed to initialize logging: {e:#}")))?;

    if matches!(cli.command, Command::Demo) {
        return commands::demo::run().await;
    }

    let mut config =
        ClientConfig::from_env().map_err(|e| AppError::config(format!("{e:#}")))?;
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    debug!("{}", config.summary());

    let client = GymtrackClient::connect(&config)?;
    client.auth().initialize().await?;

    match cli.command {
        Command::SignIn { email, password } => {
            commands::account::sign_in(&client, &email, &password).await?;
        }
        Command::SignUp {
            email,
            password,
            name,
        } => {
            commands::account::sign_up(&client, &email, &password, name.as_deref()).await?;
        }
        Command::SignOut => commands::account::sign_out(&client).await?,
        Command::Whoami => commands::account::whoami(&client).await?,
        Command::Profile { name, unit } => {
            commands::account::update_profile(&client, name, unit).await?;
        }
        Command::Templates => commands::catalog::templates(&client).await?,
        Command::Template { template_id } => {
            commands::catalog::template_detail(&client, template_id).await?;
        }
        Command::Exercises { action } => match action {
            ExerciseCommand::Search { query, limit } => {
                commands::catalog::search(&client, &query, limit).await?;
            }
            ExerciseCommand::Muscle { group } => {
                commands::catalog::by_muscle(&client, &group).await?;
            }
            ExerciseCommand::Alternatives { exercise_id } => {
                commands::catalog::alternatives(&client, exercise_id).await?;
            }
        },
        Command::Workout { action } => match action {
            WorkoutCommand::Start { template_id } => {
                commands::workout::start(&client, template_id).await?;
            }
            WorkoutCommand::Status => commands::workout::status(&client).await?,
            WorkoutCommand::Log {
                slot,
                weight,
                reps,
                rpe,
                warmup,
                failure,
                dropset,
            } => {
                let set = SetArgs {
                    weight,
                    reps,
                    rpe,
                    warmup,
                    failure,
                    dropset,
                };
                commands::workout::log(&client, slot, set).await?;
            }
            WorkoutCommand::Edit {
                set_id,
                weight,
                reps,
                rpe,
            } => {
                commands::workout::edit(&client, set_id, weight, reps, rpe).await?;
            }
            WorkoutCommand::DeleteSet { set_id } => {
                commands::workout::delete_set(&client, set_id).await?;
            }
            WorkoutCommand::Swap { slot, exercise_id } => {
                commands::workout::swap(&client, slot, exercise_id).await?;
            }
            WorkoutCommand::Previous { slot } => {
                commands::workout::previous(&client, slot).await?;
            }
            WorkoutCommand::Rest { slot, seconds } => {
                commands::workout::rest(&client, slot, seconds).await?;
            }
            WorkoutCommand::Finish => commands::workout::finish(&client).await?,
            WorkoutCommand::Abandon => commands::workout::abandon(&client).await?,
        },
        Command::Summary { workout_id } => commands::review::summary(&client, workout_id).await?,
        Command::History { limit } => commands::review::history(&client, limit).await?,
        Command::Demo => {}
    }

    Ok(())
}
