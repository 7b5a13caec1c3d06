//! tutorlens CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tutorlens_core::{Category, Difficulty, LearnerProfile};

mod commands;

#[derive(Parser)]
#[command(
    name = "tutorlens",
    version,
    about = "Student task-correctness prediction and learner profiling"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Telemetry for one interaction. Defaults are the usual starting values.
#[derive(Args, Debug, Clone)]
pub struct FeatureArgs {
    #[arg(long, default_value_t = 5.0)]
    hint_count: f64,
    #[arg(long, default_value_t = 5.0)]
    bottom_hint: f64,
    #[arg(long, default_value_t = 3.0)]
    attempt_count: f64,
    /// Milliseconds until the first response
    #[arg(long, default_value_t = 800.0)]
    ms_first_response: f64,
    /// Time on task in milliseconds
    #[arg(long, default_value_t = 1000.0)]
    duration: f64,
    /// Average frustrated confidence, 0-1
    #[arg(long, default_value_t = 0.2)]
    frustrated: f64,
    /// Average confused confidence, 0-1
    #[arg(long, default_value_t = 0.2)]
    confused: f64,
    /// Average concentrating confidence, 0-1
    #[arg(long, default_value_t = 0.6)]
    concentrating: f64,
    /// Average bored confidence, 0-1
    #[arg(long, default_value_t = 0.1)]
    bored: f64,
    #[arg(long, default_value_t = 0.5)]
    action_count: f64,
    #[arg(long, default_value_t = 0.2)]
    hint_dependency: f64,
    #[arg(long, default_value_t = 900.0)]
    response_speed: f64,
    #[arg(long, default_value_t = 0.5)]
    confidence_balance: f64,
    #[arg(long, default_value_t = 0.5)]
    engagement_ratio: f64,
    #[arg(long, default_value_t = 0.5)]
    efficiency_indicator: f64,

    /// Compute the five engineered features from the raw signals instead
    /// of taking them from the command line
    #[arg(long)]
    derive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one interaction and record it in the prediction log
    Predict {
        /// Student identifier
        #[arg(long)]
        student: String,

        /// Grade level (e.g. "Grade 7")
        #[arg(long)]
        grade: Option<String>,

        /// Subject
        #[arg(long)]
        subject: Option<String>,

        #[command(flatten)]
        features: FeatureArgs,

        /// Also generate a practice quiz at the mapped difficulty
        #[arg(long)]
        quiz: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a student's prediction history, newest first
    History {
        /// Student identifier
        #[arg(long)]
        student: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Classroom overview of each student's latest prediction
    Dashboard {
        /// Only this performance category (e.g. "below-average")
        #[arg(long)]
        category: Option<Category>,

        /// Only this learner profile (e.g. "Confused Learner")
        #[arg(long)]
        profile: Option<LearnerProfile>,

        /// Only this subject
        #[arg(long)]
        subject: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate a practice quiz
    Quiz {
        #[arg(long)]
        grade: String,

        #[arg(long)]
        subject: String,

        /// Explicit difficulty (easy, medium, hard)
        #[arg(long, conflicts_with = "score")]
        difficulty: Option<Difficulty>,

        /// Derive the difficulty from a correctness score
        #[arg(long, required_unless_present = "difficulty")]
        score: Option<f64>,

        /// Number of questions (defaults to the configured count)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Delete every recorded prediction
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Create a starter config and scoring model
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tutorlens=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Predict {
            student,
            grade,
            subject,
            features,
            quiz,
            format,
        } => {
            commands::predict::execute(student, grade, subject, features, quiz, format, config)
                .await
        }
        Commands::History { student, format } => {
            commands::history::execute(student, format, config)
        }
        Commands::Dashboard {
            category,
            profile,
            subject,
            format,
        } => commands::dashboard::execute(category, profile, subject, format, config),
        Commands::Quiz {
            grade,
            subject,
            difficulty,
            score,
            count,
        } => commands::quiz::execute(grade, subject, difficulty, score, count, config).await,
        Commands::Reset { yes } => commands::reset::execute(yes, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
