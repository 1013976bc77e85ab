//! flexifit - workout feedback scoring and progression tracking

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tokio::io::BufReader;
use tracing::info;

use flexifit::config::{AnalyzerConfig, DEFAULT_BASELINE_FATIGUE};
use flexifit::ml::{FeedbackAnalyzer, ScoringSample};
use flexifit::profile::UserProfile;
use flexifit::store::FitnessUser;
use flexifit::service::{self, FeedbackService};

#[derive(Parser)]
#[command(name = "flexifit")]
#[command(author, version, about = "Workout feedback scoring, progression tiers and deload signals")]
struct Cli {
    /// JSON file with scoring weights and deload window
    #[arg(long, env = "FLEXIFIT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Number of recent submissions the deload check looks at
    #[arg(long, env = "FLEXIFIT_DELOAD_WINDOW", global = true)]
    deload_window: Option<usize>,

    /// Id of the user registered at startup
    #[arg(long, env = "FLEXIFIT_DEFAULT_USER", default_value = "user1", global = true)]
    user: String,

    /// Experience tier of the startup user
    #[arg(long, env = "FLEXIFIT_DEFAULT_EXPERIENCE", default_value = "intermediate", global = true)]
    experience: String,

    /// JSON profile of an extra user, registered under its numeric id
    #[arg(long, env = "FLEXIFIT_PROFILE", global = true)]
    profile: Option<PathBuf>,

    /// Baseline fatigue of the startup user
    #[arg(long, env = "FLEXIFIT_BASELINE_FATIGUE", default_value_t = DEFAULT_BASELINE_FATIGUE, global = true)]
    baseline_fatigue: f64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Ratings {
    #[arg(long)]
    fatigue: f64,

    #[arg(long)]
    intensity: f64,

    #[arg(long)]
    adherence: f64,

    #[arg(long)]
    difficulty: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one sample and classify it, without history
    Score {
        #[command(flatten)]
        ratings: Ratings,
    },

    /// Submit one feedback request for the startup user
    Submit {
        #[command(flatten)]
        ratings: Ratings,
    },

    /// Replay a file of JSON-lines requests and print the replies
    Replay {
        /// Requests, one JSON object per line
        file: PathBuf,
    },

    /// Answer JSON-lines requests from stdin
    Serve,
}

fn load_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(window) = cli.deload_window {
        config.deload_window = window;
    }
    config.validate()?;
    Ok(config)
}

fn load_profile(path: &PathBuf) -> Result<FitnessUser> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    let profile: UserProfile = serde_json::from_str(&contents)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    Ok(FitnessUser::new(profile))
}

/// Startup user plus the profile user, if one was given
fn build_service(cli: &Cli, config: AnalyzerConfig) -> Result<FeedbackService> {
    let mut feedback = FeedbackService::with_user(config, &cli.user, &cli.experience, cli.baseline_fatigue)?;
    if let Some(path) = &cli.profile {
        let user = load_profile(path)?;
        feedback.register_profile(user.profile(), cli.baseline_fatigue)?;
    }
    Ok(feedback)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // stdout carries replies, logs go to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Some(Commands::Score { ratings }) => {
            let analyzer = FeedbackAnalyzer::with_config(&cli.experience, cli.baseline_fatigue, config);
            let sample = ScoringSample::from_ratings(
                ratings.fatigue,
                ratings.intensity,
                ratings.adherence,
                ratings.difficulty,
            );
            let score = analyzer.compute_score(&sample);
            let progression = analyzer.classify_progression(score)?;
            println!("{}", json!({ "score": score, "progression": progression }));
        }

        Some(Commands::Submit { ratings }) => {
            let mut feedback = FeedbackService::with_user(config, &cli.user, &cli.experience, cli.baseline_fatigue)?;
            let payload = json!({
                "user_id": cli.user,
                "fatigue": ratings.fatigue,
                "intensity": ratings.intensity,
                "adherence": ratings.adherence,
                "difficulty": ratings.difficulty,
            });
            let verdict = feedback.submit(&payload)?;
            println!("{}", service::success_reply(&verdict));
        }

        Some(Commands::Replay { file }) => {
            let mut feedback = build_service(&cli, config)?;
            let requests = std::fs::read_to_string(file)
                .with_context(|| format!("reading requests {}", file.display()))?;

            let mut replayed = 0;
            for line in requests.lines() {
                if let Some(reply) = feedback.handle_line(line) {
                    println!("{}", reply);
                    replayed += 1;
                }
            }
            info!("Replayed {} requests from {}", replayed, file.display());

            for user_id in feedback.user_ids() {
                let submissions = feedback.analyzer(user_id).map_or(0, |a| a.history().len());
                let trend = feedback.trend(user_id)?;
                println!(
                    "{}",
                    json!({
                        "user_id": user_id,
                        "submissions": submissions,
                        "trend": trend,
                    })
                );
            }
        }

        Some(Commands::Serve) | None => {
            let mut feedback = build_service(&cli, config)?;
            let stdin = BufReader::new(tokio::io::stdin());
            service::serve(&mut feedback, stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}
