//! CityPulse taxonomy command-line entry point
//!
//! Usage:
//!     citypulse-taxonomy --db taxonomy.db seed
//!     citypulse-taxonomy --db taxonomy.db classify traffic "Crash" "Two cars on Main St"
//!     citypulse-taxonomy --db taxonomy.db suggest traffic jam
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use citypulse::{
    ClassifyRequest, DisabledGenerator, EngineConfig, Error, GeminiGenerator, GeneratorConfig,
    TaxonomyEngine, TextGenerator,
};
use citypulse_core::{ClassificationContext, MemoryStore, TaxonomyStore, Topic};
use citypulse_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "citypulse-taxonomy")]
#[command(about = "CityPulse report classification with a dynamic subcategory taxonomy")]
#[command(version)]
struct Args {
    /// SQLite database file (in-memory store when omitted)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the predefined subcategories
    Seed,

    /// Classify a report
    Classify {
        topic: String,
        title: String,
        #[arg(default_value = "")]
        description: String,

        #[arg(long)]
        location: Option<String>,

        /// Minimum model confidence, 0 to 1
        #[arg(long)]
        threshold: Option<f64>,

        /// Ask the model for a new subcategory
        #[arg(long)]
        force_new: bool,
    },

    /// Rank active subcategories against a query
    Suggest { topic: Topic, query: String },

    /// List active subcategories of a topic
    List { topic: Topic },

    /// Record a user's confirmation or rejection
    Feedback {
        id: String,
        #[arg(long, conflicts_with = "reject")]
        confirm: bool,
        #[arg(long)]
        reject: bool,
    },

    /// Usage and quality report across all topics
    Analytics,

    /// Store and generator status
    Health,
}

fn print_json<T: Serialize>(value: &T) -> citypulse::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(db: Option<&PathBuf>) -> citypulse::Result<Arc<dyn TaxonomyStore>> {
    Ok(match db {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    })
}

fn build_generator() -> citypulse::Result<Arc<dyn TextGenerator>> {
    let config = GeneratorConfig::from_env()?;
    if !config.is_configured() {
        info!("no GEMINI_API_KEY set, AI classification disabled");
        return Ok(Arc::new(DisabledGenerator));
    }
    let generator = GeminiGenerator::new(config).map_err(|e| Error::Config(e.to_string()))?;
    Ok(Arc::new(generator))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    citypulse::tracing::init_with_filter(&args.log_level);

    let store = open_store(args.db.as_ref())?;
    let engine = TaxonomyEngine::new(store, build_generator()?, EngineConfig::from_env()?);

    match args.command {
        Command::Seed => print_json(&engine.seed_predefined().await?)?,
        Command::Classify {
            topic,
            title,
            description,
            location,
            threshold,
            force_new,
        } => {
            let mut context = ClassificationContext::new(title, description);
            if let Some(location) = location {
                context = context.with_location(location);
            }
            let mut request = ClassifyRequest::new(topic, context).force_create_new(force_new);
            if let Some(threshold) = threshold {
                request = request.threshold(threshold);
            }
            print_json(&engine.classify(request).await?)?
        }
        Command::Suggest { topic, query } => print_json(&engine.suggest(topic, &query).await?)?,
        Command::List { topic } => print_json(&engine.list_available(topic).await?)?,
        Command::Feedback {
            id,
            confirm,
            reject,
        } => {
            if confirm == reject {
                return Err("pass exactly one of --confirm or --reject".into());
            }
            let found = engine.record_user_feedback(&id, confirm).await?;
            print_json(&serde_json::json!({ "id": id, "recorded": found }))?
        }
        Command::Analytics => print_json(&engine.analytics_report().await?)?,
        Command::Health => print_json(&engine.health_check().await)?,
    }

    Ok(())
}
