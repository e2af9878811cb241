mod report;
mod rescore;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catmatch-cli")]
#[command(about = "Cross-catalog product matching and price-anomaly tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Find the best mytek candidates for a reference and/or name
    Match {
        #[arg(long)]
        reference: Option<String>,

        #[arg(long)]
        name: Option<String>,

        /// Maximum results; negative values are treated as 0
        #[arg(long, allow_negative_numbers = true)]
        top_n: Option<i64>,

        /// Minimum fused score, between 0 and 1
        #[arg(long)]
        min_confidence: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// List the highest-scoring stored pairs
    Top {
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },
    /// List groups of entries that describe the same product
    Duplicates {
        /// Similarity a pair must exceed, between 0 and 1
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// List matched pairs whose prices disagree
    Anomalies {
        /// Similarity a pair must exceed, between 0 and 1
        #[arg(long)]
        similarity_threshold: Option<f64>,

        /// Price gap a pair must exceed, in percent
        #[arg(long)]
        price_threshold: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// Search both catalogs by reference substring
    Search {
        query: String,

        #[arg(long)]
        json: bool,
    },
    /// Print dashboard statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Refresh the cached similarity scores
    Rescore {
        /// Recompute every entry, not just those with missing scores
        #[arg(long)]
        force: bool,

        /// Compute scores without writing them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("catmatch-cli ready; run with --help to list commands");
        return Ok(());
    };

    let config = catmatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Commands validate their arguments before the first query opens a connection.
    let pool = catmatch_db::connect_lazy_from_app_config(&config)?;

    let policy = || catmatch_core::load_policy(&config.policy_path);
    match command {
        Commands::Db { command } => run_db(&pool, command).await,
        Commands::Match {
            reference,
            name,
            top_n,
            min_confidence,
            json,
        } => {
            report::run_match(
                &pool,
                &policy()?,
                report::MatchRequest {
                    reference,
                    name,
                    top_n,
                    min_confidence,
                },
                json,
            )
            .await
        }
        Commands::Top { limit, json } => report::run_top(&pool, &policy()?, limit, json).await,
        Commands::Duplicates { threshold, json } => {
            report::run_duplicates(&pool, &policy()?, threshold, json).await
        }
        Commands::Anomalies {
            similarity_threshold,
            price_threshold,
            json,
        } => {
            report::run_anomalies(
                &pool,
                &policy()?,
                similarity_threshold,
                price_threshold,
                json,
            )
            .await
        }
        Commands::Search { query, json } => report::run_search(&pool, &query, json).await,
        Commands::Stats { json } => report::run_stats(&pool, &policy()?, json).await,
        Commands::Rescore { force, dry_run } => {
            rescore::run_rescore(&pool, &policy()?, force, dry_run).await
        }
    }
}

async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            catmatch_db::health_check(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = catmatch_db::run_migrations(pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
