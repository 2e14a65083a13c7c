use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

mod comms;
mod config;
mod db;
mod drivers;
mod features;
mod models;
mod pipeline;
mod playbook;
mod redact;
mod report;
mod scoring;

use config::Config;
use models::{AnalysisResult, TicketRecord, UsageRecord};

#[derive(Parser)]
#[command(name = "renewal-risk-radar")]
#[command(about = "Customer renewal risk scoring for success teams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic demo data
    Seed,
    /// Import usage and ticket rows from CSV files
    Import {
        #[arg(long)]
        account: String,
        #[arg(long)]
        usage: Option<PathBuf>,
        #[arg(long)]
        tickets: Option<PathBuf>,
    },
    /// Score renewal risk for an account
    Score {
        #[arg(long)]
        account: String,
        #[arg(long)]
        usage: Option<PathBuf>,
        #[arg(long)]
        tickets: Option<PathBuf>,
        #[arg(long)]
        notes: Option<PathBuf>,
        /// Print the full analysis as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Persist the analysis for later retrieval
        #[arg(long)]
        store: bool,
    },
    /// Generate a markdown report for an account
    Report {
        #[arg(long)]
        account: String,
        #[arg(long)]
        usage: Option<PathBuf>,
        #[arg(long)]
        tickets: Option<PathBuf>,
        #[arg(long)]
        notes: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List stored analyses
    List {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Show one stored analysis as JSON
    Show {
        #[arg(long)]
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .context("invalid RISK_RADAR_LOG filter")?,
        )
        .init();

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import {
            account,
            usage,
            tickets,
        } => {
            if usage.is_none() && tickets.is_none() {
                anyhow::bail!("nothing to import: pass --usage and/or --tickets");
            }
            let pool = connect(&config).await?;
            if let Some(path) = usage {
                let inserted = db::import_usage_csv(&pool, &account, &path).await?;
                println!("Inserted {inserted} usage rows from {}.", path.display());
            }
            if let Some(path) = tickets {
                let inserted = db::import_tickets_csv(&pool, &account, &path).await?;
                println!("Inserted {inserted} tickets from {}.", path.display());
            }
        }
        Commands::Score {
            account,
            usage,
            tickets,
            notes,
            json,
            store,
        } => {
            let inputs = load_inputs(&config, &account, usage, tickets, notes).await?;
            let result = analyze(&account, &inputs);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result);
            }

            if store {
                let pool = connect(&config).await?;
                let id = db::store_analysis(&pool, &result).await?;
                println!("Stored analysis {id}.");
            }
        }
        Commands::Report {
            account,
            usage,
            tickets,
            notes,
            out,
        } => {
            let inputs = load_inputs(&config, &account, usage, tickets, notes).await?;
            let result = analyze(&account, &inputs);
            let report = report::build_report(&result, Utc::now().date_naive());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::List { limit } => {
            let pool = connect(&config).await?;
            let summaries = db::list_analyses(&pool, limit).await?;
            if summaries.is_empty() {
                println!("No stored analyses.");
            } else {
                for summary in summaries {
                    println!(
                        "- {} {} score {} at {}",
                        summary.id, summary.account_id, summary.risk_score, summary.created_at
                    );
                }
            }
        }
        Commands::Show { id } => {
            let pool = connect(&config).await?;
            match db::get_analysis(&pool, id).await? {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => println!("No analysis with id {id}."),
            }
        }
    }

    Ok(())
}

struct ScoreInputs {
    usage: Vec<UsageRecord>,
    tickets: Vec<TicketRecord>,
    notes: String,
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for database-backed commands")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Resolve scoring inputs: CSV/notes files when given, the database for
/// whatever is omitted. An account with neither usage nor tickets is
/// rejected before the pipeline runs.
async fn load_inputs(
    config: &Config,
    account: &str,
    usage_csv: Option<PathBuf>,
    tickets_csv: Option<PathBuf>,
    notes_file: Option<PathBuf>,
) -> anyhow::Result<ScoreInputs> {
    let needs_fallback = usage_csv.is_none() || tickets_csv.is_none() || notes_file.is_none();
    let pool = if needs_fallback && config.database_url.is_some() {
        Some(connect(config).await?)
    } else {
        None
    };

    let usage = match usage_csv {
        Some(path) => read_usage_csv(&path)?,
        None => match &pool {
            Some(pool) => db::fetch_usage(pool, account).await?,
            None => Vec::new(),
        },
    };

    let tickets = match tickets_csv {
        Some(path) => read_tickets_csv(&path)?,
        None => match &pool {
            Some(pool) => db::fetch_tickets(pool, account).await?,
            None => Vec::new(),
        },
    };

    let notes = match notes_file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read notes file {}", path.display()))?,
        None => match &pool {
            Some(pool) => db::fetch_notes(pool, account).await?.unwrap_or_default(),
            None => String::new(),
        },
    };

    if usage.is_empty() && tickets.is_empty() {
        anyhow::bail!("no usage or ticket data available for {account}");
    }

    info!(
        account,
        usage_rows = usage.len(),
        ticket_rows = tickets.len(),
        "scoring inputs loaded"
    );

    Ok(ScoreInputs {
        usage,
        tickets,
        notes,
    })
}

fn read_usage_csv(path: &Path) -> anyhow::Result<Vec<UsageRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open usage csv {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<UsageRecord>() {
        rows.push(result?);
    }
    Ok(rows)
}

fn read_tickets_csv(path: &Path) -> anyhow::Result<Vec<TicketRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open tickets csv {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<TicketRecord>() {
        rows.push(result?);
    }
    Ok(rows)
}

fn analyze(account: &str, inputs: &ScoreInputs) -> AnalysisResult {
    pipeline::run(
        account,
        &inputs.usage,
        &inputs.tickets,
        &inputs.notes,
        &redact::Passthrough,
        Utc::now().date_naive(),
    )
}

fn print_summary(result: &AnalysisResult) {
    println!("{}: risk score {}/100", result.account_id, result.risk_score);

    if result.risk_drivers.is_empty() {
        println!("No risk drivers detected.");
    } else {
        println!("Risk drivers:");
        for driver in result.risk_drivers.iter() {
            println!(
                "- {} ({:.1}): {}",
                driver.signal, driver.weight, driver.explanation
            );
        }
    }

    if !result.expansion_ops.is_empty() {
        println!("Expansion opportunities:");
        for opportunity in result.expansion_ops.iter() {
            println!("- {}: {}", opportunity.opportunity, opportunity.description);
        }
    }

    if !result.playbook.is_empty() {
        println!("Playbook:");
        for item in result.playbook.iter() {
            println!(
                "- [{}] {} (within {} days)",
                item.owner.as_str(),
                item.action,
                item.eta_days
            );
        }
    }

    println!("Internal comms: {}", result.comms.internal_slack);
}
