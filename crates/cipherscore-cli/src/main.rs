//! CipherScore command-line front end.
//!
//! Submits, decides, lists and reveals opaque credit reports stored in a
//! local sled database. Logs go to stderr; command output goes to stdout.

mod output;
mod prompt;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use cipherscore_core::{ManagerConfig, Principal, ReportId, ReportManager};
use cipherscore_crypto::Operation;
use cipherscore_protocol::LocalKeySigner;
use cipherscore_store::SledKvStore;

use crate::prompt::PromptSigner;

/// File under the data directory holding the local signing key.
const SIGNER_KEY_FILE: &str = "signer.key";

/// Subdirectory of the data directory holding the database.
const DB_DIR: &str = "db";

/// CipherScore
///
/// Privacy-preserving credit reports with opaque scores.
#[derive(Parser, Debug)]
#[command(name = "cipherscore")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to data directory
    #[arg(short, long, env = "CIPHERSCORE_DATA_DIR", default_value = "./cipherscore-data")]
    data_dir: PathBuf,

    /// Account (wallet address) to act as
    #[arg(short, long, env = "CIPHERSCORE_ACCOUNT")]
    account: Option<String>,

    /// Manager configuration file (JSON)
    #[arg(long, env = "CIPHERSCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the approval transform (increase10pct, decrease10pct, double)
    #[arg(long, env = "CIPHERSCORE_APPROVAL_OPERATION")]
    approval_operation: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CIPHERSCORE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log format (plain, json)
    #[arg(long, env = "CIPHERSCORE_LOG_FORMAT", default_value = "plain")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a new report
    Submit {
        /// Data source label (repeatable)
        #[arg(short, long = "source", required = true)]
        sources: Vec<String>,

        /// Plain score to encode
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },

    /// Approve a pending report
    Approve {
        /// Report id
        id: String,
    },

    /// Reject a pending report
    Reject {
        /// Report id
        id: String,
    },

    /// List reports, newest first
    List {
        /// Only show reports whose id or sources contain this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one report
    Show {
        /// Report id
        id: String,
    },

    /// Show status counts and approved-score range
    Stats,

    /// Reveal a report's score after signing the challenge
    Reveal {
        /// Report id
        id: String,

        /// Sign without asking
        #[arg(long)]
        yes: bool,

        /// Contract address bound into the challenge
        #[arg(
            long,
            env = "CIPHERSCORE_CONTRACT",
            default_value = "0x0000000000000000000000000000000000000000"
        )]
        contract: String,

        /// Chain id bound into the challenge
        #[arg(long, env = "CIPHERSCORE_CHAIN_ID", default_value = "11155111")]
        chain_id: u64,

        /// Validity window in days (defaults to the configured window)
        #[arg(long)]
        duration_days: Option<u32>,
    },
}

fn setup_logging(log_level: &str, log_format: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("sled=warn".parse()?);

    match log_format.to_lowercase().as_str() {
        "json" => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
        _ => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
    }

    Ok(())
}

/// Build manager configuration from the optional file and CLI overrides.
fn build_config(args: &Args) -> Result<ManagerConfig> {
    let mut config = match &args.config {
        Some(path) => ManagerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ManagerConfig::default(),
    };

    if let Some(name) = &args.approval_operation {
        config.approval_operation = Operation::from_name(name);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Load the local signing key, creating it on first use.
fn load_or_create_signer(data_dir: &Path) -> Result<LocalKeySigner> {
    let path = data_dir.join(SIGNER_KEY_FILE);
    if path.exists() {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return LocalKeySigner::from_hex(&text)
            .with_context(|| format!("Invalid signing key in {}", path.display()));
    }

    let signer = LocalKeySigner::generate();
    std::fs::write(&path, signer.to_hex().as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Created local signing key");
    Ok(signer)
}

fn principal(args: &Args) -> Option<Principal> {
    args.account.as_deref().and_then(Principal::new)
}

async fn run(args: Args) -> Result<()> {
    if !args.data_dir.exists() {
        std::fs::create_dir_all(&args.data_dir).context("Failed to create data directory")?;
        debug!(path = %args.data_dir.display(), "Created data directory");
    }

    let config = build_config(&args)?;
    let kv = SledKvStore::open(&args.data_dir.join(DB_DIR)).context("Failed to open database")?;
    let manager = ReportManager::new(kv, config).context("Failed to create report manager")?;
    let caller = principal(&args);

    match &args.command {
        Command::Submit { sources, score } => {
            let report = manager
                .submit(caller.as_ref(), sources.clone(), *score)
                .await
                .context("Failed to submit report")?;
            println!("{}", report.id);
        }
        Command::Approve { id } => {
            let report = manager
                .approve(&ReportId::new(id.as_str()), caller.as_ref())
                .await
                .context("Failed to approve report")?;
            println!("{} {}", report.id, report.status);
        }
        Command::Reject { id } => {
            let report = manager
                .reject(&ReportId::new(id.as_str()), caller.as_ref())
                .await
                .context("Failed to reject report")?;
            println!("{} {}", report.id, report.status);
        }
        Command::List { search } => {
            let reports = match search {
                Some(term) => manager.search(term).await,
                None => manager.list_reports().await,
            }
            .context("Failed to list reports")?;

            if reports.is_empty() {
                println!("no reports");
            }
            for report in &reports {
                println!("{}", output::report_line(report));
            }
        }
        Command::Show { id } => {
            let report = manager
                .get_report(&ReportId::new(id.as_str()))
                .await
                .context("Failed to load report")?;
            println!("{}", output::report_detail(&report));
        }
        Command::Stats => {
            let stats = manager.stats().await.context("Failed to compute stats")?;
            println!("{}", output::stats_summary(&stats));
        }
        Command::Reveal {
            id,
            yes,
            contract,
            chain_id,
            duration_days,
        } => {
            if caller.is_none() {
                bail!("--account is required to reveal a score");
            }

            let mut session = manager.new_session(contract.as_str(), *chain_id);
            if let Some(days) = duration_days {
                session = session.with_duration_days(*days);
            }

            let signer = PromptSigner::new(load_or_create_signer(&args.data_dir)?, *yes);
            let revealed = manager
                .reveal_report(&ReportId::new(id.as_str()), caller.as_ref(), &session, &signer)
                .await
                .context("Failed to reveal score")?;

            println!("{}", revealed.value);
            debug!(signature = %revealed.signature.to_hex(), "Reveal signature");
        }
    }

    manager
        .store()
        .kv()
        .flush()
        .await
        .context("Failed to flush database")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level, &args.log_format)?;

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %args.data_dir.display(),
        "Starting cipherscore"
    );

    run(args).await
}
