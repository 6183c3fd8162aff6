//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use worklog_core::daily::{DailyLogDraft, submit_daily_log, update_log_status};
use worklog_core::rollup::{
    MonthlyPreview, MonthlyProcessor, MonthlyRun, ProgressReporter, RollupOutcome,
    WeeklyProcessor, WeeklyRun,
};
use worklog_core::summarizer::sections::{MONTHLY, WEEKLY};
use worklog_core::summarizer::{SummarizerRegistry, WeeklySummary};
use worklog_shared::{
    AppConfig, Category, ImpactLevel, LogStatus, RecordId, fields, init_config, load_config,
};
use worklog_storage::{DocumentStore, Storage};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// worklog: roll daily work logs up into weekly and monthly summaries.
#[derive(Parser)]
#[command(
    name = "worklog",
    version,
    about = "Record daily work logs and roll them up into weekly achievements and monthly highlights.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Record a daily work log.
    Log(LogArgs),

    /// Change the status of a daily log.
    Status {
        /// Daily log id.
        id: String,

        /// New status: Logged, "In Review", or Published.
        status: LogStatus,
    },

    /// Summarize daily logs into a weekly achievement.
    Weekly {
        /// First day (YYYY-MM-DD). Defaults to six days before the end date.
        #[arg(long)]
        start_date: Option<String>,

        /// Last day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end_date: Option<String>,

        /// Only include daily logs with this status.
        #[arg(long)]
        status: Option<LogStatus>,

        /// Print the summary instead of saving it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Summarize weekly achievements into a monthly highlight.
    Monthly {
        /// Year (defaults to the current year).
        #[arg(long)]
        year: Option<i32>,

        /// Month 1-12 (defaults to the current month).
        #[arg(long)]
        month: Option<u32>,

        /// Explicit first day (YYYY-MM-DD); requires --end-date.
        #[arg(long)]
        start_date: Option<String>,

        /// Explicit last day (YYYY-MM-DD); requires --start-date.
        #[arg(long)]
        end_date: Option<String>,

        /// Print the summary instead of saving it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `worklog log`.
#[derive(clap::Args)]
pub(crate) struct LogArgs {
    /// One-line title.
    #[arg(long)]
    pub title: String,

    /// Detailed context (markdown).
    #[arg(long, conflicts_with = "context_file", required_unless_present = "context_file")]
    pub context: Option<String>,

    /// Read the context from a file.
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// 성능개선, 신규기능, 버그픽스, 장애대응, 리팩토링, or 기타.
    #[arg(long)]
    pub category: Category,

    /// High, Medium, or Low.
    #[arg(long)]
    pub impact: ImpactLevel,

    /// Technologies used (repeatable or comma-separated).
    #[arg(long = "tech", value_delimiter = ',')]
    pub tech: Vec<String>,

    /// Day of the work (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Initial status. Defaults to Logged.
    #[arg(long)]
    pub status: Option<LogStatus>,

    /// Quantitative result, e.g. "p95 800ms → 400ms".
    #[arg(long)]
    pub metrics: Option<String>,

    /// Related ticket or PR URL.
    #[arg(long)]
    pub ticket_url: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "worklog=info",
        1 => "worklog=debug",
        _ => "worklog=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Log(args) => cmd_log(args).await,
        Command::Status { id, status } => cmd_status(&id, status).await,
        Command::Weekly {
            start_date,
            end_date,
            status,
            dry_run,
        } => {
            let run = WeeklyRun {
                start: start_date,
                end: end_date,
                status: status.map(|s| s.as_str().to_string()),
                dry_run,
                ..WeeklyRun::default()
            };
            cmd_weekly(&run).await
        }
        Command::Monthly {
            year,
            month,
            start_date,
            end_date,
            dry_run,
        } => {
            let run = MonthlyRun {
                start: start_date,
                end: end_date,
                year,
                month,
                dry_run,
                ..MonthlyRun::default()
            };
            cmd_monthly(&run).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Open the configured database.
async fn open_store(config: &AppConfig) -> Result<Arc<Storage>> {
    let path = config.storage.resolved_path()?;
    let storage = Storage::open(&path)
        .await
        .wrap_err_with(|| format!("cannot open database at {}", path.display()))?;
    Ok(Arc::new(storage))
}

// ---------------------------------------------------------------------------
// Daily logs
// ---------------------------------------------------------------------------

async fn cmd_log(args: LogArgs) -> Result<()> {
    let config = load_config()?;
    let collection = config.collections.daily_logs()?.to_string();

    let context = match (args.context, &args.context_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read context file {}", path.display()))?,
        (None, None) => String::new(),
    };

    let draft = DailyLogDraft {
        title: args.title,
        context,
        category: args.category,
        impact_level: args.impact,
        tech_stack: args.tech,
        logged_date: args.date,
        status: args.status,
        metrics: args.metrics,
        ticket_url: args.ticket_url,
    };

    let store = open_store(&config).await?;
    let today = Local::now().date_naive();
    let id = submit_daily_log(store.as_ref(), &collection, draft, today).await?;

    println!("Daily log saved: {id}");
    Ok(())
}

async fn cmd_status(id: &str, status: LogStatus) -> Result<()> {
    let config = load_config()?;
    let collection = config.collections.daily_logs()?.to_string();

    let store = open_store(&config).await?;
    update_log_status(store.as_ref(), &collection, &RecordId::from(id), status).await?;

    println!("Status of {id} set to {status}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Rollups
// ---------------------------------------------------------------------------

async fn cmd_weekly(run: &WeeklyRun) -> Result<()> {
    let config = load_config()?;
    config.collections.daily_logs()?;

    let store: Arc<dyn DocumentStore> = open_store(&config).await?;
    let registry = SummarizerRegistry::default();
    let processor = WeeklyProcessor::from_config(store, &config, &registry)?;

    info!(dry_run = run.dry_run, "running weekly rollup");
    let reporter = CliProgress::new();
    let outcome = processor.run(run, &reporter).await?;

    match outcome {
        RollupOutcome::NothingToSummarize => {
            println!("No daily logs in the period; nothing to summarize.");
        }
        RollupOutcome::Preview(summary) => print_weekly_preview(&summary),
        RollupOutcome::AlreadyExists(id) => {
            println!("A weekly achievement for this period already exists: {id}");
        }
        RollupOutcome::Created { id, draft } => {
            println!();
            println!("  Weekly achievement saved!");
            println!("  ID:      {id}");
            println!("  Title:   {}", draft.title());
            println!("  Sources: {}", draft.relation(fields::SOURCE_LOGS).len());
            println!();
        }
    }
    Ok(())
}

async fn cmd_monthly(run: &MonthlyRun) -> Result<()> {
    let config = load_config()?;
    config.collections.daily_logs()?;

    let store: Arc<dyn DocumentStore> = open_store(&config).await?;
    let registry = SummarizerRegistry::default();
    let processor = MonthlyProcessor::from_config(store, &config, &registry)?;

    info!(dry_run = run.dry_run, "running monthly rollup");
    let reporter = CliProgress::new();
    let outcome = processor.run(run, &reporter).await?;

    match outcome {
        RollupOutcome::NothingToSummarize => {
            println!("No weekly achievements in the period; nothing to summarize.");
        }
        RollupOutcome::Preview(preview) => print_monthly_preview(&preview),
        RollupOutcome::AlreadyExists(id) => {
            println!("A monthly highlight for this period already exists: {id}");
        }
        RollupOutcome::Created { id, draft } => {
            println!();
            println!("  Monthly highlight saved!");
            println!("  ID:      {id}");
            println!("  Title:   {}", draft.title());
            println!("  Sources: {}", draft.relation(fields::SOURCE_WEEKS).len());
            println!();
        }
    }
    Ok(())
}

fn print_weekly_preview(summary: &WeeklySummary) {
    println!("{}", WEEKLY.lead);
    println!("{}", summary.bullet_points);
    println!("\n{}", WEEKLY.split);
    println!("{}", summary.key_highlights);
}

fn print_monthly_preview(preview: &MonthlyPreview) {
    println!("{}", MONTHLY.lead);
    println!("{}", preview.summary.summary);
    println!("\n{}", MONTHLY.split);
    println!("{}", preview.summary.career_brief);
    println!("\n## 통계 요약");
    println!("{}", preview.stats);
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
