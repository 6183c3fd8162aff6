//! Weekly and monthly rollup orchestrators.
//!
//! A run is one linear pass:
//! resolve period → fetch sources → (nothing to summarize) → duplicate guard
//! → summarize → (dry run: preview) → build aggregate → persist.
//! Every collaborator call is awaited before the next one starts, and the
//! build and persist steps are adjacent, so a failed run writes nothing.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use tracing::{info, instrument};

use worklog_shared::{AppConfig, RecordDraft, RecordId, Result, fields};
use worklog_storage::{DateRangeQuery, DocumentStore, FieldFilter};

use crate::aggregate;
use crate::fetcher::fetch_sources;
use crate::period::{self, MonthlyPeriod, Period};
use crate::summarizer::{MonthlySummary, Summarizer, SummarizerRegistry, WeeklySummary};

// ---------------------------------------------------------------------------
// Outcomes and progress
// ---------------------------------------------------------------------------

/// How a rollup run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RollupOutcome<P> {
    /// No source records in the period; nothing was summarized or written.
    NothingToSummarize,
    /// Dry run: everything but persistence ran.
    Preview(P),
    /// The duplicate guard found an aggregate for this period.
    AlreadyExists(RecordId),
    /// The aggregate was persisted.
    Created { id: RecordId, draft: RecordDraft },
}

impl<P> RollupOutcome<P> {
    pub fn created_id(&self) -> Option<&RecordId> {
        match self {
            Self::Created { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Dry-run result of a monthly rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyPreview {
    pub summary: MonthlySummary,
    pub stats: String,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once when the run returns, successfully or not.
    fn finish(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn finish(&self) {}
}

// ---------------------------------------------------------------------------
// Weekly
// ---------------------------------------------------------------------------

/// Arguments of a weekly run, before period resolution.
#[derive(Debug, Clone)]
pub struct WeeklyRun {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Only roll up daily logs with this status.
    pub status: Option<String>,
    pub dry_run: bool,
    /// Anchor for a missing end date.
    pub today: NaiveDate,
}

impl Default for WeeklyRun {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            status: None,
            dry_run: false,
            today: Local::now().date_naive(),
        }
    }
}

/// Rolls daily logs up into one weekly achievement.
pub struct WeeklyProcessor {
    store: Arc<dyn DocumentStore>,
    summarizer: Box<dyn Summarizer>,
    daily_collection: String,
    weekly_collection: String,
    guard_duplicates: bool,
}

impl WeeklyProcessor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        summarizer: Box<dyn Summarizer>,
        daily_collection: impl Into<String>,
        weekly_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            summarizer,
            daily_collection: daily_collection.into(),
            weekly_collection: weekly_collection.into(),
            guard_duplicates: false,
        }
    }

    /// Build from config, resolving collections and the summarizer up front.
    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        config: &AppConfig,
        registry: &SummarizerRegistry,
    ) -> Result<Self> {
        let daily = config.collections.daily_logs()?.to_string();
        let weekly = config.collections.weekly_achievements()?.to_string();
        let summarizer = registry.from_config(&config.llm)?;
        Ok(Self::new(store, summarizer, daily, weekly)
            .with_duplicate_guard(config.rollup.guard_duplicates))
    }

    pub fn with_duplicate_guard(mut self, enabled: bool) -> Self {
        self.guard_duplicates = enabled;
        self
    }

    /// Resolve the period and run.
    pub async fn run(
        &self,
        run: &WeeklyRun,
        progress: &dyn ProgressReporter,
    ) -> Result<RollupOutcome<WeeklySummary>> {
        progress.phase("Resolving period");
        let result = match period::resolve_weekly_at(
            run.start.as_deref(),
            run.end.as_deref(),
            run.today,
        ) {
            Ok(period) => {
                self.run_period(period, run.status.as_deref(), run.dry_run, progress)
                    .await
            }
            Err(e) => Err(e),
        };
        progress.finish();
        result
    }

    /// Run over an already resolved period.
    #[instrument(skip(self, progress), fields(%period, summarizer = self.summarizer.name()))]
    pub async fn run_period(
        &self,
        period: Period,
        status: Option<&str>,
        dry_run: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<RollupOutcome<WeeklySummary>> {
        info!(start = %period.start, end = %period.end, "starting weekly rollup");

        progress.phase("Fetching daily logs");
        let filter = status.map(|s| FieldFilter::new(fields::STATUS, s));
        let logs = fetch_sources(
            self.store.as_ref(),
            &self.daily_collection,
            fields::LOGGED_DATE,
            period,
            filter,
        )
        .await?;

        if logs.is_empty() {
            info!("no daily logs in period");
            return Ok(RollupOutcome::NothingToSummarize);
        }

        if self.guard_duplicates && !dry_run {
            let title = aggregate::weekly_title(period.start);
            if let Some(id) = find_existing(
                self.store.as_ref(),
                &self.weekly_collection,
                fields::PERIOD_START,
                period.start,
                &title,
            )
            .await?
            {
                info!(%id, %title, "weekly achievement already exists");
                return Ok(RollupOutcome::AlreadyExists(id));
            }
        }

        progress.phase("Summarizing daily logs");
        let summary = self.summarizer.summarize_weekly(&logs).await?;

        if dry_run {
            info!(logs = logs.len(), "dry run, not saving weekly achievement");
            return Ok(RollupOutcome::Preview(summary));
        }

        progress.phase("Saving weekly achievement");
        let draft = aggregate::build_weekly(
            &self.weekly_collection,
            &period,
            &summary,
            &logs,
            Utc::now(),
        );
        let id = persist(self.store.as_ref(), &draft).await?;

        info!(%id, sources = draft.relation(fields::SOURCE_LOGS).len(), "weekly achievement created");
        Ok(RollupOutcome::Created { id, draft })
    }
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

/// Arguments of a monthly run, before period resolution.
#[derive(Debug, Clone)]
pub struct MonthlyRun {
    pub start: Option<String>,
    pub end: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub dry_run: bool,
    /// Anchor for a missing year or month.
    pub today: NaiveDate,
}

impl Default for MonthlyRun {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            year: None,
            month: None,
            dry_run: false,
            today: Local::now().date_naive(),
        }
    }
}

/// Rolls weekly achievements up into one monthly highlight.
pub struct MonthlyProcessor {
    store: Arc<dyn DocumentStore>,
    summarizer: Box<dyn Summarizer>,
    weekly_collection: String,
    monthly_collection: String,
    guard_duplicates: bool,
}

impl MonthlyProcessor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        summarizer: Box<dyn Summarizer>,
        weekly_collection: impl Into<String>,
        monthly_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            summarizer,
            weekly_collection: weekly_collection.into(),
            monthly_collection: monthly_collection.into(),
            guard_duplicates: false,
        }
    }

    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        config: &AppConfig,
        registry: &SummarizerRegistry,
    ) -> Result<Self> {
        let weekly = config.collections.weekly_achievements()?.to_string();
        let monthly = config.collections.monthly_highlights()?.to_string();
        let summarizer = registry.from_config(&config.llm)?;
        Ok(Self::new(store, summarizer, weekly, monthly)
            .with_duplicate_guard(config.rollup.guard_duplicates))
    }

    pub fn with_duplicate_guard(mut self, enabled: bool) -> Self {
        self.guard_duplicates = enabled;
        self
    }

    pub async fn run(
        &self,
        run: &MonthlyRun,
        progress: &dyn ProgressReporter,
    ) -> Result<RollupOutcome<MonthlyPreview>> {
        progress.phase("Resolving period");
        let result = match period::resolve_monthly_at(
            run.start.as_deref(),
            run.end.as_deref(),
            run.year,
            run.month,
            run.today,
        ) {
            Ok(period) => self.run_period(period, run.dry_run, progress).await,
            Err(e) => Err(e),
        };
        progress.finish();
        result
    }

    #[instrument(skip(self, progress), fields(period = %month.period, summarizer = self.summarizer.name()))]
    pub async fn run_period(
        &self,
        month: MonthlyPeriod,
        dry_run: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<RollupOutcome<MonthlyPreview>> {
        let period = month.period;
        info!(start = %period.start, end = %period.end, "starting monthly rollup");

        progress.phase("Fetching weekly achievements");
        let weeks = fetch_sources(
            self.store.as_ref(),
            &self.weekly_collection,
            fields::PERIOD_START,
            period,
            None,
        )
        .await?;

        if weeks.is_empty() {
            info!("no weekly achievements in period");
            return Ok(RollupOutcome::NothingToSummarize);
        }

        if self.guard_duplicates && !dry_run {
            let title = aggregate::monthly_title(month.year, month.month);
            if let Some(id) = find_existing(
                self.store.as_ref(),
                &self.monthly_collection,
                fields::YEAR_MONTH,
                month.year_month(),
                &title,
            )
            .await?
            {
                info!(%id, %title, "monthly highlight already exists");
                return Ok(RollupOutcome::AlreadyExists(id));
            }
        }

        progress.phase("Summarizing weekly achievements");
        let summary = self.summarizer.summarize_monthly(&weeks).await?;
        let stats = aggregate::stats_text(&period, &weeks);

        if dry_run {
            info!(weeks = weeks.len(), "dry run, not saving monthly highlight");
            return Ok(RollupOutcome::Preview(MonthlyPreview { summary, stats }));
        }

        progress.phase("Saving monthly highlight");
        let draft = aggregate::build_monthly(
            &self.monthly_collection,
            &month,
            &summary,
            &weeks,
            &stats,
            Utc::now(),
        );
        let id = persist(self.store.as_ref(), &draft).await?;

        info!(%id, sources = draft.relation(fields::SOURCE_WEEKS).len(), "monthly highlight created");
        Ok(RollupOutcome::Created { id, draft })
    }
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

async fn persist(store: &dyn DocumentStore, draft: &RecordDraft) -> Result<RecordId> {
    store
        .create_record(&draft.collection, &draft.properties, &draft.content)
        .await
}

/// An aggregate in `collection` dated `on` and titled `title`, if any.
async fn find_existing(
    store: &dyn DocumentStore,
    collection: &str,
    date_field: &str,
    on: NaiveDate,
    title: &str,
) -> Result<Option<RecordId>> {
    let query = DateRangeQuery {
        collection: collection.to_string(),
        date_field: date_field.to_string(),
        start: on,
        end: on,
        filter: Some(FieldFilter::new(fields::TITLE, title)),
    };
    let existing = store.query_by_date_range(&query).await?;
    Ok(existing.into_iter().find_map(|record| record.id))
}
