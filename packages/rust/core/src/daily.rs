//! Daily-log submission and status updates.

use chrono::NaiveDate;
use tracing::{info, instrument};
use url::Url;

use worklog_markdown::parse;
use worklog_shared::{
    Category, ContentNode, ImpactLevel, LogStatus, Properties, PropertyValue, RecordDraft,
    RecordId, Result, WorklogError, fields,
};
use worklog_storage::DocumentStore;

pub const CONTEXT_HEADING: &str = "📝 상세 컨텍스트";

/// A daily log as entered by a person.
#[derive(Debug, Clone)]
pub struct DailyLogDraft {
    pub title: String,
    /// Freeform markdown; becomes the record body.
    pub context: String,
    pub category: Category,
    pub impact_level: ImpactLevel,
    pub tech_stack: Vec<String>,
    /// Defaults to the submission day.
    pub logged_date: Option<NaiveDate>,
    pub status: Option<LogStatus>,
    pub metrics: Option<String>,
    pub ticket_url: Option<String>,
}

impl DailyLogDraft {
    /// Validate and turn into a record draft for `collection`.
    pub fn into_record(self, collection: &str, today: NaiveDate) -> Result<RecordDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(WorklogError::validation("title must not be empty"));
        }
        if self.context.trim().is_empty() {
            return Err(WorklogError::validation("context must not be empty"));
        }

        let tech_stack: Vec<String> = self
            .tech_stack
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let mut properties = Properties::new();
        properties.insert(fields::TITLE.into(), PropertyValue::Text(title.to_string()));
        properties.insert(
            fields::LOGGED_DATE.into(),
            PropertyValue::Date(self.logged_date.unwrap_or(today)),
        );
        properties.insert(
            fields::CATEGORY.into(),
            PropertyValue::Select(self.category.as_str().into()),
        );
        properties.insert(
            fields::IMPACT_LEVEL.into(),
            PropertyValue::Select(self.impact_level.as_str().into()),
        );
        properties.insert(fields::TECH_STACK.into(), PropertyValue::MultiSelect(tech_stack));
        properties.insert(
            fields::STATUS.into(),
            PropertyValue::Select(self.status.unwrap_or_default().as_str().into()),
        );

        if let Some(metrics) = self.metrics.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            properties.insert(fields::METRICS.into(), PropertyValue::Text(metrics.into()));
        }
        if let Some(raw) = self.ticket_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            let url = Url::parse(raw)
                .map_err(|e| WorklogError::validation(format!("invalid ticket URL '{raw}': {e}")))?;
            properties.insert(fields::TICKET_URL.into(), PropertyValue::Url(url.to_string()));
        }

        let mut content = vec![ContentNode::heading(2, CONTEXT_HEADING)];
        content.extend(parse(&self.context));

        Ok(RecordDraft {
            collection: collection.to_string(),
            properties,
            content,
        })
    }
}

/// Validate and store a daily log. Returns the new record's id.
#[instrument(skip(store, draft), fields(title = %draft.title))]
pub async fn submit_daily_log(
    store: &dyn DocumentStore,
    collection: &str,
    draft: DailyLogDraft,
    today: NaiveDate,
) -> Result<RecordId> {
    let record = draft.into_record(collection, today)?;
    let id = store
        .create_record(&record.collection, &record.properties, &record.content)
        .await?;
    info!(%id, "daily log created");
    Ok(id)
}

/// Move a daily log to a new status.
///
/// Fails without writing when `id` is unknown or belongs to another
/// collection than `collection`.
#[instrument(skip(store))]
pub async fn update_log_status(
    store: &dyn DocumentStore,
    collection: &str,
    id: &RecordId,
    status: LogStatus,
) -> Result<()> {
    match store.record_collection(id).await? {
        Some(found) if found == collection => {}
        Some(found) => {
            return Err(WorklogError::validation(format!(
                "record {id} belongs to '{found}', not the daily log collection '{collection}'"
            )));
        }
        None => return Err(WorklogError::Storage(format!("record {id} not found"))),
    }

    store
        .update_field(id, fields::STATUS, PropertyValue::Select(status.as_str().into()))
        .await?;
    info!(%id, %status, "daily log status updated");
    Ok(())
}
