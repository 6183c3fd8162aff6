//! Source fetching: property query plus per-record content enrichment.

use tracing::{debug, instrument, warn};

use worklog_shared::{EnrichedRecord, Result};
use worklog_storage::{DateRangeQuery, DocumentStore, FieldFilter};

use crate::period::Period;

/// Fetch the records of `collection` whose `date_field` lies in `period`,
/// each with its content body attached.
///
/// Records without an id cannot be enriched and are skipped. The result is
/// ordered ascending by `date_field`.
#[instrument(skip(store, filter), fields(%period))]
pub async fn fetch_sources(
    store: &dyn DocumentStore,
    collection: &str,
    date_field: &str,
    period: Period,
    filter: Option<FieldFilter>,
) -> Result<Vec<EnrichedRecord>> {
    let query = DateRangeQuery {
        collection: collection.to_string(),
        date_field: date_field.to_string(),
        start: period.start,
        end: period.end,
        filter,
    };

    let raw = store.query_by_date_range(&query).await?;
    let mut enriched = Vec::with_capacity(raw.len());

    for record in raw {
        let Some(id) = record.id else {
            warn!(collection, "skipping record without id");
            continue;
        };
        let content = store.fetch_content_blocks(&id).await?;
        enriched.push(EnrichedRecord {
            id: Some(id),
            properties: record.properties,
            content,
        });
    }

    // Stable, so same-day records keep store order.
    enriched.sort_by_key(|record| record.date(date_field));

    debug!(count = enriched.len(), "sources fetched");
    Ok(enriched)
}
