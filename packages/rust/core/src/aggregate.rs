//! Assembly of weekly and monthly aggregate records.
//!
//! Pure functions: a period, a summary and the fetched sources in, a
//! [`RecordDraft`] out. Nothing here touches the store.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use worklog_markdown::parse;
use worklog_shared::{
    ContentNode, EnrichedRecord, Properties, PropertyValue, RecordDraft, RecordId, fields,
};

use crate::period::{MonthlyPeriod, Period};
use crate::summarizer::{MonthlySummary, WeeklySummary};

pub const WEEKLY_HEADING: &str = "🎯 주간 성과 요약";
pub const MONTHLY_SUMMARY_HEADING: &str = "📈 월간 종합 성과";
pub const MONTHLY_BRIEF_HEADING: &str = "🧾 경력기술서용 요약";

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Monday-based week of the month, starting at 1 for the week holding the 1st.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_offset = date
        .with_day(1)
        .map_or(0, |first| first.weekday().num_days_from_monday());
    (date.day() + first_offset - 1) / 7 + 1
}

/// `"2025년 11월 2주차"` for a period starting 2025-11-03.
pub fn weekly_title(start: NaiveDate) -> String {
    format!(
        "{}년 {:02}월 {}주차",
        start.year(),
        start.month(),
        week_of_month(start)
    )
}

/// `"2025년 02월"`.
pub fn monthly_title(year: i32, month: u32) -> String {
    format!("{year}년 {month:02}월")
}

// ---------------------------------------------------------------------------
// Lineage and stats
// ---------------------------------------------------------------------------

/// Ids of every source, in fetch order. Sources without an id are dropped.
pub fn lineage(sources: &[EnrichedRecord]) -> Vec<RecordId> {
    sources.iter().filter_map(|s| s.id.clone()).collect()
}

/// Plain-text statistics for a monthly highlight.
pub fn stats_text(period: &Period, weeks: &[EnrichedRecord]) -> String {
    let daily_logs: usize = weeks
        .iter()
        .map(|week| week.relation_len(fields::SOURCE_LOGS))
        .sum();
    format!(
        "집계 기간: {} ~ {}\n총 주간 성과 수: {}개\n연관된 일일 로그 수: {}개",
        period.start,
        period.end,
        weeks.len(),
        daily_logs
    )
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Weekly achievement draft.
pub fn build_weekly(
    collection: &str,
    period: &Period,
    summary: &WeeklySummary,
    sources: &[EnrichedRecord],
    generated_at: DateTime<Utc>,
) -> RecordDraft {
    let mut properties = Properties::new();
    properties.insert(
        fields::TITLE.into(),
        PropertyValue::Text(weekly_title(period.start)),
    );
    properties.insert(fields::PERIOD_START.into(), PropertyValue::Date(period.start));
    properties.insert(fields::PERIOD_END.into(), PropertyValue::Date(period.end));
    properties.insert(
        fields::KEY_HIGHLIGHTS.into(),
        PropertyValue::Text(summary.key_highlights.clone()),
    );
    properties.insert(fields::GENERATED_AT.into(), PropertyValue::DateTime(generated_at));
    properties.insert(
        fields::SOURCE_LOGS.into(),
        PropertyValue::relation(lineage(sources)),
    );

    let mut content = vec![ContentNode::heading(2, WEEKLY_HEADING)];
    content.extend(parse(&summary.bullet_points));

    RecordDraft {
        collection: collection.to_string(),
        properties,
        content,
    }
}

/// Monthly highlight draft.
pub fn build_monthly(
    collection: &str,
    period: &MonthlyPeriod,
    summary: &MonthlySummary,
    sources: &[EnrichedRecord],
    stats: &str,
    generated_at: DateTime<Utc>,
) -> RecordDraft {
    let mut properties = Properties::new();
    properties.insert(
        fields::TITLE.into(),
        PropertyValue::Text(monthly_title(period.year, period.month)),
    );
    properties.insert(fields::YEAR_MONTH.into(), PropertyValue::Date(period.year_month()));
    properties.insert(fields::GENERATED_AT.into(), PropertyValue::DateTime(generated_at));
    properties.insert(
        fields::SOURCE_WEEKS.into(),
        PropertyValue::relation(lineage(sources)),
    );
    properties.insert(fields::STATS.into(), PropertyValue::Text(stats.to_string()));

    let mut content = vec![ContentNode::heading(2, MONTHLY_SUMMARY_HEADING)];
    content.extend(parse(&summary.summary));
    content.push(ContentNode::heading(2, MONTHLY_BRIEF_HEADING));
    content.extend(parse(&summary.career_brief));

    RecordDraft {
        collection: collection.to_string(),
        properties,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn source(id: Option<&str>, linked: &[&str]) -> EnrichedRecord {
        let mut properties = Properties::new();
        if !linked.is_empty() {
            properties.insert(
                fields::SOURCE_LOGS.into(),
                PropertyValue::relation(linked.iter().copied().map(RecordId::from)),
            );
        }
        EnrichedRecord {
            id: id.map(RecordId::from),
            properties,
            content: Vec::new(),
        }
    }

    fn weekly_summary() -> WeeklySummary {
        WeeklySummary {
            bullet_points: "- 캐시 도입으로 응답시간 50% 단축\n- 배포 자동화".into(),
            key_highlights: "1. 캐시\n2. 배포\n3. 모니터링".into(),
            raw_response: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-11-10T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn week_of_month_is_monday_based() {
        // 2025-11-01 is a Saturday.
        assert_eq!(week_of_month(d(2025, 11, 1)), 1);
        assert_eq!(week_of_month(d(2025, 11, 2)), 1);
        assert_eq!(week_of_month(d(2025, 11, 3)), 2);
        assert_eq!(week_of_month(d(2025, 11, 30)), 5);
        // 2025-09-01 is a Monday.
        assert_eq!(week_of_month(d(2025, 9, 7)), 1);
        assert_eq!(week_of_month(d(2025, 9, 8)), 2);
    }

    #[test]
    fn titles() {
        assert_eq!(weekly_title(d(2025, 11, 3)), "2025년 11월 2주차");
        assert_eq!(weekly_title(d(2025, 2, 3)), "2025년 02월 2주차");
        assert_eq!(monthly_title(2025, 2), "2025년 02월");
    }

    #[test]
    fn lineage_drops_sources_without_id() {
        let sources = [source(Some("log-1"), &[]), source(None, &[])];
        assert_eq!(lineage(&sources), vec![RecordId::from("log-1")]);

        let period = Period { start: d(2025, 11, 3), end: d(2025, 11, 9) };
        let draft = build_weekly("weekly", &period, &weekly_summary(), &sources, now());
        assert_eq!(draft.relation(fields::SOURCE_LOGS), &[RecordId::from("log-1")]);
    }

    #[test]
    fn weekly_draft_properties_and_body() {
        let period = Period { start: d(2025, 11, 3), end: d(2025, 11, 9) };
        let draft = build_weekly("weekly", &period, &weekly_summary(), &[], now());

        assert_eq!(draft.collection, "weekly");
        assert_eq!(draft.title(), "2025년 11월 2주차");
        let props = &draft.properties;
        assert_eq!(props[fields::PERIOD_START].as_date(), Some(period.start));
        assert_eq!(props[fields::PERIOD_END].as_date(), Some(period.end));
        assert_eq!(
            props[fields::KEY_HIGHLIGHTS].as_text(),
            Some("1. 캐시\n2. 배포\n3. 모니터링")
        );
        assert_eq!(props[fields::GENERATED_AT], PropertyValue::DateTime(now()));
        assert!(draft.relation(fields::SOURCE_LOGS).is_empty());

        assert_eq!(
            draft.content,
            vec![
                ContentNode::heading(2, WEEKLY_HEADING),
                ContentNode::bullet("캐시 도입으로 응답시간 50% 단축"),
                ContentNode::bullet("배포 자동화"),
            ]
        );
    }

    #[test]
    fn stats_count_weeks_and_linked_logs() {
        let period = Period { start: d(2025, 11, 1), end: d(2025, 11, 30) };
        let weeks = [source(Some("w1"), &["a", "b"]), source(Some("w2"), &["c"]), source(Some("w3"), &[])];
        assert_eq!(
            stats_text(&period, &weeks),
            "집계 기간: 2025-11-01 ~ 2025-11-30\n총 주간 성과 수: 3개\n연관된 일일 로그 수: 3개"
        );
    }

    #[test]
    fn monthly_draft_has_both_sections() {
        let period = MonthlyPeriod {
            period: Period { start: d(2025, 11, 1), end: d(2025, 11, 30) },
            year: 2025,
            month: 11,
        };
        let summary = MonthlySummary {
            summary: "성능 개선에 집중한 한 달".into(),
            career_brief: "- 캐시 설계 및 도입".into(),
            raw_response: String::new(),
        };
        let weeks = [source(Some("w1"), &["a"]), source(Some("w2"), &[])];
        let draft = build_monthly("monthly", &period, &summary, &weeks, "stats", now());

        assert_eq!(draft.title(), "2025년 11월");
        assert_eq!(
            draft.properties[fields::YEAR_MONTH].as_date(),
            Some(d(2025, 11, 1))
        );
        assert_eq!(draft.properties[fields::STATS].as_text(), Some("stats"));
        assert_eq!(
            draft.relation(fields::SOURCE_WEEKS),
            &[RecordId::from("w1"), RecordId::from("w2")]
        );
        assert_eq!(
            draft.content,
            vec![
                ContentNode::heading(2, MONTHLY_SUMMARY_HEADING),
                ContentNode::paragraph("성능 개선에 집중한 한 달"),
                ContentNode::heading(2, MONTHLY_BRIEF_HEADING),
                ContentNode::bullet("캐시 설계 및 도입"),
            ]
        );
    }
}
