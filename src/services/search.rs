use chrono::{DateTime, FixedOffset, Months, Utc};
use serde::Deserialize;

use crate::models::entry::{JournalEntry, SentimentLabel};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
    Year,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Inclusive lower bound on `created_at`, or `None` for no bound.
    pub fn lower_bound(&self, now: DateTime<Utc>, offset: &FixedOffset) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Today => now
                .with_timezone(offset)
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| midnight.and_local_timezone(*offset).single())
                .map(|t| t.with_timezone(&Utc)),
            Self::Week => Some(now - chrono::Duration::days(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::Year => now.checked_sub_months(Months::new(12)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Relevance,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub mood: Option<SentimentLabel>,
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Number of non-overlapping occurrences of `term` in `haystack`. Both are
/// expected lowercased already.
fn occurrences(haystack: &str, term: &str) -> usize {
    if term.trim().is_empty() {
        return 0;
    }
    haystack.matches(term).count()
}

fn matches_term(entry: &JournalEntry, term: &str) -> bool {
    if term.trim().is_empty() {
        return true;
    }
    entry.content.to_lowercase().contains(term)
        || entry
            .ai_feedback
            .as_deref()
            .is_some_and(|f| f.to_lowercase().contains(term))
        || entry
            .sentiment_label
            .is_some_and(|label| label.as_str().contains(term))
}

/// Filter and order an already fetched, newest-first entry list.
pub fn search_entries(
    entries: Vec<JournalEntry>,
    query: &SearchQuery,
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> Vec<JournalEntry> {
    // Surrounding spaces stay part of the term; only a blank query is ignored
    let term = query.q.to_lowercase();
    let since = query.range.lower_bound(now, offset);

    let mut hits: Vec<JournalEntry> = entries
        .into_iter()
        .filter(|e| matches_term(e, &term))
        .filter(|e| query.mood.map_or(true, |mood| e.sentiment_label == Some(mood)))
        .filter(|e| since.map_or(true, |since| e.created_at >= since))
        .collect();

    match query.sort {
        SortOrder::Newest => hits.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => hits.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Relevance if !term.trim().is_empty() => {
            hits.sort_by_cached_key(|e| std::cmp::Reverse(occurrences(&e.content.to_lowercase(), &term)));
        }
        SortOrder::Relevance => {}
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 15, 0, 0).unwrap()
    }

    fn entry(content: &str, label: Option<SentimentLabel>, age: Duration) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            content: content.to_string(),
            sentiment_score: None,
            sentiment_label: label,
            ai_feedback: None,
            mood_intensity: None,
            created_at: now() - age,
        }
    }

    fn sample() -> Vec<JournalEntry> {
        vec![
            entry("Walked by the sea", Some(SentimentLabel::Positive), Duration::hours(1)),
            entry("Work was stressful. Work again tomorrow, work work.", Some(SentimentLabel::Negative), Duration::days(2)),
            entry("Quiet day at work", None, Duration::days(10)),
            entry("Birthday dinner", Some(SentimentLabel::Positive), Duration::days(40)),
        ]
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let query = SearchQuery {
            q: "   ".into(),
            ..Default::default()
        };
        let hits = search_entries(sample(), &query, now(), &utc());
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_term_is_case_insensitive() {
        let query = SearchQuery {
            q: "WORK".into(),
            ..Default::default()
        };
        let hits = search_entries(sample(), &query, now(), &utc());
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|e| e.content.to_lowercase().contains("work")));
    }

    #[test]
    fn test_surrounding_spaces_are_part_of_the_term() {
        let query = SearchQuery {
            q: " work".into(),
            ..Default::default()
        };
        let hits = search_entries(sample(), &query, now(), &utc());
        // Both hits have "work" after a space; the sea entry has no "work"
        assert_eq!(hits.len(), 2);

        let query = SearchQuery {
            q: "sea ".into(),
            ..Default::default()
        };
        // "Walked by the sea" ends without a trailing space
        assert!(search_entries(sample(), &query, now(), &utc()).is_empty());
    }

    #[test]
    fn test_term_matches_feedback_and_label() {
        let mut entries = sample();
        entries[3].ai_feedback = Some("Celebrations matter".into());

        let by_feedback = SearchQuery {
            q: "celebration".into(),
            ..Default::default()
        };
        assert_eq!(search_entries(entries.clone(), &by_feedback, now(), &utc()).len(), 1);

        let by_label = SearchQuery {
            q: "negative".into(),
            ..Default::default()
        };
        assert_eq!(search_entries(entries, &by_label, now(), &utc()).len(), 1);
    }

    #[test]
    fn test_mood_filter_skips_unlabeled() {
        let query = SearchQuery {
            mood: Some(SentimentLabel::Neutral),
            ..Default::default()
        };
        assert!(search_entries(sample(), &query, now(), &utc()).is_empty());

        let query = SearchQuery {
            mood: Some(SentimentLabel::Positive),
            ..Default::default()
        };
        assert_eq!(search_entries(sample(), &query, now(), &utc()).len(), 2);
    }

    #[test]
    fn test_date_ranges() {
        let count = |range| {
            let query = SearchQuery {
                range,
                ..Default::default()
            };
            search_entries(sample(), &query, now(), &utc()).len()
        };
        assert_eq!(count(DateRange::Today), 1);
        assert_eq!(count(DateRange::Week), 2);
        assert_eq!(count(DateRange::Month), 3);
        assert_eq!(count(DateRange::Year), 4);
        assert_eq!(count(DateRange::All), 4);
    }

    #[test]
    fn test_today_uses_local_midnight() {
        // 15:00 UTC is 01:00 on the 11th at UTC+10; an entry from 14:00 UTC
        // (00:00 local) is today, one from 13:00 UTC is yesterday.
        let plus_ten = FixedOffset::east_opt(10 * 3600).unwrap();
        let entries = vec![
            entry("just after midnight", None, Duration::hours(1)),
            entry("before midnight", None, Duration::hours(2)),
        ];
        let query = SearchQuery {
            range: DateRange::Today,
            ..Default::default()
        };
        let hits = search_entries(entries, &query, now(), &plus_ten);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "just after midnight");
    }

    #[test]
    fn test_sort_orders() {
        let oldest = SearchQuery {
            sort: SortOrder::Oldest,
            ..Default::default()
        };
        let hits = search_entries(sample(), &oldest, now(), &utc());
        assert_eq!(hits[0].content, "Birthday dinner");

        let newest = SearchQuery::default();
        let hits = search_entries(sample(), &newest, now(), &utc());
        assert_eq!(hits[0].content, "Walked by the sea");
    }

    #[test]
    fn test_relevance_counts_occurrences() {
        let query = SearchQuery {
            q: "work".into(),
            sort: SortOrder::Relevance,
            ..Default::default()
        };
        let hits = search_entries(sample(), &query, now(), &utc());
        assert!(hits[0].content.starts_with("Work was stressful"));
        assert_eq!(hits[1].content, "Quiet day at work");
    }

    #[test]
    fn test_relevance_with_blank_query_keeps_order() {
        let query = SearchQuery {
            sort: SortOrder::Relevance,
            ..Default::default()
        };
        let input = sample();
        let ids: Vec<Uuid> = input.iter().map(|e| e.id).collect();
        let hits = search_entries(input, &query, now(), &utc());
        assert_eq!(hits.iter().map(|e| e.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_occurrences_do_not_overlap() {
        assert_eq!(occurrences("aaaa", "aa"), 2);
        assert_eq!(occurrences("abc", ""), 0);
    }
}
