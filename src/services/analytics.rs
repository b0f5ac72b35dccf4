//! Wellness analytics over one user's journal window.
//!
//! Everything here is pure: callers fetch the window (entries sorted by
//! ascending `created_at`), pick the user's UTC offset and "today", and get
//! back a complete [`AnalyticsReport`]. A report is either built from one
//! fetched window or not built at all.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::entry::{JournalEntry, SentimentLabel};
use crate::models::metric::WellnessMetric;
use crate::services::rules::{AnalyticsRules, InsightRules, MoodScale};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyMood {
    pub date: NaiveDate,
    pub average_mood: f64,
    pub entry_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekdayActivity {
    pub day: String,
    pub entries: u32,
    pub average_mood: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodDistribution {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodPercentages {
    pub positive: u8,
    pub neutral: u8,
    pub negative: u8,
}

impl MoodDistribution {
    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    /// Rounded share of each bucket. Rounding is per bucket, so the three
    /// values may sum to 99 or 101.
    pub fn percentages(&self) -> MoodPercentages {
        let total = self.total();
        let pct = |count: u32| percent(count, total);
        MoodPercentages {
            positive: pct(self.positive),
            neutral: pct(self.neutral),
            negative: pct(self.negative),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsReport {
    pub window_days: i64,
    pub total_entries: u32,
    pub active_days: u32,
    pub average_entries_per_day: f64,
    pub entries_last_7_days: u32,
    pub mood_trend: Vec<DailyMood>,
    pub weekly_activity: Vec<WeekdayActivity>,
    pub mood_distribution: MoodDistribution,
    pub mood_percentages: MoodPercentages,
    /// Share of positive entries. A plain ratio, not a weighted index.
    pub wellness_score: u8,
    pub streak: u32,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsSummary {
    pub days_logged: u32,
    pub average_sleep_hours: Option<f64>,
    pub average_exercise_minutes: Option<f64>,
    pub average_water_glasses: Option<f64>,
    pub average_energy_level: Option<f64>,
    pub average_stress_level: Option<f64>,
}

/// Round to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(count: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn local_date(ts: &DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    ts.with_timezone(offset).date_naive()
}

/// Per-day average mood, in the order each day is first seen. Sorted input
/// yields a chronological series.
pub fn daily_mood_trend(
    entries: &[JournalEntry],
    scale: &MoodScale,
    offset: &FixedOffset,
) -> Vec<DailyMood> {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut totals: HashMap<NaiveDate, (f64, u32)> = HashMap::new();

    for entry in entries {
        let date = local_date(&entry.created_at, offset);
        let slot = totals.entry(date).or_insert_with(|| {
            order.push(date);
            (0.0, 0)
        });
        slot.0 += scale.score(entry.sentiment_label);
        slot.1 += 1;
    }

    order
        .into_iter()
        .map(|date| {
            let (sum, count) = totals[&date];
            DailyMood {
                date,
                average_mood: round1(sum / count as f64),
                entry_count: count,
            }
        })
        .collect()
}

/// Seven Sunday-first buckets by local weekday.
pub fn weekly_activity(
    entries: &[JournalEntry],
    scale: &MoodScale,
    offset: &FixedOffset,
) -> Vec<WeekdayActivity> {
    let mut buckets = [(0u32, 0.0f64); 7];

    for entry in entries {
        let idx = entry
            .created_at
            .with_timezone(offset)
            .weekday()
            .num_days_from_sunday() as usize;
        buckets[idx].0 += 1;
        buckets[idx].1 += scale.score(entry.sentiment_label);
    }

    WEEKDAYS
        .iter()
        .zip(buckets)
        .map(|(day, (count, sum))| WeekdayActivity {
            day: (*day).to_string(),
            entries: count,
            average_mood: if count > 0 {
                round1(sum / count as f64)
            } else {
                0.0
            },
        })
        .collect()
}

pub fn mood_distribution(entries: &[JournalEntry]) -> MoodDistribution {
    entries
        .iter()
        .fold(MoodDistribution::default(), |mut dist, entry| {
            match entry.sentiment_label {
                Some(SentimentLabel::Positive) => dist.positive += 1,
                Some(SentimentLabel::Negative) => dist.negative += 1,
                Some(SentimentLabel::Neutral) | None => dist.neutral += 1,
            }
            dist
        })
}

pub fn wellness_score(distribution: &MoodDistribution) -> u8 {
    percent(distribution.positive, distribution.total())
}

/// Consecutive days with activity, ending today or yesterday.
pub fn current_streak<I>(days: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: HashSet<NaiveDate> = days.into_iter().collect();
    let yesterday = today - Duration::days(1);

    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

pub fn entry_streak(entries: &[JournalEntry], offset: &FixedOffset, today: NaiveDate) -> u32 {
    current_streak(
        entries.iter().map(|e| local_date(&e.created_at, offset)),
        today,
    )
}

pub fn generate_insights(
    entries: &[JournalEntry],
    wellness_score: u8,
    rules: &InsightRules,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(message) = rules.tier_message(wellness_score) {
        insights.push(message.to_string());
    }

    let recent = entries
        .iter()
        .rev()
        .take(rules.consistency.recent_window)
        .count();
    if recent >= rules.consistency.min_entries {
        insights.push(rules.consistency.message.clone());
    }

    if !entries.is_empty() {
        let total_chars: usize = entries.iter().map(|e| e.content.chars().count()).sum();
        let average = total_chars as f64 / entries.len() as f64;
        if average > rules.reflection.min_average_chars {
            insights.push(rules.reflection.message.clone());
        }
    }

    insights
}

pub fn summarize_metrics(metrics: &[WellnessMetric]) -> MetricsSummary {
    if metrics.is_empty() {
        return MetricsSummary::default();
    }

    MetricsSummary {
        days_logged: metrics.len() as u32,
        average_sleep_hours: mean(metrics, |m| m.sleep_hours),
        average_exercise_minutes: mean(metrics, |m| m.exercise_minutes as f64),
        average_water_glasses: mean(metrics, |m| m.water_glasses as f64),
        average_energy_level: mean(metrics, |m| m.energy_level as f64),
        average_stress_level: mean(metrics, |m| m.stress_level as f64),
    }
}

fn mean<F>(metrics: &[WellnessMetric], field: F) -> Option<f64>
where
    F: Fn(&WellnessMetric) -> f64,
{
    if metrics.is_empty() {
        return None;
    }
    let sum: f64 = metrics.iter().map(field).sum();
    Some(round1(sum / metrics.len() as f64))
}

pub fn build_report(
    entries: &[JournalEntry],
    rules: &AnalyticsRules,
    offset: &FixedOffset,
    today: NaiveDate,
    window_days: i64,
) -> AnalyticsReport {
    let mood_trend = daily_mood_trend(entries, &rules.mood_scale, offset);
    let weekly_activity = weekly_activity(entries, &rules.mood_scale, offset);
    let mood_distribution = mood_distribution(entries);
    let wellness_score = wellness_score(&mood_distribution);
    let streak = entry_streak(entries, offset, today);
    let insights = generate_insights(entries, wellness_score, &rules.insights);

    let total_entries = entries.len() as u32;
    let active_days = mood_trend.len() as u32;
    let week_start = today - Duration::days(6);
    let entries_last_7_days = entries
        .iter()
        .filter(|e| local_date(&e.created_at, offset) >= week_start)
        .count() as u32;

    AnalyticsReport {
        window_days,
        total_entries,
        active_days,
        average_entries_per_day: if active_days > 0 {
            round1(total_entries as f64 / active_days as f64)
        } else {
            0.0
        },
        entries_last_7_days,
        mood_percentages: mood_distribution.percentages(),
        mood_trend,
        weekly_activity,
        mood_distribution,
        wellness_score,
        streak,
        insights,
    }
}
