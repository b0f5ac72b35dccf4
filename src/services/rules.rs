//! Tunable business rules for the analytics aggregator.
//!
//! The mood scale and insight thresholds are data, not branching, so they can
//! be overridden from a JSON file (`ANALYTICS_RULES_PATH`) and tested on
//! their own. Any field left out of the file keeps its default.

use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::models::entry::SentimentLabel;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsRules {
    pub mood_scale: MoodScale,
    pub insights: InsightRules,
}

/// Scalar mood score per sentiment label. Entries without a label score as
/// neutral.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoodScale {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Default for MoodScale {
    fn default() -> Self {
        Self {
            positive: 4.0,
            neutral: 3.0,
            negative: 2.0,
        }
    }
}

impl MoodScale {
    pub fn score(&self, label: Option<SentimentLabel>) -> f64 {
        match label {
            Some(SentimentLabel::Positive) => self.positive,
            Some(SentimentLabel::Negative) => self.negative,
            Some(SentimentLabel::Neutral) | None => self.neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightRules {
    /// Checked highest `min_score` first; the first tier the score reaches wins.
    pub score_tiers: Vec<ScoreTier>,
    pub consistency: ConsistencyRule,
    pub reflection: ReflectionRule,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreTier {
    pub min_score: u8,
    pub message: String,
}

/// Praise when at least `min_entries` of the most recent `recent_window`
/// entries exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsistencyRule {
    pub recent_window: usize,
    pub min_entries: usize,
    pub message: String,
}

/// Praise when the average entry length (characters) exceeds
/// `min_average_chars`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReflectionRule {
    pub min_average_chars: f64,
    pub message: String,
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            score_tiers: vec![
                ScoreTier {
                    min_score: 70,
                    message: "🌟 You're maintaining excellent mental wellness! Keep up the great work."
                        .into(),
                },
                ScoreTier {
                    min_score: 50,
                    message: "💪 Your wellness journey is on track. Consider adding more self-care activities."
                        .into(),
                },
                ScoreTier {
                    min_score: 0,
                    message: "🤗 Remember to be kind to yourself. Consider reaching out for support if needed."
                        .into(),
                },
            ],
            consistency: ConsistencyRule::default(),
            reflection: ReflectionRule::default(),
        }
    }
}

impl Default for ConsistencyRule {
    fn default() -> Self {
        Self {
            recent_window: 7,
            min_entries: 5,
            message: "📝 Great job maintaining a consistent journaling habit this week!".into(),
        }
    }
}

impl Default for ReflectionRule {
    fn default() -> Self {
        Self {
            min_average_chars: 200.0,
            message: "✍️ Your entries are wonderfully detailed and reflective.".into(),
        }
    }
}

impl InsightRules {
    pub fn tier_message(&self, wellness_score: u8) -> Option<&str> {
        self.score_tiers
            .iter()
            .find(|tier| wellness_score >= tier.min_score)
            .map(|tier| tier.message.as_str())
    }
}

impl AnalyticsRules {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analytics rules from {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid analytics rules in {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut rules: AnalyticsRules = serde_json::from_str(raw)?;
        rules.normalize()?;
        Ok(rules)
    }

    fn normalize(&mut self) -> anyhow::Result<()> {
        let tiers = &mut self.insights.score_tiers;
        if tiers.is_empty() {
            bail!("insights.score_tiers must not be empty");
        }
        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));
        if tiers.last().map(|t| t.min_score) != Some(0) {
            bail!("insights.score_tiers needs a tier with min_score 0");
        }
        if self.insights.consistency.min_entries > self.insights.consistency.recent_window {
            bail!("insights.consistency.min_entries cannot exceed recent_window");
        }
        Ok(())
    }
}
