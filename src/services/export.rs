//! Journal export in three formats: a printable HTML document, CSV and a
//! JSON archive. Rendering is pure; the handler fetches and filters.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entry::{JournalEntry, SentimentLabel};
use crate::models::goal::Goal;
use crate::models::metric::WellnessMetric;
use crate::services::analytics::{mood_distribution, MoodDistribution};
use crate::services::search::DateRange;

pub const PLATFORM: &str = "Inner Thought Bloom";
const MISSING: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Printable HTML; browsers save it as PDF.
    #[default]
    #[serde(alias = "pdf")]
    Html,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportRange {
    #[default]
    All,
    Week,
    Month,
    Year,
}

impl ExportRange {
    pub fn as_str(&self) -> &'static str {
        self.as_date_range().as_str()
    }

    pub fn as_date_range(&self) -> DateRange {
        match self {
            Self::All => DateRange::All,
            Self::Week => DateRange::Week,
            Self::Month => DateRange::Month,
            Self::Year => DateRange::Year,
        }
    }

    pub fn lower_bound(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        // None of the export ranges depend on the local calendar day
        self.as_date_range().lower_bound(now, &Utc.fix())
    }

    fn period_label(&self) -> String {
        match self {
            Self::All => "All time".to_string(),
            other => format!("Last {}", other.as_str()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub range: ExportRange,
    pub tz_offset_minutes: Option<i32>,
}

/// Everything one export covers, already filtered to the range.
pub struct ExportData<'a> {
    pub entries: &'a [JournalEntry],
    pub metrics: &'a [WellnessMetric],
    pub goals: &'a [Goal],
    pub range: ExportRange,
    pub generated_at: DateTime<Utc>,
    pub offset: FixedOffset,
}

#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    pub export_info: ExportInfo,
    pub memories: Vec<ExportedMemory>,
    pub wellness_metrics: Vec<WellnessMetric>,
    pub goals: Vec<Goal>,
    pub statistics: ExportStatistics,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportInfo {
    pub platform: String,
    pub export_date: DateTime<Utc>,
    pub date_range: String,
    pub total_entries: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMemory {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub mood: Option<SentimentLabel>,
    pub mood_intensity: Option<i32>,
    pub ai_insight: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStatistics {
    pub mood_distribution: MoodDistribution,
}

pub fn filename(range: ExportRange, format: ExportFormat, generated_at: DateTime<Utc>) -> String {
    format!(
        "inner-thought-bloom-journal-{}-{}.{}",
        range.as_str(),
        generated_at.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Render `data` in `format`. Callers reject an empty entry set first.
pub fn render(data: &ExportData<'_>, format: ExportFormat) -> anyhow::Result<ExportFile> {
    let body = match format {
        ExportFormat::Html => render_html(data),
        ExportFormat::Csv => render_csv(data)?,
        ExportFormat::Json => render_json(data)?,
    };

    Ok(ExportFile {
        filename: filename(data.range, format, data.generated_at),
        content_type: format.content_type(),
        body,
    })
}

fn local_date(ts: &DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%Y-%m-%d").to_string()
}

fn local_time(ts: &DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%H:%M:%S").to_string()
}

pub fn render_html(data: &ExportData<'_>) -> String {
    let offset = &data.offset;
    let dist = mood_distribution(data.entries);
    let mut html = String::with_capacity(4096 + data.entries.len() * 512);

    html.push_str(HTML_HEAD);
    let _ = write!(
        html,
        r#"<div class="header">
  <h1>🌸 {PLATFORM}</h1>
  <p>Personal Wellness Journal Export</p>
  <p>Generated on {}</p>
  <p>Total Entries: {}</p>
</div>
"#,
        local_date(&data.generated_at, offset),
        data.entries.len()
    );

    for entry in data.entries {
        let _ = write!(
            html,
            r#"<div class="memory">
  <div class="memory-header">
    <span class="memory-date">{} at {}</span>
"#,
            local_date(&entry.created_at, offset),
            local_time(&entry.created_at, offset)
        );
        if let Some(label) = entry.sentiment_label {
            let _ = writeln!(html, r#"    <span class="mood-badge">{label}</span>"#);
        }
        html.push_str("  </div>\n");

        let content = html_escape::encode_text(&entry.content).replace('\n', "<br>");
        let _ = writeln!(html, r#"  <div class="memory-content">{content}</div>"#);

        if let Some(feedback) = entry.ai_feedback.as_deref() {
            let _ = write!(
                html,
                r#"  <div class="ai-feedback">
    <h4>💡 AI Wellness Insight</h4>
    <p>{}</p>
  </div>
"#,
                html_escape::encode_text(feedback)
            );
        }
        html.push_str("</div>\n");
    }

    let _ = write!(
        html,
        r#"<div class="stats">
  <h3>📊 Export Summary</h3>
  <p><strong>Period:</strong> {}</p>
  <p><strong>Total Entries:</strong> {}</p>
  <p><strong>Mood Distribution:</strong></p>
  <ul>
    <li>Positive: {} entries</li>
    <li>Neutral: {} entries</li>
    <li>Negative: {} entries</li>
  </ul>
</div>
</body>
</html>
"#,
        data.range.period_label(),
        data.entries.len(),
        dist.positive,
        dist.neutral,
        dist.negative
    );

    html
}

pub fn render_csv(data: &ExportData<'_>) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["Date", "Time", "Content", "Mood", "Intensity", "AI Feedback"])?;

    for entry in data.entries {
        let mood = entry.sentiment_label.map_or(MISSING, |l| l.as_str());
        let intensity = entry
            .mood_intensity
            .map_or_else(|| MISSING.to_string(), |i| i.to_string());
        writer.write_record([
            local_date(&entry.created_at, &data.offset).as_str(),
            local_time(&entry.created_at, &data.offset).as_str(),
            entry.content.as_str(),
            mood,
            intensity.as_str(),
            entry.ai_feedback.as_deref().unwrap_or(MISSING),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render_json(data: &ExportData<'_>) -> anyhow::Result<String> {
    let export = JsonExport {
        export_info: ExportInfo {
            platform: PLATFORM.to_string(),
            export_date: data.generated_at,
            date_range: data.range.as_str().to_string(),
            total_entries: data.entries.len(),
        },
        memories: data
            .entries
            .iter()
            .map(|e| ExportedMemory {
                id: e.id,
                content: e.content.clone(),
                created_at: e.created_at,
                mood: e.sentiment_label,
                mood_intensity: e.mood_intensity,
                ai_insight: e.ai_feedback.clone(),
            })
            .collect(),
        wellness_metrics: data.metrics.to_vec(),
        goals: data.goals.to_vec(),
        statistics: ExportStatistics {
            mood_distribution: mood_distribution(data.entries),
        },
    };

    Ok(serde_json::to_string_pretty(&export)?)
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Inner Thought Bloom - Journal Export</title>
<style>
  body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; }
  .header { text-align: center; border-bottom: 2px solid #8b5cf6; padding-bottom: 20px; margin-bottom: 30px; }
  .header h1 { color: #8b5cf6; margin: 0; }
  .header p { color: #666; margin: 5px 0; }
  .memory { margin-bottom: 30px; padding: 20px; border: 1px solid #e0e0e0; border-radius: 8px; background: #fafafa; }
  .memory-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 15px; }
  .memory-date { color: #666; font-size: 14px; }
  .mood-badge { background: #8b5cf6; color: white; padding: 4px 8px; border-radius: 4px; font-size: 12px; text-transform: capitalize; }
  .memory-content { margin-bottom: 15px; line-height: 1.8; }
  .ai-feedback { background: #f0f7ff; border-left: 4px solid #8b5cf6; padding: 15px; margin-top: 15px; border-radius: 4px; }
  .ai-feedback h4 { margin: 0 0 10px 0; color: #8b5cf6; }
  .stats { background: #f9f9f9; padding: 20px; border-radius: 8px; margin-top: 30px; }
  .stats h3 { margin-top: 0; color: #8b5cf6; }
</style>
</head>
<body>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap()
    }

    fn entries() -> Vec<JournalEntry> {
        vec![
            JournalEntry {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                content: "She said \"hello\"\nand <waved>".into(),
                sentiment_score: Some(0.6),
                sentiment_label: Some(SentimentLabel::Positive),
                ai_feedback: Some("Lovely moment & worth keeping".into()),
                mood_intensity: Some(4),
                created_at: Utc.with_ymd_and_hms(2026, 6, 9, 18, 30, 0).unwrap(),
            },
            JournalEntry {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                content: "Plain day".into(),
                sentiment_score: None,
                sentiment_label: None,
                ai_feedback: None,
                mood_intensity: None,
                created_at: Utc.with_ymd_and_hms(2026, 6, 8, 8, 5, 0).unwrap(),
            },
        ]
    }

    fn data(entries: &[JournalEntry]) -> ExportData<'_> {
        ExportData {
            entries,
            metrics: &[],
            goals: &[],
            range: ExportRange::Month,
            generated_at: generated_at(),
            offset: Utc.fix(),
        }
    }

    #[test]
    fn test_filename_pattern() {
        assert_eq!(
            filename(ExportRange::Week, ExportFormat::Csv, generated_at()),
            "inner-thought-bloom-journal-week-2026-06-10.csv"
        );
    }

    #[test]
    fn test_pdf_is_an_alias_for_html() {
        let q: ExportQuery = serde_json::from_str(r#"{"format": "pdf", "range": "year"}"#).unwrap();
        assert_eq!(q.format, ExportFormat::Html);
        assert_eq!(q.range, ExportRange::Year);
    }

    #[test]
    fn test_json_round_trip_keeps_entry_fields() {
        let entries = entries();
        let body = render_json(&data(&entries)).unwrap();
        let parsed: JsonExport = serde_json::from_str(&body).unwrap();

        assert_eq!(parsed.export_info.platform, PLATFORM);
        assert_eq!(parsed.export_info.date_range, "month");
        assert_eq!(parsed.export_info.total_entries, 2);
        assert_eq!(parsed.memories.len(), entries.len());
        for (memory, entry) in parsed.memories.iter().zip(&entries) {
            assert_eq!(memory.id, entry.id);
            assert_eq!(memory.content, entry.content);
            assert_eq!(memory.mood, entry.sentiment_label);
            assert_eq!(memory.mood_intensity, entry.mood_intensity);
            assert_eq!(memory.ai_insight, entry.ai_feedback);
        }
        assert_eq!(parsed.statistics.mood_distribution.positive, 1);
        assert_eq!(parsed.statistics.mood_distribution.total(), 2);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let entries = entries();
        let body = render_json(&data(&entries)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["exportInfo"]["exportDate"].is_string());
        assert!(value["memories"][0]["moodIntensity"].is_number());
        assert!(value["memories"][1]["aiInsight"].is_null());
        assert!(value["wellnessMetrics"].is_array());
    }

    #[test]
    fn test_csv_quotes_every_field_and_doubles_quotes() {
        let entries = entries();
        let body = render_csv(&data(&entries)).unwrap();
        let mut lines = body.lines();

        assert_eq!(
            lines.next(),
            Some(r#""Date","Time","Content","Mood","Intensity","AI Feedback""#)
        );
        assert!(body.contains("\"She said \"\"hello\"\"\nand <waved>\""));
        assert!(body.contains(r#""2026-06-08","08:05:00","Plain day","N/A","N/A","N/A""#));
    }

    #[test]
    fn test_csv_reads_back() {
        let entries = entries();
        let body = render_csv(&data(&entries)).unwrap();
        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], entries[0].content.as_str());
        assert_eq!(&rows[0][3], "positive");
        assert_eq!(&rows[0][4], "4");
    }

    #[test]
    fn test_html_escapes_user_text() {
        let entries = entries();
        let html = render_html(&data(&entries));
        assert!(html.contains("&lt;waved&gt;"));
        assert!(!html.contains("<waved>"));
        assert!(html.contains("Lovely moment &amp; worth keeping"));
        assert!(html.contains("<br>and"));
        assert!(html.contains("Period:</strong> Last month"));
        assert!(html.contains("Total Entries: 2"));
        assert!(html.contains(r#"<span class="mood-badge">positive</span>"#));
    }

    #[test]
    fn test_render_sets_content_type() {
        let entries = entries();
        let file = render(&data(&entries), ExportFormat::Json).unwrap();
        assert_eq!(file.content_type, "application/json");
        assert!(file.filename.ends_with(".json"));
    }
}
