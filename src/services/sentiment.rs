use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::models::entry::SentimentLabel;

pub const FALLBACK_FEEDBACK: &str =
    "Unable to analyze your entry right now, but remember that journaling is a great step for mental wellness!";

const SYSTEM_PROMPT: &str = r#"You are a supportive mental health assistant. Analyze the sentiment of journal entries and provide compassionate feedback. Return a JSON object with:
- sentiment_score: number between -1 (very negative) and 1 (very positive)
- sentiment_label: "positive", "neutral", or "negative"
- feedback: encouraging message tailored to the sentiment (max 100 words)"#;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentAnalysis {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub feedback: String,
}

impl SentimentAnalysis {
    pub fn fallback() -> Self {
        Self {
            sentiment_score: 0.0,
            sentiment_label: SentimentLabel::Neutral,
            feedback: FALLBACK_FEEDBACK.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    sentiment_score: f64,
    sentiment_label: String,
    feedback: String,
}

/// OpenAI-compatible chat-completions client for entry sentiment.
#[derive(Clone)]
pub struct SentimentClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl SentimentClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// `None` when no API key is configured. Any failure of an enabled
    /// client degrades to the neutral fallback; it never fails the caller.
    pub async fn analyze(&self, content: &str) -> Option<SentimentAnalysis> {
        let api_key = self.api_key.as_deref()?;

        match self.request(api_key, content).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "Sentiment analysis unavailable, using fallback");
                Some(SentimentAnalysis::fallback())
            }
        }
    }

    async fn request(&self, api_key: &str, content: &str) -> anyhow::Result<SentimentAnalysis> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": format!("Analyze this journal entry: \"{}\"", content) }
                ],
                "response_format": { "type": "json_object" }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, body);
        }

        let completion: serde_json::Value = response.json().await?;
        let text = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("LLM response has no message content"))?;

        parse_analysis(text)
    }
}

fn parse_analysis(text: &str) -> anyhow::Result<SentimentAnalysis> {
    let raw: RawAnalysis = serde_json::from_str(text)?;
    let label = raw
        .sentiment_label
        .parse::<SentimentLabel>()
        .map_err(|e| anyhow::anyhow!(e))?;

    if !raw.sentiment_score.is_finite() {
        anyhow::bail!("sentiment_score is not a finite number");
    }

    Ok(SentimentAnalysis {
        sentiment_score: raw.sentiment_score.clamp(-1.0, 1.0),
        sentiment_label: label,
        feedback: raw.feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SentimentClient {
        let mut config = Config::for_tests();
        config.llm_api_key = Some("test-key".into());
        config.llm_base_url = server.uri();
        SentimentClient::new(&config).unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[tokio::test]
    async fn test_parses_successful_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"sentiment_score": 0.8, "sentiment_label": "Positive", "feedback": "Wonderful!"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let analysis = client_for(&server).analyze("Had a great walk").await.unwrap();
        assert_eq!(analysis.sentiment_label, SentimentLabel::Positive);
        assert_eq!(analysis.sentiment_score, 0.8);
        assert_eq!(analysis.feedback, "Wonderful!");
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let analysis = client_for(&server).analyze("anything").await;
        assert_eq!(analysis, Some(SentimentAnalysis::fallback()));
    }

    #[tokio::test]
    async fn test_unparseable_content_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("not json at all")))
            .mount(&server)
            .await;

        let analysis = client_for(&server).analyze("anything").await.unwrap();
        assert_eq!(analysis.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(analysis.sentiment_score, 0.0);
        assert_eq!(analysis.feedback, FALLBACK_FEEDBACK);
    }

    #[tokio::test]
    async fn test_disabled_without_api_key() {
        let client = SentimentClient::new(&Config::for_tests()).unwrap();
        assert!(!client.is_enabled());
        assert_eq!(client.analyze("anything").await, None);
    }

    #[test]
    fn test_score_is_clamped() {
        let parsed = parse_analysis(
            r#"{"sentiment_score": -3.5, "sentiment_label": "negative", "feedback": "Hang in there."}"#,
        )
        .unwrap();
        assert_eq!(parsed.sentiment_score, -1.0);
        assert_eq!(parsed.sentiment_label, SentimentLabel::Negative);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let result = parse_analysis(
            r#"{"sentiment_score": 0.1, "sentiment_label": "ecstatic", "feedback": "!"}"#,
        );
        assert!(result.is_err());
    }
}
