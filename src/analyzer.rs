//! Sentiment request orchestration.
//!
//! Wires input text through the model client and hands the raw reply to the
//! reconciler. Transport failures become terminal fallback results; callers
//! never see an error for a single-text request.

use crate::llm::ModelClient;
use crate::reconcile::{self, SentimentResult};
use std::sync::Arc;
use tokio::task::JoinSet;

const SENTIMENT_PROMPT: &str = r#"
Analyze the sentiment of the following text and provide a detailed breakdown.
Return the result as a valid JSON object with the following structure:

JSON_START
  "score": (number between -1 and 1, where -1 is very negative, 0 is neutral, and 1 is very positive),
  "magnitude": (number between 0 and 1 indicating the strength of emotion),
  "categories": [array of topic categories present in the text],
  "topPhrases": [array of up to 5 most significant phrases],
  "entities": [array of objects with "name" and "sentiment" properties for entities mentioned]
JSON_END

Text to analyze: {text}
"#;

#[derive(Clone)]
pub struct SentimentAnalyzer {
    client: Arc<dyn ModelClient>,
}

impl SentimentAnalyzer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Analyze a single text. Empty input still goes to the model; a
    /// transport failure resolves to the terminal fallback.
    pub async fn analyze(&self, text: &str) -> SentimentResult {
        let prompt = build_prompt(text);
        match self.client.invoke(&prompt).await {
            Ok(raw) => reconcile::reconcile(&raw, text),
            Err(e) => {
                eprintln!("⚠️ [Sentiment] model call failed: {}", e);
                reconcile::terminal_fallback(text)
            }
        }
    }

    /// Analyze a batch concurrently, one independent model call per item.
    /// Results come back in input order; a failed task degrades only its
    /// own slot to the terminal fallback.
    pub async fn analyze_many(&self, texts: &[String]) -> Vec<SentimentResult> {
        let mut set = JoinSet::new();
        for (index, text) in texts.iter().enumerate() {
            let analyzer = self.clone();
            let text = text.clone();
            set.spawn(async move { (index, analyzer.analyze(&text).await) });
        }

        let mut results: Vec<SentimentResult> = texts
            .iter()
            .map(|text| reconcile::terminal_fallback(text))
            .collect();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = result,
                Err(e) => eprintln!("⚠️ [Sentiment] batch task failed: {}", e),
            }
        }

        results
    }
}

fn build_prompt(text: &str) -> String {
    SENTIMENT_PROMPT.replace("{text}", text)
}
