pub mod analyzer;
pub mod llm;
pub mod phrases;
pub mod reconcile;
pub mod text;

pub use analyzer::SentimentAnalyzer;
pub use llm::{MockModelClient, ModelClient, OpenRouterClient};
pub use phrases::extract_top_phrases;
pub use reconcile::{reconcile, Entity, SentimentResult};
pub use text::{extract_word_counts, is_stop_word, process_text, stem_word, ProcessOptions};
