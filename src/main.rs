use dotenv::dotenv;
use rust_sentiment::{OpenRouterClient, SentimentAnalyzer};
use std::io::{self, BufRead};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    // Each argument is one text to analyze; with no arguments, read one
    // text per stdin line
    let mut texts: Vec<String> = std::env::args().skip(1).collect();
    if texts.is_empty() {
        texts = io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
    }

    let client = Arc::new(OpenRouterClient::from_env()?);
    let analyzer = SentimentAnalyzer::new(client);

    if texts.len() == 1 {
        let result = analyzer.analyze(&texts[0]).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        eprintln!("🧠 [Sentiment] analyzing {} texts...", texts.len());
        let results = analyzer.analyze_many(&texts).await;
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}
