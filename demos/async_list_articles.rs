//! List recent articles for a tag, newest first, using the async `DevClient`.
//!
//! Run:
//! `DEV_API_KEY=<key> cargo run --example async_list_articles -- rust`
//!
//! Optional env vars:
//! - `DEV_HOST` (defaults to https://dev.to/api)

use devto_client::{ArticleQueryParams, DevClient, Options};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = match std::env::var("DEV_API_KEY") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set DEV_API_KEY before running this example.");
            std::process::exit(2);
        }
    };
    let tag = std::env::args().nth(1).unwrap_or_else(|| "rust".to_owned());

    let client = DevClient::new(Options {
        host: std::env::var("DEV_HOST").ok(),
        token,
        timeout: None,
    })?;

    let params = ArticleQueryParams {
        per_page: Some(10),
        tag: Some(tag),
        ..ArticleQueryParams::default()
    };
    for article in client.get_published_articles_sorted(&params).await? {
        println!(
            "{}  {}  ({})",
            article.published_at.as_deref().unwrap_or("-"),
            article.title,
            article.user.username
        );
    }
    Ok(())
}
