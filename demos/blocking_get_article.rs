//! Fetch one article by id using the `BlockingDevClient`.
//!
//! Run:
//! `DEV_API_KEY=<key> cargo run --example blocking_get_article -- <id>`

use devto_client::{BlockingDevClient, Options};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = match std::env::var("DEV_API_KEY") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set DEV_API_KEY before running this example.");
            std::process::exit(2);
        }
    };
    let Some(id) = std::env::args().nth(1) else {
        eprintln!("usage: blocking_get_article <id>");
        std::process::exit(2);
    };

    let client = BlockingDevClient::new(Options::new(token))?;
    let article = client.get_published_article_by_id(id.parse()?)?;
    println!("{}", serde_json::to_string_pretty(&article)?);
    Ok(())
}
