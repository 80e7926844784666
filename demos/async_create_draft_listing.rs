//! Create an unpublished listing, then read it back by id.
//!
//! Run:
//! `DEV_API_KEY=<key> cargo run --example async_create_draft_listing`
//!
//! Optional env vars:
//! - `DEV_HOST` (defaults to https://dev.to/api)

use devto_client::{
    DevClient, ListingAction, ListingBody, ListingBodySchema, ListingCategory, Options,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = match std::env::var("DEV_API_KEY") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set DEV_API_KEY before running this example.");
            std::process::exit(2);
        }
    };

    let mut options = Options::new(token);
    options.host = std::env::var("DEV_HOST").ok();
    let client = DevClient::new(options)?;

    let mut listing = ListingBody::new(
        "Call for talks: systems programming meetup",
        "Submit a 20 minute talk.",
        ListingCategory::Cfp,
    );
    listing.tags = vec!["rust".to_owned(), "meetup".to_owned()];
    listing.action = Some(ListingAction::Draft);

    let created = client.create_listing(&ListingBodySchema { listing }).await?;
    let fetched = client.get_listing_by_id(created.id).await?;
    println!("{}", serde_json::to_string_pretty(&fetched)?);
    Ok(())
}
