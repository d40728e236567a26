//! Browse active listings as a visitor
//!
//! Usage: `browse [search terms] [category slug]`

use chrono::Utc;
use dotenv::dotenv;
use grabi::format::{format_price, time_ago};
use grabi::prelude::*;
use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let grabi = Grabi::from_env()?;
    let locale = grabi.options.locale;
    let mut args = std::env::args().skip(1);

    let filter = ListingFilter {
        search: args.next(),
        category_id: args.next(),
        ..Default::default()
    };

    let catalog = grabi.catalog();
    if let Some(slug) = filter.category_id.as_deref() {
        match catalog.find(slug) {
            Some(category) => println!("== {} ==", category.name(locale)),
            None => println!("Unknown category {}", slug),
        }
    }

    let page = grabi.listings().browse(&filter, 0).await?;
    info!("{} listings match", page.total.unwrap_or(0));

    let now = Utc::now();
    for listing in &page.items {
        let posted = listing
            .created_at
            .map(|at| time_ago(at, now, locale))
            .unwrap_or_default();
        println!(
            "{:<40} {:>16}  {}  {}",
            listing.title,
            format_price(listing.price, &listing.currency),
            listing.location,
            posted
        );
    }

    if page.has_more() {
        let remaining = page.total.unwrap_or(0).saturating_sub(u64::from(page.next_offset()));
        println!("... {} more", remaining);
    }

    Ok(())
}
