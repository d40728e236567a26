//! Show a seller's profile and reviews
//!
//! Usage: `seller_reviews <seller id>`

use dotenv::dotenv;
use grabi::format::format_rating;
use grabi::prelude::*;
use grabi::services::ReviewListView;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let Some(seller_id) = std::env::args().nth(1) else {
        eprintln!("usage: seller_reviews <seller id>");
        std::process::exit(2);
    };

    let grabi = Grabi::from_env()?;
    let locale = grabi.options.locale;

    let Some(profile) = grabi.profiles().get(&seller_id).await? else {
        eprintln!("{}", MessageKey::ProfileNotFound.text(locale));
        std::process::exit(1);
    };

    match profile.rating_average {
        Some(average) => println!(
            "{}  {}/5 ({})",
            profile.display_name(),
            format_rating(average, locale),
            profile.reviews_count
        ),
        None => println!("{}", profile.display_name()),
    }

    match grabi.reviews().view(&seller_id, 0, locale).await? {
        ReviewListView::Empty(text) => println!("{}", text),
        ReviewListView::Reviews(page) => {
            for review in &page.items {
                let author = review
                    .reviewer
                    .as_ref()
                    .and_then(|r| r.full_name.as_deref())
                    .unwrap_or("?");
                println!(
                    "{} {}  {}",
                    "★".repeat(review.rating as usize),
                    author,
                    review.comment.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}
