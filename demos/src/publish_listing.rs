//! Publish a listing: sign in, pay the listing fee, confirm on return
//!
//! Usage: `publish_listing <email> <password> <photo.jpg>`
//!
//! The demo prints the checkout link, then waits for the return URL the
//! payment page redirected to and confirms it.

use dotenv::dotenv;
use grabi::format::format_price;
use grabi::prelude::*;
use log::info;
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [email, password, photo] = args.as_slice() else {
        eprintln!("usage: publish_listing <email> <password> <photo.jpg>");
        std::process::exit(2);
    };

    let grabi = Grabi::from_env()?;
    let locale = grabi.options.locale;
    grabi.auth().sign_in(email, password).await?;

    let Some(state) = grabi.profiles().bootstrap().await? else {
        eprintln!("{}", MessageKey::NotAuthenticated.text(locale));
        std::process::exit(1);
    };
    info!(
        "signed in as {} (profile {}% complete)",
        state.profile.display_name(),
        state.profile.completion_percentage()
    );

    let draft = ListingDraft {
        title: "Vélo tout terrain".to_string(),
        description: "Cadre aluminium, freins à disque, très peu servi.".to_string(),
        price: Some(85_000),
        currency: None,
        location: "Dakar, Mermoz".to_string(),
        category_id: "loisirs".to_string(),
        subcategory_id: None,
        images: vec![ImageUpload::from_file(photo).await?],
    };

    let publication = grabi.publication();
    let started = match publication.start(draft).await {
        Ok(started) => started,
        Err(e) => {
            eprintln!("{}", e.user_message(locale));
            return Err(e.into());
        }
    };

    println!(
        "Listing fee {}: pay at {}",
        format_price(grabi.options.listing_fee, &grabi.options.fee_currency),
        started.launch_url
    );
    print!("Paste the return URL: ");
    io::stdout().flush()?;

    let mut return_url = String::new();
    io::stdin().lock().read_line(&mut return_url)?;

    let outcome = publication.confirm_from_return_url(return_url.trim()).await?;
    println!("{}", outcome.message(locale));
    match outcome {
        PaymentOutcome::Published { listing_id } => println!("Listing id: {}", listing_id),
        PaymentOutcome::Pending => println!("Run again with the same URL to check later."),
        PaymentOutcome::Failed(err) if err.can_retry => println!("You can start a new payment."),
        PaymentOutcome::Failed(_) => {}
    }

    Ok(())
}
