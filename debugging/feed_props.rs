//! Fetch a storefront feed and print the formatted envelope.
//! Usage:
//!   cargo run --bin feed_props -- popular [page]
//!   cargo run --bin feed_props -- now_playing [page]
//!   cargo run --bin feed_props -- search <query> [page]
//!   cargo run --bin feed_props -- genre <genre_id> [page]
//!   cargo run --bin feed_props -- genres
//!   cargo run --bin feed_props -- details <movie_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cinestore::catalog::Catalog;
use cinestore::config::TmdbConfig;
use cinestore::storefront::{FeedKind, FeedOptions, Storefront};
use cinestore::tmdb::TmdbClient;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin feed_props -- <popular|now_playing> [page]");
    eprintln!("       cargo run --bin feed_props -- search <query> [page]");
    eprintln!("       cargo run --bin feed_props -- genre <genre_id> [page]");
    eprintln!("       cargo run --bin feed_props -- genres");
    eprintln!("       cargo run --bin feed_props -- details <movie_id>");
    std::process::exit(1);
}

fn parse_page(arg: Option<&String>) -> Result<u32> {
    arg.map(|p| p.parse().context("page must be a positive integer"))
        .transpose()
        .map(|p| p.unwrap_or(1))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1) else {
        usage();
    };

    let config = TmdbConfig::from_env()?;
    let region = config.region.clone();
    let client = TmdbClient::new(config)?;
    let store = Storefront::new(Catalog::new(Arc::new(client)).with_region(region));

    let output = match command.as_str() {
        "genres" => serde_json::to_value(store.formatted_genres().await)?,
        "details" => {
            let id: u64 = args
                .get(2)
                .unwrap_or_else(|| usage())
                .parse()
                .context("movie_id must be an integer")?;
            serde_json::to_value(store.formatted_movie_details(id).await)?
        }
        "search" | "genre" => {
            let arg = args.get(2).unwrap_or_else(|| usage());
            let kind = FeedKind::from_name(command);
            let options = FeedOptions {
                query: (kind == FeedKind::Search).then(|| arg.clone()),
                genre_id: match kind {
                    FeedKind::Genre => Some(arg.parse().context("genre_id must be an integer")?),
                    _ => None,
                },
                page: parse_page(args.get(3))?,
            };
            serde_json::to_value(store.formatted_movies(kind, &options).await)?
        }
        other => {
            let options = FeedOptions {
                page: parse_page(args.get(2))?,
                ..FeedOptions::default()
            };
            let kind = FeedKind::from_name(other);
            serde_json::to_value(store.formatted_movies(kind, &options).await)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
