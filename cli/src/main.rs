//! feedsync CLI
//!
//! Reads the posts feed from a backend and prints it page by page.
//! Configuration comes from environment variables (see `feedsync::Config`
//! and `options::FeedOptions`); a `.env` file is honoured.

mod options;

use std::sync::Arc;

use anyhow::{Context, Result};
use feedsync::domain::ports::SessionProvider;
use feedsync::{
    Config, FeedSynchronizer, HttpPostService, LoadOutcome, Post, StaticSession, StoredSession,
    SyncOptions,
};
use options::FeedOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the feed itself to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let options = FeedOptions::from_env()?;
    tracing::info!("Reading feed from {}", config.api_url);

    match &config.session_file {
        Some(path) => {
            let session = StoredSession::load(path)
                .with_context(|| format!("Failed to load session from {}", path.display()))?;
            session.on_unauthenticated(|| {
                tracing::error!("Session rejected - log in again to refresh the stored token")
            });
            run(&config, options, Arc::new(session)).await
        }
        None => {
            let session = StaticSession::new(config.api_token.clone());
            session.on_unauthenticated(|| {
                tracing::error!("Token rejected - set FEED_API_TOKEN to a valid token")
            });
            run(&config, options, Arc::new(session)).await
        }
    }
}

async fn run<S>(config: &Config, options: FeedOptions, session: Arc<S>) -> Result<()>
where
    S: SessionProvider + 'static,
{
    let service = Arc::new(
        HttpPostService::from_config(config, session.clone())
            .context("Failed to build HTTP client")?,
    );
    let sync = FeedSynchronizer::new(
        service.clone(),
        service,
        session,
        SyncOptions::from(config),
    );

    let search = options.query.search.clone().unwrap_or_default();
    let first = if options.query.is_empty() {
        sync.refresh().await
    } else {
        sync.set_query(options.query).await
    };
    let mut outcome = first.context("Failed to load the first page")?;

    // A search-only query is debounced; wait for its page to land
    if outcome == LoadOutcome::Scheduled {
        let mut updates = sync.subscribe();
        let snapshot = updates
            .wait_for(|snapshot| !snapshot.loading && snapshot.query.search == search)
            .await
            .context("Feed closed before the search completed")?
            .clone();
        if snapshot.unauthenticated {
            anyhow::bail!("Session rejected while searching");
        }
        if let Some(error) = snapshot.error {
            anyhow::bail!("Search failed: {}", error);
        }
        outcome = LoadOutcome::Loaded {
            appended: snapshot.items.len(),
        };
    }

    let mut printed = 0;
    let mut pages = 1;
    loop {
        let snapshot = sync.snapshot();
        for post in unprinted(&snapshot.items, printed) {
            print_post(post);
        }
        printed = snapshot.items.len();

        if !snapshot.has_more || pages >= options.max_pages {
            break;
        }
        outcome = sync
            .load_next_page()
            .await
            .with_context(|| format!("Failed to load page {}", pages + 1))?;
        pages += 1;
    }

    tracing::debug!("Last load: {:?}", outcome);
    let snapshot = sync.snapshot();
    match snapshot.total {
        Some(total) => println!("-- {} of {} posts", snapshot.items.len(), total),
        None => println!("-- {} posts", snapshot.items.len()),
    }

    Ok(())
}

/// Items past the ones already printed; empty if the feed shrank
fn unprinted<T>(items: &[T], printed: usize) -> impl Iterator<Item = &T> {
    items.iter().skip(printed)
}

fn print_post(post: &Post) {
    let headline = post
        .title
        .clone()
        .unwrap_or_else(|| post.content.lines().next().unwrap_or_default().to_string());
    let headline: String = headline.chars().take(72).collect();

    println!(
        "#{:<6} {:<20} {:>4} likes {:>3} comments  {}",
        post.id,
        post.author_name(),
        post.likes_count,
        post.comments_count,
        headline
    );
}
