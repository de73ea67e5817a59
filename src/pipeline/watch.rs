// src/pipeline/watch.rs

//! Listing watch pipeline: fetch, diff, persist, notify.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{Config, CrawlerConfig, Credentials, Listing};
use crate::pipeline::diff::calculate_diff;
use crate::services::{ListingSource, Notifier};
use crate::storage::ListingStore;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Credentials were missing; nothing was fetched or sent
    MissingCredentials(Vec<&'static str>),
    /// Every crawled listing was already known
    NoNewListings,
    /// New listings were found and notifications attempted
    Notified,
}

/// Summary of a watch run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub crawled_count: usize,
    pub new_count: usize,
    pub stored_count: usize,
    pub sent_count: usize,
    pub failed_count: usize,
}

impl RunReport {
    fn new(outcome: RunOutcome, start_time: DateTime<Utc>) -> Self {
        Self {
            outcome,
            start_time,
            end_time: start_time,
            crawled_count: 0,
            new_count: 0,
            stored_count: 0,
            sent_count: 0,
            failed_count: 0,
        }
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// The connected services a run works with.
pub struct Watcher {
    source: Box<dyn ListingSource>,
    store: Box<dyn ListingStore>,
    notifier: Box<dyn Notifier>,
}

impl Watcher {
    pub fn new(
        source: impl ListingSource + 'static,
        store: impl ListingStore + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            store: Box::new(store),
            notifier: Box::new(notifier),
        }
    }

    /// Run one fetch, diff, persist, notify cycle.
    pub async fn run(&self, config: &Config) -> Result<RunReport> {
        let mut report = RunReport::new(RunOutcome::NoNewListings, Utc::now());

        let history = if config.store.strict {
            self.store.load_checked().await?
        } else {
            self.store.load().await
        };
        log::info!(
            "Loaded {} previously seen listings from {}",
            history.len(),
            self.store.location()
        );

        let crawled =
            collect_listings(self.source.as_ref(), &config.targets, &config.crawler).await?;
        report.crawled_count = crawled.len();

        let diff = calculate_diff(&history, &crawled);
        report.new_count = diff.added.len();

        let mut updated = history;
        updated.extend(diff.added.iter().cloned());
        self.store.save(&updated).await?;
        report.stored_count = updated.len();
        log::info!(
            "Saved {} listings to {}",
            updated.len(),
            self.store.location()
        );

        if !diff.has_changes() {
            log::info!("No new results found.");
            report.end_time = Utc::now();
            return Ok(report);
        }

        report.outcome = RunOutcome::Notified;
        let template = &config.notifications.message_template;
        for (index, listing) in diff.added.iter().enumerate() {
            let message = listing.format(template, index + 1);
            if self.notifier.notify(&message).await.is_sent() {
                report.sent_count += 1;
            } else {
                report.failed_count += 1;
            }
        }

        report.end_time = Utc::now();
        Ok(report)
    }
}

/// Check credentials, then connect services and run once.
///
/// When a credential is missing the run stops before `connect` is called, so
/// no network or store activity happens.
pub async fn run_watch<F>(config: &Config, connect: F) -> Result<RunReport>
where
    F: FnOnce(&Credentials) -> Result<Watcher>,
{
    let credentials = match config.telegram.credentials() {
        Ok(credentials) => credentials,
        Err(AppError::MissingCredentials(missing)) => {
            log::error!(
                "Missing {} environment variable(s)! Nothing was fetched.",
                missing.join(" and ")
            );
            return Ok(RunReport::new(
                RunOutcome::MissingCredentials(missing),
                Utc::now(),
            ));
        }
        Err(e) => return Err(e),
    };

    let watcher = connect(&credentials)?;
    watcher.run(config).await
}

/// Fetch every target and join the results in target order.
///
/// At most `max_concurrent` pages are in flight, and consecutive fetches start
/// at least `request_delay_ms` apart. The first fetch error aborts the crawl.
pub async fn collect_listings(
    source: &dyn ListingSource,
    targets: &[String],
    crawler: &CrawlerConfig,
) -> Result<Vec<Listing>> {
    let pacer = Pacer::new(Duration::from_millis(crawler.request_delay_ms));
    let concurrency = crawler.max_concurrent.max(1);

    let mut pages = stream::iter(targets.iter())
        .map(|url| {
            let pacer = &pacer;
            async move {
                pacer.wait().await;
                log::info!("Fetching {}", url);
                source.fetch(url).await
            }
        })
        .buffered(concurrency);

    let mut listings = Vec::new();
    while let Some(result) = pages.next().await {
        listings.extend(result?);
    }

    Ok(listings)
}

/// Spaces out the start of successive requests.
struct Pacer {
    delay: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_start: Mutex::new(None),
        }
    }

    /// Wait until `delay` has passed since the previous caller was released.
    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        // Held across the sleep so waiters are released one at a time.
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            tokio::time::sleep_until(previous + self.delay).await;
        }
        *last_start = Some(Instant::now());
    }
}
