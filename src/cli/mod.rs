mod settings;

pub use settings::Settings;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::logging;
use crate::services::document::fenced;
use crate::services::{
    format_duration, is_scheduled_event, select_summary_date, Aggregator, StoreService,
    SummarySource, SyncService, WakaTimeClient,
};
use crate::types::{CodetallyError, LanguageEntry, Result, Store};

/// Keeps a README section in sync with accumulated WakaTime coding time
#[derive(Parser)]
#[command(name = "codetally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, store, and re-render the README section (default)
    Sync,

    /// Re-render the README section from the store without fetching
    Render,

    /// Print the aggregated totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        logging::init(self.settings.debug);

        match self.command {
            None | Some(Commands::Sync) => {
                let api_key = self.settings.require_api_key()?;
                let client = WakaTimeClient::new(
                    &self.settings.api_base_url,
                    api_key,
                    Duration::from_secs(self.settings.timeout_secs),
                )?;
                sync(&self.settings, client, Utc::now())?;
            }
            Some(Commands::Render) => {
                render(&self.settings)?;
            }
            Some(Commands::Stats { json }) => {
                stats(&self.settings, json)?;
            }
        }
        Ok(())
    }
}

/// Full run: select date, fetch, merge, save, render, patch.
/// Returns whether the document changed.
fn sync<S: SummarySource>(settings: &Settings, source: S, now: DateTime<Utc>) -> Result<bool> {
    let region = settings.region()?;

    let scheduled = is_scheduled_event(settings.event_name.as_deref());
    let (summary_date, reason) =
        select_summary_date(settings.summary_date.as_deref(), scheduled, now)?;
    info!(%summary_date, ?reason, "selected summary date");

    let store_service = settings.store_service()?;
    let mut store = load_store(&store_service);

    let service = SyncService::new(source, settings.ignore_set(), settings.backfill_days);
    service.run(&mut store, summary_date)?;

    store.updated_at = Some(now);
    store_service.save(&store)?;
    info!(path = %store_service.path().display(), days = store.len(), "store saved");

    let block = settings
        .renderer()
        .render(&Aggregator::summarize(&store), store.date_span());
    region.update_file(&settings.readme_path, &fenced(&block))
}

/// Offline re-render from whatever the store holds
fn render(settings: &Settings) -> Result<bool> {
    let region = settings.region()?;
    let store = load_store(&settings.store_service()?);

    let block = settings
        .renderer()
        .render(&Aggregator::summarize(&store), store.date_span());
    region.update_file(&settings.readme_path, &fenced(&block))
}

fn load_store(service: &StoreService) -> Store {
    let (store, warning) = service.load();
    if let Some(warning) = warning {
        warn!(path = %service.path().display(), %warning, "starting from an empty store");
    }
    store
}

#[derive(Debug, Serialize)]
struct StatsReport {
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    days: usize,
    grand_total_seconds: u64,
    grand_total_text: String,
    languages: Vec<LanguageEntry>,
}

fn stats_report(settings: &Settings, store: &Store) -> StatsReport {
    let summary = Aggregator::summarize(store);
    let span = store.date_span();
    StatsReport {
        first_date: span.map(|(first, _)| first),
        last_date: span.map(|(_, last)| last),
        days: store.len(),
        grand_total_seconds: summary.grand_total_seconds,
        grand_total_text: format_duration(summary.grand_total_seconds),
        languages: settings.renderer().entries(&summary),
    }
}

fn stats(settings: &Settings, json: bool) -> Result<()> {
    let store = load_store(&settings.store_service()?);

    if json {
        let report = stats_report(settings, &store);
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CodetallyError::Parse(e.to_string()))?;
        println!("{}", out);
    } else {
        let block = settings
            .renderer()
            .render(&Aggregator::summarize(&store), store.date_span());
        println!("{}", block);
    }
    Ok(())
}
