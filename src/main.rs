use anyhow::Result;
use fbrefscraper::{
    discover::{self, CompetitionEntry, Tier},
    error::ScrapeError,
    export::{self, Dataset},
    fetch,
    normalize::{self, LeagueTable},
};
use std::{
    path::Path,
    thread,
    time::{Duration, Instant},
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Pause between league fetches so we don't hammer the source server.
const REQUEST_DELAY: Duration = Duration::from_secs(3);
const OUTPUT_FILE: &str = "Football_Players_Data.csv";
const CATALOG_FILE: &str = "leagues.json";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) discover domestic leagues by tier ────────────────────────
    let catalog = discover::discover_catalog(discover::COMPETITIONS_URL);
    if catalog.is_empty() {
        anyhow::bail!("no domestic leagues discovered");
    }
    for tier in Tier::ALL {
        info!("{tier}: {} leagues", catalog.tier(tier).len());
    }
    export::write_catalog_json(&catalog, Path::new(CATALOG_FILE))?;

    // ─── 3) scrape each league sequentially ──────────────────────────
    let start = Instant::now();
    let total = catalog.len();
    let mut dataset = Dataset::default();
    let mut successes = 0usize;
    let mut failures: Vec<String> = Vec::new();
    let mut players_per_tier = [0usize; 3];
    let mut counter = 0usize;

    for (tier_index, tier) in Tier::ALL.into_iter().enumerate() {
        for entry in catalog.tier(tier) {
            counter += 1;
            info!("[{counter}/{total}] scraping {} ({tier})", entry.name);

            match scrape_league(entry) {
                Ok(mut table) => {
                    table.insert_column(1, "Tier", &tier.to_string());
                    info!(
                        "scraped {} players from {} ({} columns)",
                        table.rows.len(),
                        entry.name,
                        table.columns.len()
                    );
                    players_per_tier[tier_index] += table.rows.len();
                    dataset.append(table);
                    successes += 1;
                }
                Err(err) => {
                    error!("{} failed: {err}", entry.name);
                    failures.push(format!("{} ({tier})", entry.name));
                }
            }

            if counter < total {
                thread::sleep(REQUEST_DELAY);
            }
        }
    }

    // ─── 4) persist & summarize ──────────────────────────────────────
    if dataset.is_empty() {
        warn!("no data scraped from any league");
        return Ok(());
    }
    dataset.write_csv(Path::new(OUTPUT_FILE))?;

    info!(
        "{successes}/{total} leagues scraped, {} player rows, {} columns → {OUTPUT_FILE}",
        dataset.row_count(),
        dataset.columns().len()
    );
    for (tier_index, tier) in Tier::ALL.into_iter().enumerate() {
        info!("{tier}: {} players", players_per_tier[tier_index]);
    }
    if !failures.is_empty() {
        warn!("failed leagues ({}): {}", failures.len(), failures.join(", "));
    }
    info!("completed in {:?}", start.elapsed());

    Ok(())
}

/// Fetch and normalize one league. Any error here is recovered at the
/// call site; the run continues with the next league.
fn scrape_league(entry: &CompetitionEntry) -> Result<LeagueTable, ScrapeError> {
    let html = fetch::fetch_page(&entry.locator)?;
    normalize::scrape_league(&html, &entry.name)
}
