// src/discover/mod.rs
//! League discovery from the fbref competitions directory page.
//!
//! The page is a flat sequence of section headings and tables. Headings
//! tell us which competitive tier the following tables belong to, so the
//! walk is a fold over `h2/h3/h4/table` elements carrying a current-tier
//! value forward.
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

use crate::fetch;

pub const COMPETITIONS_URL: &str = "https://fbref.com/en/comps/";
const BASE_URL: &str = "https://fbref.com";

static COMP_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/comps/(\d+)/").expect("valid competition id pattern"));
/// Matches season labels like "2025" or "2024-2025".
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}(-\d{4})?$").expect("valid year pattern"));

/// Cup, qualifier and playoff competitions share the directory tables with
/// the leagues proper; none of them carry per-player season stats we want.
static CUP_KEYWORDS: &[&str] = &[
    "cup",
    "copa",
    "coupe",
    "pokal",
    "trophy",
    "trophée",
    "shield",
    "supercup",
    "qualification",
    "playoff",
    "championship playoff",
];

static INTERNATIONAL_KEYWORDS: &[&str] = &[
    "champions league",
    "europa league",
    "conference league",
    "world cup",
    "euro",
    "copa america",
    "nations league",
    "uefa",
    "fifa",
    "international",
    "olympics",
    "libertadores",
    "concacaf",
    "afc",
    "caf",
    "cup of nations",
];

/// Competitive level of a domestic league, taken from which directory
/// section the league was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
}

impl Tier {
    /// All tiers, in scrape order.
    pub const ALL: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Tier3];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Tier1 => write!(f, "Tier 1"),
            Tier::Tier2 => write!(f, "Tier 2"),
            Tier::Tier3 => write!(f, "Tier 3"),
        }
    }
}

/// One discovered league. Immutable once emitted from the catalog walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompetitionEntry {
    pub name: String,
    pub id: u32,
    pub tier: Tier,
    /// Player stats page for this league, derived from `id` and `name`.
    pub locator: String,
}

/// Discovered leagues bucketed by tier, in document order within a tier.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    #[serde(rename = "Tier 1")]
    tier1: Vec<CompetitionEntry>,
    #[serde(rename = "Tier 2")]
    tier2: Vec<CompetitionEntry>,
    #[serde(rename = "Tier 3")]
    tier3: Vec<CompetitionEntry>,
}

impl Catalog {
    pub fn tier(&self, tier: Tier) -> &[CompetitionEntry] {
        match tier {
            Tier::Tier1 => &self.tier1,
            Tier::Tier2 => &self.tier2,
            Tier::Tier3 => &self.tier3,
        }
    }

    fn bucket_mut(&mut self, tier: Tier) -> &mut Vec<CompetitionEntry> {
        match tier {
            Tier::Tier1 => &mut self.tier1,
            Tier::Tier2 => &mut self.tier2,
            Tier::Tier3 => &mut self.tier3,
        }
    }

    pub fn len(&self) -> usize {
        self.tier1.len() + self.tier2.len() + self.tier3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record an entry in its tier's bucket. A repeated display name
    /// overwrites the earlier entry in place, keeping its position.
    fn insert(&mut self, entry: CompetitionEntry) {
        let bucket = self.bucket_mut(entry.tier);
        match bucket.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => bucket.push(entry),
        }
    }

    /// Final cleanup pass: the directory lists some competitions more than
    /// once under different labels. Within each tier, keep only the
    /// first-encountered entry per competition id.
    fn dedup_by_id(&mut self) {
        for tier in Tier::ALL {
            let mut seen = HashSet::new();
            self.bucket_mut(tier).retain(|entry| seen.insert(entry.id));
        }
    }
}

/// Player stats URL for a competition, fbref's slug convention.
pub fn stats_url(id: u32, name: &str) -> String {
    format!(
        "{BASE_URL}/en/comps/{id}/stats/{}-Stats",
        name.trim().replace(' ', "-")
    )
}

/// Tier transition triggered by a section heading, if any. `Some(None)`
/// means the heading exits domestic scope entirely.
fn classify_heading(text: &str) -> Option<Option<Tier>> {
    let text = text.to_lowercase();
    if text.contains("domestic leagues - 1st tier") || text.contains("domestic leagues-1st tier") {
        Some(Some(Tier::Tier1))
    } else if text.contains("domestic leagues - 2nd tier")
        || text.contains("domestic leagues-2nd tier")
    {
        Some(Some(Tier::Tier2))
    } else if text.contains("domestic leagues - 3rd tier")
        || text.contains("domestic leagues-3rd tier")
        || text.contains("3rd tier and lower")
    {
        Some(Some(Tier::Tier3))
    } else if ["international", "continental", "women", "youth"]
        .iter()
        .any(|kw| text.contains(kw))
    {
        Some(None)
    } else {
        None
    }
}

/// Exclusion filter for candidate link text. The directory tables mix the
/// league names we want with season labels, cups and international
/// tournaments.
fn is_league_name(text: &str) -> bool {
    if YEAR_RE.is_match(text) {
        return false;
    }
    let lower = text.to_lowercase();
    if CUP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return false;
    }
    if INTERNATIONAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return false;
    }
    if lower.starts_with("matchday") || lower.starts_with("round") {
        return false;
    }
    // Must contain at least one purely alphabetic word, not just
    // numbers/symbols.
    text.split_whitespace()
        .any(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
}

/// Walk the directory document and build the tier catalog.
pub fn build_catalog(html: &str) -> Catalog {
    let document = Html::parse_document(html);
    let section_selector =
        Selector::parse("h2, h3, h4, table").expect("valid section selector");
    let link_selector = Selector::parse("a[href]").expect("valid link selector");

    let mut catalog = Catalog::default();
    let mut current_tier: Option<Tier> = None;

    for element in document.select(&section_selector) {
        if element.value().name() != "table" {
            let text = element.text().collect::<String>();
            if let Some(transition) = classify_heading(text.trim()) {
                current_tier = transition;
            }
            continue;
        }

        let Some(tier) = current_tier else { continue };

        for link in element.select(&link_selector) {
            let Some(href) = link.value().attr("href") else { continue };
            if !href.contains("/comps/") {
                continue;
            }
            let text = link.text().collect::<String>().trim().to_string();
            if text.chars().count() <= 3 {
                continue;
            }
            let Some(caps) = COMP_ID_RE.captures(href) else { continue };
            let Ok(id) = caps[1].parse::<u32>() else { continue };
            if !is_league_name(&text) {
                continue;
            }

            let locator = stats_url(id, &text);
            catalog.insert(CompetitionEntry {
                name: text,
                id,
                tier,
                locator,
            });
        }
    }

    catalog.dedup_by_id();
    catalog
}

/// Fetch the competitions directory and build the catalog. Never fails: a
/// fetch or parse error yields three empty buckets, and the caller decides
/// whether zero discovered leagues is fatal.
pub fn discover_catalog(url: &str) -> Catalog {
    match fetch::fetch_page(url) {
        Ok(html) => {
            let catalog = build_catalog(&html);
            info!("discovered {} domestic leagues", catalog.len());
            catalog
        }
        Err(err) => {
            warn!("league discovery failed: {err}");
            Catalog::default()
        }
    }
}
