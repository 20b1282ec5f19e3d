// src/normalize/mod.rs
//! Turns one league's raw stats table into a column-consistent record set.
//!
//! Two independent views of the table are produced and reconciled: the
//! generic grid parse (which loses text fidelity and picks up repeated
//! header rows) and a manual walk of the body rows extracting player,
//! nationality and team exactly as they appear in the DOM. If the two
//! views cannot be row-aligned the league is rejected wholesale.
pub mod grid;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::ScrapeError;

/// Cell values that mark a repeated header row embedded in the table body.
const HEADER_MARKERS: [&str; 4] = ["Player", "Rk", "Age", "Nation"];

/// Columns injected from the manual extraction, ahead of the generic ones.
const INSERTED_COLUMNS: usize = 4;

/// The three side-band fields extracted per body row, original text
/// preserved byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlayerFields {
    player: String,
    nationality: String,
    team: String,
}

/// Final per-league table: `League, Player, Nationality, Team` followed by
/// whatever stat columns the source table carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LeagueTable {
    /// Insert a constant-valued column at `index`, e.g. the tier label the
    /// orchestrator adds after a successful normalize.
    pub fn insert_column(&mut self, index: usize, name: &str, value: &str) {
        self.columns.insert(index, name.to_string());
        for row in &mut self.rows {
            row.insert(index, value.to_string());
        }
    }
}

/// Find the main player stats table: the first `<table>` whose id carries
/// the `stats_players` or `stats_standard` marker.
pub fn find_stats_table(document: &Html) -> Option<ElementRef<'_>> {
    let table_selector = Selector::parse("table").expect("valid table selector");
    document.select(&table_selector).find(|table| {
        table
            .value()
            .attr("id")
            .is_some_and(|id| id.contains("stats_players") || id.contains("stats_standard"))
    })
}

/// Locate the stats table in a fetched league page and normalize it.
pub fn scrape_league(html: &str, league: &str) -> Result<LeagueTable, ScrapeError> {
    let document = Html::parse_document(html);
    let table = find_stats_table(&document).ok_or_else(|| ScrapeError::NoTableFound {
        league: league.to_string(),
    })?;
    normalize_table(table, league)
}

/// Preferred text for a cell: the first embedded link's text, else the
/// cell's own text, else `N/A` for an absent or empty cell.
fn link_or_cell_text(cell: ElementRef, link_selector: &Selector) -> String {
    if let Some(link) = cell.select(link_selector).next() {
        return link.text().collect();
    }
    let text: String = cell.text().collect();
    if text.is_empty() {
        "N/A".to_string()
    } else {
        text
    }
}

/// Manual side-band walk over the table body. Rows flagged as headers (a
/// `thead` class, a `th` player cell, or a player cell reading exactly
/// `Player`) and rows without a player cell are skipped.
fn extract_player_fields(table: ElementRef) -> Vec<PlayerFields> {
    let row_selector = Selector::parse("tbody > tr").expect("valid row selector");
    let header_cell_selector =
        Selector::parse(r#"th[data-stat="player"]"#).expect("valid header cell selector");
    let player_selector =
        Selector::parse(r#"td[data-stat="player"]"#).expect("valid player cell selector");
    let nationality_selector =
        Selector::parse(r#"td[data-stat="nationality"]"#).expect("valid nationality selector");
    let team_selector = Selector::parse(r#"td[data-stat="team"]"#).expect("valid team selector");
    let link_selector = Selector::parse("a").expect("valid link selector");
    let span_selector = Selector::parse("span").expect("valid span selector");

    let mut fields = Vec::new();

    for row in table.select(&row_selector) {
        let classes = row.value().attr("class").unwrap_or("");
        if classes.split_whitespace().any(|c| c.contains("thead")) {
            continue;
        }
        if row.select(&header_cell_selector).next().is_some() {
            continue;
        }
        let Some(player_cell) = row.select(&player_selector).next() else {
            continue;
        };
        if player_cell.text().collect::<String>().trim() == "Player" {
            continue;
        }

        let player = link_or_cell_text(player_cell, &link_selector);

        // The nationality cell nests two spans: a decorative flag first,
        // then the textual country code.
        let nationality = match row.select(&nationality_selector).next() {
            Some(cell) => {
                let spans: Vec<_> = cell.select(&span_selector).collect();
                if spans.len() >= 2 {
                    spans[1].text().collect()
                } else {
                    cell.text().collect()
                }
            }
            None => "N/A".to_string(),
        };

        let team = match row.select(&team_selector).next() {
            Some(cell) => link_or_cell_text(cell, &link_selector),
            None => "N/A".to_string(),
        };

        fields.push(PlayerFields {
            player,
            nationality,
            team,
        });
    }

    fields
}

/// Normalize one league's stats table into a [`LeagueTable`].
///
/// The generic grid parse and the manual extraction are reconciled by
/// truncating the longer side to the shorter; if either side ends up empty,
/// the league is rejected with both observed counts. Partial output is
/// never produced.
pub fn normalize_table(table: ElementRef, league: &str) -> Result<LeagueTable, ScrapeError> {
    let mut grid = grid::parse_table(table);

    // Long tables repeat their header every ~25 rows for readability; those
    // repeats show up as data rows in the generic parse.
    grid.rows.retain(|row| {
        !row.iter()
            .any(|cell| HEADER_MARKERS.iter().any(|marker| cell.contains(marker)))
    });

    let mut players = extract_player_fields(table);

    let generic_count = grid.rows.len();
    let manual_count = players.len();
    debug!(
        league,
        generic_count, manual_count, "reconciling parsed row counts"
    );

    // The manual walk is ground truth for row identity when it is the
    // shorter side; otherwise degrade to the generic count.
    if manual_count <= generic_count {
        grid.rows.truncate(manual_count);
    } else {
        players.truncate(generic_count);
    }

    if grid.rows.is_empty() || players.is_empty() || grid.rows.len() != players.len() {
        return Err(ScrapeError::RowMismatch {
            league: league.to_string(),
            generic: generic_count,
            manual: manual_count,
        });
    }

    let mut columns = grid.columns;
    let mut rows = grid.rows;
    for (row, fields) in rows.iter_mut().zip(&players) {
        row.insert(0, fields.team.clone());
        row.insert(0, fields.nationality.clone());
        row.insert(0, fields.player.clone());
        row.insert(0, league.to_string());
    }
    for name in ["Team", "Nationality", "Player", "League"] {
        columns.insert(0, name.to_string());
    }

    // The source tables of this family all end in a boilerplate "Matches"
    // link column. Only drop it while generic columns remain; a table
    // shaped differently would lose real data here.
    if columns.len() > INSERTED_COLUMNS {
        columns.pop();
        for row in &mut rows {
            row.pop();
        }
    } else {
        warn!(
            league,
            columns = columns.len(),
            "unexpectedly narrow table, keeping trailing column"
        );
    }

    Ok(LeagueTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A small fbref-shaped stats page: two-level header, a repeated header
    /// row mid-body, and the trailing Matches link column.
    fn stats_page(extra_rows: &str) -> String {
        format!(
            r#"<html><body>
            <table id="stats_standard_11">
                <thead>
                    <tr><th></th><th></th><th></th><th></th><th colspan="2">Performance</th><th></th></tr>
                    <tr><th>Rk</th><th>Player</th><th>Nation</th><th>Team</th><th>Gls</th><th>Ast</th><th>Matches</th></tr>
                </thead>
                <tbody>
                    <tr>
                        <th data-stat="ranker">1</th>
                        <td data-stat="player"><a href="/en/players/1">Luka Modrić</a></td>
                        <td data-stat="nationality"><span class="f-i"></span><span>hr CRO</span></td>
                        <td data-stat="team"><a href="/en/squads/1">Real Madrid</a></td>
                        <td data-stat="goals">2</td>
                        <td data-stat="assists">8</td>
                        <td data-stat="matches"><a href="/m">Matches</a></td>
                    </tr>
                    <tr class="thead">
                        <th>Rk</th><th>Player</th><th>Nation</th><th>Team</th><th>Gls</th><th>Ast</th><th>Matches</th>
                    </tr>
                    <tr>
                        <th data-stat="ranker">2</th>
                        <td data-stat="player"><a href="/en/players/2">Kylian Mbappé</a></td>
                        <td data-stat="nationality"><span class="f-i"></span><span>fr FRA</span></td>
                        <td data-stat="team"><a href="/en/squads/1">Real Madrid</a></td>
                        <td data-stat="goals">31</td>
                        <td data-stat="assists">3</td>
                        <td data-stat="matches"><a href="/m">Matches</a></td>
                    </tr>
                    {extra_rows}
                </tbody>
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn column_order_and_trailing_drop() {
        let table = stats_page("");
        let result = scrape_league(&table, "La Liga").unwrap();
        assert_eq!(
            &result.columns[..4],
            &["League", "Player", "Nationality", "Team"]
        );
        // The source Matches column is gone; Performance headers flattened.
        assert!(!result.columns.iter().any(|c| c.contains("Matches")));
        // The generic columns keep the table's own header names, including
        // its Player/Nation/Team columns alongside the injected ones.
        assert_eq!(
            result.columns[4..],
            ["Rk", "Player", "Nation", "Team", "Performance Gls", "Performance Ast"]
        );
    }

    #[test]
    fn preserves_original_player_text() {
        let table = stats_page("");
        let result = scrape_league(&table, "La Liga").unwrap();
        assert_eq!(result.rows[0][1], "Luka Modrić");
        assert_eq!(result.rows[0][2], "hr CRO");
        assert_eq!(result.rows[0][3], "Real Madrid");
        assert_eq!(result.rows[1][1], "Kylian Mbappé");
        assert_eq!(result.rows[0][0], "La Liga");
    }

    #[test]
    fn repeated_header_rows_are_dropped_from_both_views() {
        let table = stats_page("");
        let result = scrape_league(&table, "La Liga").unwrap();
        // Two real players; the mid-body header repeat contributed nothing.
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn literal_player_cell_is_excluded() {
        // A header repeat rendered as a plain data row: no thead class, td
        // cells, player cell reading exactly "Player". The marker filter
        // drops it from the grid and the manual walk skips it too.
        let extra = r#"
            <tr>
                <td data-stat="ranker">Rk</td>
                <td data-stat="player">Player</td>
                <td data-stat="nationality">Nation</td>
                <td data-stat="team">Team</td>
                <td data-stat="goals">Gls</td>
                <td data-stat="assists">Ast</td>
                <td data-stat="matches">Matches</td>
            </tr>"#;
        let table = stats_page(extra);
        let result = scrape_league(&table, "La Liga").unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn generic_surplus_truncated_to_manual_count() {
        // A spacer row with no player cell survives the generic parse but
        // not the manual walk: generic 3, manual 2, output 2.
        let extra = r#"
            <tr>
                <td>-</td><td>-</td><td>-</td><td>-</td><td>0</td><td>0</td><td>-</td>
            </tr>"#;
        let table = stats_page(extra);
        let result = scrape_league(&table, "La Liga").unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1][1], "Kylian Mbappé");
    }

    #[test]
    fn manual_surplus_truncated_to_generic_count() {
        // A real player row whose team name trips the "Nation" header
        // marker: the grid drops it, the manual walk keeps it. Generic 2,
        // manual 3, output 2.
        let extra = r#"
            <tr>
                <th data-stat="ranker">3</th>
                <td data-stat="player"><a href="/en/players/3">John Doe</a></td>
                <td data-stat="nationality"><span class="f-i"></span><span>sc SCO</span></td>
                <td data-stat="team"><a href="/en/squads/2">National FC</a></td>
                <td data-stat="goals">1</td>
                <td data-stat="assists">0</td>
                <td data-stat="matches"><a href="/m">Matches</a></td>
            </tr>"#;
        let table = stats_page(extra);
        let result = scrape_league(&table, "La Liga").unwrap();
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn empty_generic_parse_rejects_league() {
        let html = r#"<html><body>
            <table id="stats_players_9">
                <thead><tr><th>Rk</th><th>Player</th></tr></thead>
                <tbody></tbody>
            </table>
            </body></html>"#;
        let err = scrape_league(html, "Serie A").unwrap_err();
        match err {
            ScrapeError::RowMismatch {
                league,
                generic,
                manual,
            } => {
                assert_eq!(league, "Serie A");
                assert_eq!(generic, 0);
                assert_eq!(manual, 0);
            }
            other => panic!("expected RowMismatch, got {other}"),
        }
    }

    #[test]
    fn missing_stats_table_is_reported() {
        let html = r#"<html><body><table id="schedule"><tbody></tbody></table></body></html>"#;
        let err = scrape_league(html, "Serie A").unwrap_err();
        assert!(matches!(err, ScrapeError::NoTableFound { .. }));
    }

    #[test]
    fn tier_column_insertion() {
        let table = stats_page("");
        let mut result = scrape_league(&table, "La Liga").unwrap();
        result.insert_column(1, "Tier", "Tier 1");
        assert_eq!(
            &result.columns[..5],
            &["League", "Tier", "Player", "Nationality", "Team"]
        );
        assert_eq!(result.rows[0][1], "Tier 1");
    }
}
