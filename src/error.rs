use thiserror::Error;

/// Errors raised while scraping a single competition. Each one is recovered
/// at the per-competition boundary: the league is marked failed and the run
/// moves on to the next one.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("no player stats table found for {league}")]
    NoTableFound { league: String },

    /// The generic table parse and the manual per-row extraction disagree on
    /// how many data rows the table has, even after truncation. Emitting a
    /// misaligned table would attach statistics to the wrong player, so the
    /// whole league is rejected.
    #[error(
        "row count mismatch for {league}: generic parse has {generic} rows, \
         manual extraction has {manual}"
    )]
    RowMismatch {
        league: String,
        generic: usize,
        manual: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
