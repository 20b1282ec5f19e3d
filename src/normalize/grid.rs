// src/normalize/grid.rs
//! Generic table-to-grid parsing: turns one `<table>` element into a flat
//! header + rows structure, honoring fbref's two-level column headers.
use scraper::{ElementRef, Selector};

/// A table parsed into uniform columns. Cell values are raw text node
/// concatenations; no trimming or re-encoding is applied to body cells.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Grid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Expand one header/body `<tr>` into cell texts, repeating each cell's
/// value across its `colspan`.
fn expand_row(row: ElementRef, cell_selector: &Selector) -> Vec<String> {
    let mut out = Vec::new();
    for cell in row.select(cell_selector) {
        let text = cell.text().collect::<String>();
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        for _ in 0..span {
            out.push(text.clone());
        }
    }
    out
}

/// Flatten stacked header rows into one column-name list. A two-level
/// header becomes `"{top} {bottom}"` trimmed; empty levels contribute
/// nothing, so a column with no over-header keeps its plain name.
fn flatten_header(levels: &[Vec<String>]) -> Vec<String> {
    let width = levels.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            let mut name = String::new();
            for level in levels {
                let part = level.get(col).map(String::as_str).unwrap_or("").trim();
                if part.is_empty() {
                    continue;
                }
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(part);
            }
            name
        })
        .collect()
}

/// Parse a single `<table>` element into a [`Grid`]. Header rows come from
/// `<thead>`; when a table has none, the first body row is promoted to
/// header. Body rows are padded or truncated to the header width.
pub fn parse_table(table: ElementRef) -> Grid {
    let head_selector = Selector::parse("thead > tr").expect("valid thead row selector");
    let body_selector = Selector::parse("tbody > tr").expect("valid tbody row selector");
    let cell_selector = Selector::parse("th, td").expect("valid cell selector");

    let header_levels: Vec<Vec<String>> = table
        .select(&head_selector)
        .map(|row| expand_row(row, &cell_selector))
        .collect();

    let mut rows: Vec<Vec<String>> = table
        .select(&body_selector)
        .map(|row| expand_row(row, &cell_selector))
        .collect();

    let columns = if header_levels.is_empty() {
        if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0).iter().map(|c| c.trim().to_string()).collect()
        }
    } else {
        flatten_header(&header_levels)
    };

    for row in &mut rows {
        row.resize(columns.len(), String::new());
    }

    Grid { columns, rows }
}
