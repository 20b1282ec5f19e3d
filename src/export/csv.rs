// src/export/csv.rs
//! Minimal CSV writing: comma separated, double-quote escaping, LF line
//! endings, optional UTF-8 byte-order mark.
use std::io::{self, Write};

/// UTF-8 byte-order mark. Excel needs it to decode accented names.
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn write_bom<W: Write>(mut w: W) -> io::Result<()> {
    w.write_all(BOM)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}
