//! Quote-tolerant CSV parsing for marketplace exports.
//!
//! Each data line is parsed in two passes: quoted segments are first masked
//! with positional placeholders, the masked line is split on commas, and the
//! placeholders are then restored. A comma inside quotes therefore never
//! splits a field. Escaped quotes (`""`) are not recognized.

use crate::price::{format_yen_display, parse_price_number};
use sales_core::{Column, FieldValue, Header, RawRecord, Result, YEN_MARKER};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const DELIMITER: char = ',';
const QUOTE: char = '"';
const BOM: char = '\u{feff}';

// Private-use code points; exports never contain them.
const PLACEHOLDER_OPEN: char = '\u{e000}';
const PLACEHOLDER_CLOSE: char = '\u{e001}';

/// Statistics about structural irregularities seen while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Data records produced.
    pub records: u64,
    /// Rows with fewer cells than the header (padded with empty strings).
    pub short_rows: u64,
    /// Rows with more cells than the header (excess cells dropped).
    pub long_rows: u64,
    /// Lines containing a `"` without a closing partner.
    pub unterminated_quotes: u64,
    /// Header cells repeating an earlier name.
    pub duplicate_columns: u64,
}

impl ParseStats {
    /// Rows whose cell count did not match the header.
    pub fn irregular_rows(&self) -> u64 {
        self.short_rows + self.long_rows
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Header plus data records of one parsed file.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub header: Arc<Header>,
    pub records: Vec<RawRecord>,
}

/// CSV parser that never rejects structurally irregular input.
#[derive(Debug, Default)]
pub struct CsvParser {
    stats: ParseStats,
}

impl CsvParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text into records keyed by the first non-empty line.
    pub fn parse(&mut self, text: &str) -> Vec<RawRecord> {
        self.parse_table(text).records
    }

    /// Parse raw bytes; fails only when they are not valid UTF-8.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<Vec<RawRecord>> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.parse(text))
    }

    /// Parse text, keeping the header even when there are no data rows.
    pub fn parse_table(&mut self, text: &str) -> ParsedTable {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let mut lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty());

        let Some(header_line) = lines.next() else {
            debug!("CSV input has no lines");
            return ParsedTable {
                header: Arc::new(Header::default()),
                records: Vec::new(),
            };
        };

        let layout = self.read_header(header_line);
        let header = Arc::new(Header::new(layout.names.iter().cloned()));

        let mut records = Vec::new();
        for line in lines {
            records.push(self.read_row(line, &layout, &header));
        }

        debug!(
            columns = header.len(),
            records = self.stats.records,
            short_rows = self.stats.short_rows,
            long_rows = self.stats.long_rows,
            unterminated_quotes = self.stats.unterminated_quotes,
            "Parsed CSV"
        );

        ParsedTable { header, records }
    }

    /// Get parse statistics.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    fn read_header(&mut self, line: &str) -> HeaderLayout {
        let cells = self.split_line(line);

        let mut names: Vec<String> = Vec::with_capacity(cells.len());
        let mut slots = Vec::with_capacity(cells.len());
        let mut columns = Vec::with_capacity(cells.len());

        for cell in cells {
            columns.push(Column::from_header(&cell));
            match names.iter().position(|n| *n == cell) {
                Some(slot) => {
                    self.stats.duplicate_columns += 1;
                    slots.push(slot);
                }
                None => {
                    slots.push(names.len());
                    names.push(cell);
                }
            }
        }

        HeaderLayout {
            names,
            slots,
            columns,
        }
    }

    fn read_row(&mut self, line: &str, layout: &HeaderLayout, header: &Arc<Header>) -> RawRecord {
        let mut cells = self.split_line(line);
        let width = layout.slots.len();

        if cells.len() < width {
            self.stats.short_rows += 1;
            cells.resize(width, String::new());
        } else if cells.len() > width {
            self.stats.long_rows += 1;
            cells.truncate(width);
        }

        let mut values = vec![FieldValue::default(); header.len()];
        // Later duplicates overwrite earlier ones.
        for ((cell, &slot), column) in cells.into_iter().zip(&layout.slots).zip(&layout.columns) {
            values[slot] = convert_cell(*column, cell);
        }

        self.stats.records += 1;
        RawRecord::new(header.clone(), values)
    }

    fn split_line(&mut self, line: &str) -> Vec<String> {
        let masked = mask_quoted(line);
        if masked.unterminated {
            self.stats.unterminated_quotes += 1;
        }

        masked
            .text
            .split(DELIMITER)
            .map(|field| restore_quoted(field.trim(), &masked.segments))
            .collect()
    }
}

/// Parse text with a fresh parser.
pub fn parse_csv(text: &str) -> Vec<RawRecord> {
    CsvParser::new().parse(text)
}

/// Header cells with their target slot and recognized column.
struct HeaderLayout {
    names: Vec<String>,
    slots: Vec<usize>,
    columns: Vec<Option<Column>>,
}

struct MaskedLine<'a> {
    text: String,
    segments: Vec<&'a str>,
    unterminated: bool,
}

/// Replace every `"..."` pair with a placeholder carrying its index.
fn mask_quoted(line: &str) -> MaskedLine<'_> {
    let mut text = String::with_capacity(line.len());
    let mut segments = Vec::new();
    let mut unterminated = false;
    let mut rest = line;

    while let Some(open) = rest.find(QUOTE) {
        let after = &rest[open + QUOTE.len_utf8()..];
        let Some(close) = after.find(QUOTE) else {
            unterminated = true;
            break;
        };

        text.push_str(&rest[..open]);
        text.push(PLACEHOLDER_OPEN);
        text.push_str(&segments.len().to_string());
        text.push(PLACEHOLDER_CLOSE);
        segments.push(&after[..close]);
        rest = &after[close + QUOTE.len_utf8()..];
    }
    text.push_str(rest);

    MaskedLine {
        text,
        segments,
        unterminated,
    }
}

/// Substitute placeholders in `field` with their original quoted content.
fn restore_quoted(field: &str, segments: &[&str]) -> String {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;

    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        out.push_str(&rest[..start]);
        let tail = &rest[start + PLACEHOLDER_OPEN.len_utf8()..];

        let token = tail.find(PLACEHOLDER_CLOSE).and_then(|end| {
            let index = tail[..end].parse::<usize>().ok()?;
            segments.get(index).map(|segment| (end, *segment))
        });

        match token {
            Some((end, segment)) => {
                out.push_str(segment);
                rest = &tail[end + PLACEHOLDER_CLOSE.len_utf8()..];
            }
            None => {
                out.push(PLACEHOLDER_OPEN);
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Apply per-column coercion.
///
/// The canonical USD column becomes a number right away. Yen-marked values
/// in the other price columns are only reformatted for display; converting
/// them is left to the price normalizer.
fn convert_cell(column: Option<Column>, cell: String) -> FieldValue {
    match column {
        Some(Column::PriceUsd) => FieldValue::Number(parse_price_number(&cell)),
        Some(column) if column.is_price_bearing() && cell.contains(YEN_MARKER) => {
            FieldValue::Text(format_yen_display(parse_price_number(&cell)))
        }
        _ => FieldValue::Text(cell),
    }
}
