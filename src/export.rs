//! Text and CSV renderings of a finished draw.
//!
//! Both formats list assignments by ascending number. The CSV is the
//! spreadsheet download (`Name,Number` header, every field quoted, UTF-8 with
//! a byte-order mark); the clipboard text is meant for pasting into chats and
//! documents.

use crate::draw::Assignment;
use anyhow::Context;
use clap::builder::PossibleValue;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// UTF-8 byte-order mark written ahead of the CSV header.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// File name offered for CSV downloads.
pub const CSV_FILE_NAME: &str = "draw.csv";

const CSV_HEADER: [&str; 2] = ["Name", "Number"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Line layout for copied results.
pub enum ClipboardFormat {
    /// `<number>.) <name>`
    #[default]
    Numbered,
    /// `<name>,<number>`
    Csv,
}

impl ValueEnum for ClipboardFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Numbered, Self::Csv]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let pv = match self {
            Self::Numbered => PossibleValue::new("numbered").help("One `3.) Name` line per result"),
            Self::Csv => PossibleValue::new("csv").help("One `Name,3` line per result"),
        };
        Some(pv)
    }
}

impl std::str::FromStr for ClipboardFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("numbered") => Ok(Self::Numbered),
            s if s.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            _ => Err(anyhow::anyhow!("invalid ClipboardFormat: {s}")),
        }
    }
}

fn by_number(assignments: &[Assignment]) -> Vec<&Assignment> {
    let mut sorted: Vec<&Assignment> = assignments.iter().collect();
    sorted.sort_by_key(|a| a.number);
    sorted
}

/// Render assignments as clipboard text, one line each, no trailing newline.
#[must_use]
pub fn clipboard_text(assignments: &[Assignment], format: ClipboardFormat) -> String {
    by_number(assignments)
        .into_iter()
        .map(|a| match format {
            ClipboardFormat::Numbered => format!("{}.) {}", a.number, a.name),
            ClipboardFormat::Csv => format!("{},{}", a.name, a.number),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encode assignments as the CSV download.
///
/// Rows are separated by `\n` and the last row has no terminator.
///
/// # Errors
/// Returns an error if the CSV writer fails.
pub fn encode_csv(assignments: &[Assignment]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER).context("write CSV header")?;
    for a in by_number(assignments) {
        writer
            .write_record([a.name.as_str(), a.number.to_string().as_str()])
            .with_context(|| format!("write CSV row for #{}", a.number))?;
    }
    let body = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("flush CSV writer: {}", err.error()))?;

    let mut out = Vec::with_capacity(UTF8_BOM.len() + body.len());
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(body.strip_suffix(b"\n").unwrap_or(&body));
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Number")]
    number: u32,
}

/// Decode a CSV download back into assignments, in file order.
///
/// The byte-order mark is optional.
///
/// # Errors
/// Returns an error if the header is not `Name,Number` or a row is malformed.
pub fn parse_csv(bytes: &[u8]) -> anyhow::Result<Vec<Assignment>> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);

    let headers = reader.headers().context("read CSV header")?;
    anyhow::ensure!(
        headers.iter().eq(CSV_HEADER),
        "unexpected CSV header: {headers:?}"
    );

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| -> anyhow::Result<Assignment> {
            let row = row.with_context(|| format!("parse CSV row {}", i + 1))?;
            Ok(Assignment {
                name: row.name,
                number: row.number,
            })
        })
        .collect()
}
