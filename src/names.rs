//! Turning free-form input text into name entries.
//!
//! Names are separated by commas, semicolons or line breaks. Every piece is
//! trimmed and empty pieces are dropped; duplicates are kept as-is.

/// Whether `ch` separates two names.
#[must_use]
pub const fn is_delimiter(ch: char) -> bool {
    matches!(ch, ',' | ';' | '\n' | '\r')
}

/// Split `raw` into trimmed, non-empty names, preserving input order.
#[must_use]
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(is_delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Result of committing the finished part of a partially typed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Committed {
    /// Names completed by a delimiter.
    pub names: Vec<String>,
    /// Text after the last delimiter, still being typed.
    pub remainder: String,
}

/// Commit every name that is already terminated by a delimiter.
///
/// Input without any delimiter commits nothing and is returned untouched as
/// the remainder. Input ending in a delimiter (trailing whitespace allowed)
/// commits everything. Otherwise the text after the last delimiter is kept,
/// with leading whitespace removed, as the remainder.
#[must_use]
pub fn split_committed(raw: &str) -> Committed {
    let Some((head, tail)) = raw.rsplit_once(is_delimiter) else {
        return Committed {
            names: Vec::new(),
            remainder: raw.to_string(),
        };
    };

    if tail.trim().is_empty() {
        return Committed {
            names: parse_names(head),
            remainder: String::new(),
        };
    }

    Committed {
        names: parse_names(head),
        remainder: tail.trim_start().to_string(),
    }
}

/// Human count label: `1 name`, `0 names`, `3 names`.
#[must_use]
pub fn count_label(n: usize) -> String {
    if n == 1 {
        "1 name".to_string()
    } else {
        format!("{n} names")
    }
}
