//! Column-matching strategies. Each one inspects a cleaned table and returns
//! the index of at most one best-matching source column. All are pure: they
//! never mutate the table, and the same inputs always pick the same column.
//!
//! Strategies that score row data enforce the minimum-support threshold: a
//! candidate whose match count covers less than half the rows is rejected,
//! so a single coincidental hit can never claim a column. The two
//! header-label strategies look at a fixed-size label set and carry no such
//! threshold.

use crate::table::{Cell, Table};

/// The closed set of matching strategies, resolved from configuration with
/// their keyword material baked in.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// `find_header`: first column whose label exactly equals a keyword.
    Header { keywords: Vec<String> },
    /// `find_most_matches_header`: most keywords appearing as substrings of
    /// the lowercased label.
    HeaderSubstrings { keywords: Vec<String> },
    /// `find_most_matches_column`: most cells containing a keyword as a
    /// substring.
    CellSubstrings { keywords: Vec<String> },
    /// `find_word_matches_column`: most cells with a whole token equal to a
    /// keyword; Cyrillic-content columns only.
    CellWords { keywords: Vec<String> },
    /// `find_filtered_word_matches_column`: like `CellWords`, but a cell only
    /// counts when it has no token from the exclude set.
    CellWordsFiltered {
        include: Vec<String>,
        exclude: Vec<String>,
    },
    /// `find_numeric_column_with_length_matches`: most all-digit cells whose
    /// length is one of the configured lengths.
    NumericLengths { lengths: Vec<usize> },
}

impl Matcher {
    pub fn locate(&self, table: &Table) -> Option<usize> {
        match self {
            Matcher::Header { keywords } => find_header(table, keywords),
            Matcher::HeaderSubstrings { keywords } => find_most_matches_header(table, keywords),
            Matcher::CellSubstrings { keywords } => find_most_matches_column(table, keywords),
            Matcher::CellWords { keywords } => find_word_matches_column(table, keywords),
            Matcher::CellWordsFiltered { include, exclude } => {
                find_filtered_word_matches_column(table, include, exclude)
            }
            Matcher::NumericLengths { lengths } => {
                find_numeric_column_with_length_matches(table, lengths)
            }
        }
    }
}

/// Reject candidates matching fewer than half the rows.
fn meets_support(matches: usize, n_rows: usize) -> bool {
    2 * matches >= n_rows
}

fn has_cyrillic(s: &str) -> bool {
    s.to_lowercase()
        .chars()
        .any(|c| ('а'..='я').contains(&c) || c == 'ё')
}

/// Columns without a single Cyrillic letter anywhere hold codes or amounts,
/// not words; word-based strategies skip them.
fn column_has_cyrillic(table: &Table, col: usize) -> bool {
    table.column(col).any(|cell| match cell {
        Cell::Text(s) => has_cyrillic(s),
        _ => false,
    })
}

/// Lowercased tokens of a cell, split on commas, periods and whitespace.
fn tokens(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score each column with `score`, keeping the first column with the
/// strictly highest positive score, then apply the support threshold.
fn best_scoring_column<F>(table: &Table, threshold: bool, score: F) -> Option<usize>
where
    F: Fn(usize) -> usize,
{
    let mut max_matches = 0;
    let mut best = None;
    for col in 0..table.n_cols() {
        let matches = score(col);
        if matches > max_matches {
            max_matches = matches;
            best = Some(col);
        }
    }
    if threshold && !meets_support(max_matches, table.n_rows()) {
        return None;
    }
    best
}

/// First column (in table order) whose label exactly equals any keyword.
pub fn find_header(table: &Table, keywords: &[String]) -> Option<usize> {
    (0..table.n_cols()).find(|&col| keywords.iter().any(|k| k == table.label(col)))
}

/// Column whose lowercased label contains the most keywords as substrings;
/// ties keep the first-seen best, zero matches means no column.
pub fn find_most_matches_header(table: &Table, keywords: &[String]) -> Option<usize> {
    best_scoring_column(table, false, |col| {
        let label = table.label(col).to_lowercase();
        keywords.iter().filter(|k| label.contains(k.as_str())).count()
    })
}

/// Column with the most non-missing cells containing at least one keyword as
/// a case-insensitive substring.
pub fn find_most_matches_column(table: &Table, keywords: &[String]) -> Option<usize> {
    best_scoring_column(table, true, |col| {
        table
            .column(col)
            .filter(|cell| !cell.is_missing())
            .filter(|cell| {
                let lowered = cell.to_string().to_lowercase();
                keywords.iter().any(|k| lowered.contains(k.as_str()))
            })
            .count()
    })
}

/// Column with the most cells containing a whole token equal to a keyword.
/// Only columns with Cyrillic content are considered.
pub fn find_word_matches_column(table: &Table, keywords: &[String]) -> Option<usize> {
    best_scoring_column(table, true, |col| {
        if !column_has_cyrillic(table, col) {
            return 0;
        }
        table
            .column(col)
            .filter(|cell| !cell.is_missing())
            .filter(|cell| {
                tokens(&cell.to_string())
                    .iter()
                    .any(|w| keywords.contains(w))
            })
            .count()
    })
}

/// Like [`find_word_matches_column`], but a cell only counts when it carries
/// at least one include token and not a single exclude token.
pub fn find_filtered_word_matches_column(
    table: &Table,
    include: &[String],
    exclude: &[String],
) -> Option<usize> {
    best_scoring_column(table, true, |col| {
        if !column_has_cyrillic(table, col) {
            return 0;
        }
        table
            .column(col)
            .filter(|cell| !cell.is_missing())
            .filter(|cell| {
                let words = tokens(&cell.to_string());
                words.iter().any(|w| include.contains(w))
                    && !words.iter().any(|w| exclude.contains(w))
            })
            .count()
    })
}

/// Column with the most cells that are all-digit strings of one of the
/// configured lengths. Catches ID-like codes (tax numbers, barcodes) that
/// carry no reliable header.
pub fn find_numeric_column_with_length_matches(
    table: &Table,
    lengths: &[usize],
) -> Option<usize> {
    best_scoring_column(table, true, |col| {
        table
            .column(col)
            .filter(|cell| !cell.is_missing())
            .filter(|cell| {
                let value = cell.to_string().trim().to_string();
                !value.is_empty()
                    && value.chars().all(|c| c.is_ascii_digit())
                    && lengths.contains(&value.chars().count())
            })
            .count()
    })
}
