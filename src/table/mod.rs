pub mod clean;

use std::fmt;

/// A single spreadsheet cell. `Missing` is the absent-value marker and is
/// distinct from `Text("")`: structural cleaning only ever treats `Missing`
/// as empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Non-missing and, for text, non-empty. Address consolidation requires
    /// every component to be filled before joining.
    pub fn is_filled(&self) -> bool {
        match self {
            Cell::Missing => false,
            Cell::Text(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// True for native numbers and for text that is digits, commas and
    /// periods only (e.g. `"1,5"` or `"100.200"`). The first row containing
    /// such a cell marks the start of the data body.
    pub fn is_numeric_like(&self) -> bool {
        match self {
            Cell::Int(_) | Cell::Float(_) => true,
            Cell::Text(s) => {
                let digits: String = s.chars().filter(|c| *c != ',' && *c != '.').collect();
                !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
            }
            Cell::Missing => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Row-major table of cells with string column labels. Straight out of the
/// extractor every label is just the decimal column index ("0", "1", ...);
/// header promotion swaps in the discovered header text.
///
/// Labels may repeat. Every lookup by label deterministically resolves to the
/// first occurrence, and the matching strategies work on column indices, so
/// duplicates never make a run ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    labels: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build from raw rows, padding ragged rows with `Missing` so the table
    /// is rectangular, with positional labels.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Table {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        let labels = (0..width).map(|i| i.to_string()).collect();
        Table { labels, rows }
    }

    /// Build from explicit labels and rectangular rows.
    pub fn with_labels(labels: Vec<String>, rows: Vec<Vec<Cell>>) -> Table {
        debug_assert!(rows.iter().all(|r| r.len() == labels.len()));
        Table { labels, rows }
    }

    /// A table with `n_rows` rows and no columns yet; the canonical table
    /// starts like this and grows one column per configured target field.
    pub fn empty(n_rows: usize) -> Table {
        Table {
            labels: Vec::new(),
            rows: vec![Vec::new(); n_rows],
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, col: usize) -> &str {
        &self.labels[col]
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row][col] = cell;
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[col])
    }

    pub fn column_cells(&self, col: usize) -> Vec<Cell> {
        self.column(col).cloned().collect()
    }

    /// Index of the first column carrying `label`, if any.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Append a column; `cells` must have exactly one value per row.
    pub fn push_column(&mut self, label: impl Into<String>, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        self.labels.push(label.into());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.labels, self.rows)
    }
}
