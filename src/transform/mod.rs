//! The Transformer: cleans an extracted raw table and maps its unknown
//! columns onto the fixed canonical sales schema, driven by the column
//! configuration.

pub mod matchers;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::Config;
use crate::error::PipelineError;
use crate::table::{clean, Cell, Table};

pub const FIELD_CLIENT: &str = "Клиент";
pub const FIELD_CLIENT_INN: &str = "ИНН клиента";
pub const FIELD_BARCODE: &str = "Штрихкод продукта";
pub const FIELD_REGION: &str = "Область/Край";
pub const FIELD_CITY: &str = "Город";
pub const FIELD_STREET: &str = "Улица, номер дома";
pub const FIELD_FULL_ADDRESS: &str = "Адрес полностью";
pub const FIELD_DISTRIBUTOR: &str = "Дистрибьютор";
pub const FIELD_MONTH: &str = "Месяц";

/// "Фамилия И.О.": one capitalized Cyrillic surname, a space, two initials.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-ЯЁ][а-яё]+ [А-ЯЁ]\.[А-ЯЁ]\.$").expect("surname pattern"));

/// Minimum number of matching values for a source column to qualify as a
/// full-name column.
const NAME_COLUMN_MIN_MATCHES: usize = 10;

pub struct Transformer<'a> {
    config: &'a Config,
}

impl<'a> Transformer<'a> {
    pub fn new(config: &'a Config) -> Transformer<'a> {
        Transformer { config }
    }

    /// Clean the raw table (promote header, drop empty columns, drop empty
    /// rows — always in that order), then assemble the canonical table one
    /// configured target field at a time. The canonical table has exactly as
    /// many rows as the cleaned table: unmatched fields become all-missing
    /// columns, never dropped rows.
    pub fn transform(
        &self,
        raw: Table,
        distributor: &str,
        month: &str,
    ) -> Result<Table, PipelineError> {
        let table = clean::promote_header(raw)?;
        let table = clean::drop_empty_columns(table);
        let table = clean::drop_empty_rows(table);

        let n_rows = table.n_rows();
        let mut canonical = Table::empty(n_rows);
        for spec in self.config.rules() {
            match spec.matcher.locate(&table) {
                Some(col) => {
                    debug!(
                        target_field = %spec.target_field,
                        source = %table.label(col),
                        "matched column"
                    );
                    canonical.push_column(&spec.target_field, table.column_cells(col));
                }
                None => {
                    debug!(target_field = %spec.target_field, "no matching column");
                    canonical.push_column(&spec.target_field, vec![Cell::Missing; n_rows]);
                }
            }
        }

        canonical.push_column(
            FIELD_DISTRIBUTOR,
            vec![Cell::Text(distributor.to_string()); n_rows],
        );
        canonical.push_column(FIELD_MONTH, vec![Cell::Text(month.to_string()); n_rows]);

        consolidate_address(&mut canonical);
        fill_client_from_name_column(&mut canonical, &table);
        stringify_id_fields(&mut canonical);

        Ok(canonical)
    }
}

/// Per row: when the full-address value merely duplicates one of its three
/// component fields and all three are filled, rebuild it as the comma-joined
/// concatenation of the components.
fn consolidate_address(table: &mut Table) {
    let (Some(full), Some(region), Some(city), Some(street)) = (
        table.column_index(FIELD_FULL_ADDRESS),
        table.column_index(FIELD_REGION),
        table.column_index(FIELD_CITY),
        table.column_index(FIELD_STREET),
    ) else {
        return;
    };

    for row in 0..table.n_rows() {
        let joined = {
            let components = [
                table.cell(row, region),
                table.cell(row, city),
                table.cell(row, street),
            ];
            if !components.iter().all(|c| c.is_filled()) {
                continue;
            }
            if !components.contains(&table.cell(row, full)) {
                continue;
            }
            components
                .iter()
                .map(|c| c.to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.set_cell(row, full, Cell::Text(joined));
    }
}

/// When no strategy matched a client column, fall back to the first source
/// column that is dominated by "Фамилия И.О." values.
fn fill_client_from_name_column(canonical: &mut Table, source: &Table) {
    let Some(client) = canonical.column_index(FIELD_CLIENT) else {
        return;
    };
    if canonical.column(client).any(|c| !c.is_missing()) {
        return;
    }

    let name_col = (0..source.n_cols()).find(|&col| {
        source
            .column(col)
            .filter(|cell| !cell.is_missing())
            .filter(|cell| NAME_PATTERN.is_match(&cell.to_string()))
            .count()
            > NAME_COLUMN_MIN_MATCHES
    });

    if let Some(col) = name_col {
        debug!(source = %source.label(col), "client filled from full-name column");
        for row in 0..source.n_rows() {
            canonical.set_cell(row, client, source.cell(row, col).clone());
        }
    }
}

/// Large numeric IDs must survive as plain decimal text, with no scientific
/// notation and no trailing `.0`. Applied only when the tax-ID field was
/// actually matched.
fn stringify_id_fields(table: &mut Table) {
    let Some(inn) = table.column_index(FIELD_CLIENT_INN) else {
        return;
    };
    if table.column(inn).all(Cell::is_missing) {
        return;
    }

    let mut columns = vec![inn];
    if let Some(barcode) = table.column_index(FIELD_BARCODE) {
        columns.push(barcode);
    }
    for col in columns {
        for row in 0..table.n_rows() {
            let rendered = match table.cell(row, col) {
                Cell::Missing | Cell::Text(_) => None,
                cell => Some(cell.to_string()),
            };
            if let Some(rendered) = rendered {
                table.set_cell(row, col, Cell::Text(rendered));
            }
        }
    }
}
