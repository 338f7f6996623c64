//! Extracts the (state, population) columns from a release-table HTML page.

use crate::population::error::PopulationError;
use polars::prelude::*;
use scraper::{ElementRef, Html, Selector};

/// Flattened label of the state-name column in the release table. The name
/// bakes in the placeholder for the blank top-level header cell above it.
const NAME_COLUMN: &str = "Unnamed: 1_level_0 Name";

/// Reduces the first table on the page to three string columns: `state`,
/// `population` (taken from the `Thousands of Persons {year}` column), and a
/// `year` stamp on every row.
///
/// Multi-level headers are flattened per column by joining level labels with
/// one space and trimming. If either expected column is absent (the table
/// layout changed upstream), the year fails with
/// [`PopulationError::MissingColumn`]; there is no fallback.
pub(crate) fn population_frame(html: &str, year: i32) -> Result<DataFrame, PopulationError> {
    let table = parse_first_table(html).ok_or(PopulationError::NoTable { year })?;
    let headers = flatten_headers(&table.header_levels);

    let population_column = format!("Thousands of Persons {year}");
    let state_idx = headers
        .iter()
        .position(|label| label == NAME_COLUMN)
        .ok_or_else(|| PopulationError::MissingColumn {
            year,
            column: NAME_COLUMN.to_string(),
        })?;
    let population_idx = headers
        .iter()
        .position(|label| *label == population_column)
        .ok_or_else(|| PopulationError::MissingColumn {
            year,
            column: population_column.clone(),
        })?;

    let states: Vec<Option<String>> = table
        .data_rows
        .iter()
        .map(|row| row.get(state_idx).cloned())
        .collect();
    let populations: Vec<Option<String>> = table
        .data_rows
        .iter()
        .map(|row| row.get(population_idx).cloned())
        .collect();
    let years = vec![year.to_string(); table.data_rows.len()];

    DataFrame::new(vec![
        Column::new("state".into(), states),
        Column::new("population".into(), populations),
        Column::new("year".into(), years),
    ])
    .map_err(|source| PopulationError::Frame { year, source })
}

struct RawTable {
    /// One entry per header row; inner entries are cell texts in cell order.
    header_levels: Vec<Vec<String>>,
    data_rows: Vec<Vec<String>>,
}

/// Splits the first table's rows into leading all-`<th>` header rows and the
/// data rows after them. Cell text is whitespace-trimmed.
fn parse_first_table(html: &str) -> Option<RawTable> {
    let table_selector = Selector::parse("table").expect("selector should parse");
    let row_selector = Selector::parse("tr").expect("selector should parse");
    let td_selector = Selector::parse("td").expect("selector should parse");
    let cell_selector = Selector::parse("th, td").expect("selector should parse");

    let document = Html::parse_document(html);
    let table = document.select(&table_selector).next()?;

    let mut header_levels = Vec::new();
    let mut data_rows = Vec::new();
    let mut in_body = false;
    for row in table.select(&row_selector) {
        let has_td = row.select(&td_selector).next().is_some();
        if !in_body && !has_td {
            header_levels.push(cell_texts(row, &cell_selector));
        } else {
            in_body = true;
            data_rows.push(cell_texts(row, &cell_selector));
        }
    }
    Some(RawTable {
        header_levels,
        data_rows,
    })
}

fn cell_texts(row: ElementRef<'_>, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Joins each column's header levels with one space and trims the result.
///
/// A cell that is present but empty is labeled `Unnamed: {col}_level_{level}`;
/// a level with no cell for that column contributes nothing.
fn flatten_headers(levels: &[Vec<String>]) -> Vec<String> {
    let width = levels.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            let parts: Vec<String> = levels
                .iter()
                .enumerate()
                .filter_map(|(level, row)| {
                    row.get(col).map(|label| {
                        if label.is_empty() {
                            format!("Unnamed: {col}_level_{level}")
                        } else {
                            label.clone()
                        }
                    })
                })
                .collect();
            parts.join(" ").trim().to_string()
        })
        .collect()
}
