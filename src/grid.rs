//! Table grid extraction: turns an HTML fragment into a rectangular grid of
//! cell strings with optional row and column labels.
//!
//! Styling and cell spans are ignored; every `td` becomes one cell.

use crate::error::RenderFailure;
use scraper::{ElementRef, Html};
use serde::Serialize;

/// A normalized table: every row of `cells` has the same length and there is
/// at least one row and one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableGrid {
    column_labels: Vec<String>,
    row_labels: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl TableGrid {
    /// Extract the first `<table>` of `html` into a grid.
    pub fn from_html(html: &str) -> Result<Self, RenderFailure> {
        let fragment = Html::parse_fragment(html);
        let table = descendants_named(fragment.root_element(), "table")
            .next()
            .ok_or(RenderFailure::NoTableFound)?;

        let mut column_labels = Vec::new();
        let mut excluded = None;

        if let Some(thead) = descendants_named(table, "thead").next() {
            column_labels = descendants_named(thead, "th").map(element_text).collect();
            excluded = Some(thead);
        } else if let Some(first_row) = descendants_named(table, "tr").next() {
            let headers: Vec<String> = descendants_named(first_row, "th").map(element_text).collect();
            if headers.len() > 1 {
                column_labels = headers;
                excluded = Some(first_row);
            }
        }

        let mut row_labels = Vec::new();
        let mut cells = Vec::new();
        for row in descendants_named(table, "tr") {
            if excluded.is_some_and(|ex| is_within(row, ex)) {
                continue;
            }
            if let Some(th) = descendants_named(row, "th").next() {
                row_labels.push(element_text(th));
            }
            cells.push(descendants_named(row, "td").map(element_text).collect());
        }

        Self::from_parts(column_labels, row_labels, cells)
    }

    /// Normalize raw labels and rows into a rectangular grid.
    ///
    /// Header-only and label-only tables are recovered by promoting the labels
    /// to data cells.
    pub fn from_parts(
        mut column_labels: Vec<String>,
        mut row_labels: Vec<String>,
        mut cells: Vec<Vec<String>>,
    ) -> Result<Self, RenderFailure> {
        if cells.is_empty() {
            if !column_labels.is_empty() {
                cells.push(std::mem::take(&mut column_labels));
                row_labels.clear();
            } else if !row_labels.is_empty() {
                cells = std::mem::take(&mut row_labels).into_iter().map(|l| vec![l]).collect();
                column_labels.clear();
            } else {
                return Err(RenderFailure::EmptyTable);
            }
        }

        let longest_row = cells.iter().map(Vec::len).max().unwrap_or(0);
        let max_columns = longest_row.max(column_labels.len());
        let max_rows = cells.len().max(row_labels.len());
        if max_columns == 0 || max_rows == 0 {
            return Err(RenderFailure::DegenerateDimensions {
                rows: max_rows,
                columns: max_columns,
            });
        }

        if !column_labels.is_empty() {
            column_labels.resize(max_columns, String::new());
        }
        if !row_labels.is_empty() {
            row_labels.resize(max_rows, String::new());
        }
        for row in &mut cells {
            row.resize(max_columns, String::new());
        }
        cells.resize(max_rows, vec![String::new(); max_columns]);

        Ok(Self {
            column_labels,
            row_labels,
            cells,
        })
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn max_columns(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn max_rows(&self) -> usize {
        self.cells.len()
    }

    /// Apply `f` to every label and cell, keeping the grid shape.
    pub fn map_text<F>(&self, mut f: F) -> TableGrid
    where
        F: FnMut(&str) -> String,
    {
        TableGrid {
            column_labels: self.column_labels.iter().map(|s| f(s)).collect(),
            row_labels: self.row_labels.iter().map(|s| f(s)).collect(),
            cells: self
                .cells
                .iter()
                .map(|row| row.iter().map(|s| f(s)).collect())
                .collect(),
        }
    }
}

/// Element descendants of `el` (excluding `el` itself) with the given tag name, in document order.
fn descendants_named<'a>(el: ElementRef<'a>, name: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == name)
}

fn is_within(el: ElementRef<'_>, container: ElementRef<'_>) -> bool {
    el.id() == container.id() || el.ancestors().any(|a| a.id() == container.id())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
