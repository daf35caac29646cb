// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table renderer for run and cleanup reports.
//!
//! Columns are aligned from the data; color is applied after padding.

use std::io::Write;

use crate::color;

/// Column text alignment.
pub enum Align {
    Left,
    Right,
}

/// How a cell's text is styled after padding.
pub enum CellStyle {
    Plain,
    /// Apply [`color::apply_muted()`].
    Muted,
    /// Apply [`color::apply_status()`] (outcome-aware).
    Status,
}

/// A column definition in a [`Table`].
pub struct Column {
    pub name: &'static str,
    pub align: Align,
    pub style: CellStyle,
}

impl Column {
    pub fn left(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Plain,
        }
    }

    pub fn right(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Right,
            style: CellStyle::Plain,
        }
    }

    pub fn muted(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Muted,
        }
    }

    pub fn status(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Status,
        }
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    colorize: bool,
}

/// Column separator: double space.
const SEP: &str = "  ";

impl Table {
    pub fn with_color(columns: Vec<Column>, colorize: bool) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            colorize,
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render header and rows. An empty table renders nothing.
    ///
    /// The last column is never padded when left-aligned.
    pub fn render(&self, out: &mut impl Write) {
        if self.rows.is_empty() {
            return;
        }
        let widths = self.compute_widths();

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let padded = self.pad_cell(i, col, col.name, widths[i]);
                if self.colorize {
                    color::apply_header(&padded)
                } else {
                    padded
                }
            })
            .collect();
        let _ = writeln!(out, "{}", header.join(SEP));

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let raw = row.get(i).map(String::as_str).unwrap_or("");
                    let padded = self.pad_cell(i, col, raw, widths[i]);
                    stylize(&padded, &col.style, self.colorize)
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join(SEP));
        }
    }

    fn pad_cell(&self, index: usize, col: &Column, text: &str, width: usize) -> String {
        let is_last = index + 1 == self.columns.len();
        if is_last && matches!(col.align, Align::Left) {
            text.to_string()
        } else {
            pad(text, width, &col.align)
        }
    }

    fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let max_data = self
                    .rows
                    .iter()
                    .map(|row| row.get(i).map(|s| s.chars().count()).unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                col.name.len().max(max_data)
            })
            .collect()
    }
}

fn pad(text: &str, width: usize, align: &Align) -> String {
    match align {
        Align::Left => format!("{:<width$}", text),
        Align::Right => format!("{:>width$}", text),
    }
}

fn stylize(text: &str, style: &CellStyle, colorize: bool) -> String {
    if !colorize {
        return text.to_string();
    }
    match style {
        CellStyle::Plain => text.to_string(),
        CellStyle::Muted => color::apply_muted(text),
        CellStyle::Status => color::apply_status(text),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
