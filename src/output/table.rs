// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use comfy_table::{Cell, Table, presets::ASCII_BORDERS_ONLY_CONDENSED};

use super::RecordTable;

/// Widest record path shown before it is shortened
const MAX_RECORD_PATH_WIDTH: usize = 60;

/// Shorten a record path from the left, keeping its uid tail readable
fn shorten_path(path: &str, width: usize) -> String {
    let len = path.chars().count();
    if len <= width {
        return path.to_string();
    }
    let keep = width.saturating_sub(3);
    let tail: String = path.chars().skip(len - keep).collect();
    format!("...{}", tail)
}

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &RecordTable, no_headers: bool) -> String {
        if result.rows.is_empty() {
            return "No records found".to_string();
        }

        let path_col = result.columns.iter().position(|c| c == "record");

        let mut table = Table::new();
        table.load_preset(ASCII_BORDERS_ONLY_CONDENSED);
        if !no_headers {
            table.set_header(result.columns.iter().map(|c| c.to_uppercase()));
        }

        for values in &result.rows {
            let cells: Vec<Cell> = values
                .iter()
                .enumerate()
                .map(|(idx, value)| match path_col {
                    Some(col) if col == idx => Cell::new(shorten_path(value, MAX_RECORD_PATH_WIDTH)),
                    _ => Cell::new(value),
                })
                .collect();
            table.add_row(cells);
        }

        let noun = if result.rows.len() == 1 { "record" } else { "records" };
        format!("{}\n{} {}", table, result.rows.len(), noun)
    }
}
