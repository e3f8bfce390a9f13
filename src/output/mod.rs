// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod csv;
mod json;
mod table;
mod yaml;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tekton_results::results::FetchedPage;

use crate::cli::OutputFormat;

const COLUMNS: &[&str] = &["name", "status", "created", "updated", "uid", "record"];

/// Rows rendered from a page of records
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn format_time(time: Option<&DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or("")
}

impl RecordTable {
    pub fn from_page(page: &FetchedPage) -> Self {
        let rows = page
            .list
            .records
            .iter()
            .zip(&page.items)
            .map(|(record, item)| {
                vec![
                    str_at(item, "/metadata/name").to_string(),
                    str_at(item, "/status/conditions/0/reason").to_string(),
                    format_time(record.create_time.as_ref()),
                    format_time(record.update_time.as_ref()),
                    record.uid.clone(),
                    record.name.clone(),
                ]
            })
            .collect();

        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn format(&self, format: &OutputFormat, no_headers: bool) -> String {
        match format {
            OutputFormat::Table => TableFormatter::format(self, no_headers),
            OutputFormat::Json => JsonFormatter::format(self),
            OutputFormat::Csv => CsvFormatter::format(self, no_headers),
            OutputFormat::Yaml => YamlFormatter::format(self),
        }
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_json_rows(&self) -> Vec<serde_json::Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}
