// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use super::RecordTable;

pub struct CsvFormatter;

impl CsvFormatter {
    pub fn format(result: &RecordTable, no_headers: bool) -> String {
        let mut writer = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let header = (!no_headers).then_some(&result.columns);
        for record in header.into_iter().chain(&result.rows) {
            if let Err(e) = writer.write_record(record) {
                return format!("CSV error: {}", e);
            }
        }

        match writer.into_inner() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).trim_end_matches('\n').to_string(),
            Err(e) => format!("CSV error: {}", e.error()),
        }
    }
}
