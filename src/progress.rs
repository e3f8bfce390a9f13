// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Spinner shown while requests to the Results service are outstanding

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner with consistent styling
///
/// Hidden when `visible` is false so that machine-readable output on stdout
/// and the terminal stay clean.
pub fn create_spinner(msg: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg} {elapsed:.dim}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner message for a list request
pub fn fetch_message(what: &str, namespace: &str, all_pages: bool) -> String {
    if all_pages {
        format!("Fetching all {} in {}...", what, namespace)
    } else {
        format!("Fetching {} in {}...", what, namespace)
    }
}
