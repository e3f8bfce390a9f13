// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory cache of completed record fetches
//!
//! Entries are keyed by a caller-chosen string. Only cache results that can
//! never change for the life of the process, such as the records of a single
//! finished PipelineRun; list results grow over time and must not be cached.
//! Nothing is ever evicted: `clear()` is the only invalidation.
//!
//! The in-flight set is best-effort de-duplication. Checking and marking a
//! key are separate steps, so two callers racing on the same key may both
//! issue a request.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::records::RecordsList;

/// A fetched page: decoded payloads plus the raw list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    /// Decoded `data.value` of every record, in list order
    pub items: Vec<serde_json::Value>,
    pub list: RecordsList,
    /// Set on the placeholder returned while the same key is still being
    /// fetched; retry later rather than treating it as "no results"
    pub loading: bool,
}

impl FetchedPage {
    /// Empty page with no continuation token
    pub fn empty() -> Self {
        Self::default()
    }

    /// Placeholder for a key whose fetch is still outstanding
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.list.next_page()
    }
}

/// Session-scoped cache of completed fetches and in-flight keys
///
/// Create one per session and share it (`Arc<ResultsCache>`) between clients.
#[derive(Debug, Default)]
pub struct ResultsCache {
    entries: Mutex<HashMap<String, FetchedPage>>,
    in_flight: Mutex<HashSet<String>>,
}

impl ResultsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<FetchedPage> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: &str, page: FetchedPage) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), page);
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        let in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.contains(key)
    }

    pub fn mark_in_flight(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.insert(key.to_string());
    }

    pub fn clear_in_flight(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(key);
    }

    /// Drop every cached entry; in-flight markers are left alone
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clears an in-flight marker when dropped
///
/// Held across the network call so the marker goes away on success, on
/// error and when the fetching future is dropped before completion.
pub(crate) struct InFlightGuard<'a> {
    cache: &'a ResultsCache,
    key: &'a str,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn new(cache: &'a ResultsCache, key: &'a str) -> Self {
        cache.mark_in_flight(key);
        Self { cache, key }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.cache.clear_in_flight(self.key);
    }
}
