// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cache::{FetchedPage, InFlightGuard, ResultsCache};
use super::error::{Result, ResultsError};
use super::fetch::JsonFetcher;
use super::filter::Filter;
use super::records::{DataType, LogResponse, RecordsList, decode_log, decode_value_json};
use super::url::{ListOptions, log_url, records_url};

/// Upper bound on pages followed by `get_all_records`
const MAX_PAGES: usize = 1000;

/// Client for one workspace of the Results service
///
/// The cache is passed in so that it can outlive a single client and be
/// shared by everything in the session.
pub struct ResultsClient<F: JsonFetcher> {
    fetcher: F,
    cache: Arc<ResultsCache>,
    workspace: String,
}

impl<F: JsonFetcher> ResultsClient<F> {
    pub fn new(fetcher: F, cache: Arc<ResultsCache>, workspace: impl Into<String>) -> Self {
        Self {
            fetcher,
            cache,
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn cache(&self) -> &Arc<ResultsCache> {
        &self.cache
    }

    /// Fetch one page of records of `data_type`
    ///
    /// With a `cache_key`, a completed result for that key is returned without
    /// a request, and a key that is still being fetched yields
    /// `FetchedPage::loading()`. A 404 from the service is an empty page.
    /// When `options.limit` is set the page is truncated to it and carries no
    /// continuation token.
    pub async fn get_filtered_records(
        &self,
        namespace: &str,
        data_type: DataType,
        filter: Option<&str>,
        options: &ListOptions,
        page_token: Option<&str>,
        cache_key: Option<&str>,
    ) -> Result<FetchedPage> {
        let url = records_url(
            &self.workspace,
            namespace,
            data_type,
            filter,
            options,
            page_token,
        )?;

        let Some(key) = cache_key else {
            return self.fetch_page(&url, namespace, data_type, options).await;
        };

        if let Some(page) = self.cache.get(key) {
            debug!(cache_key = %key, "Results cache hit");
            return Ok(page);
        }
        if self.cache.is_in_flight(key) {
            debug!(cache_key = %key, "Results request already in flight");
            return Ok(FetchedPage::loading());
        }

        let result = {
            let _in_flight = InFlightGuard::new(&self.cache, key);
            self.fetch_page(&url, namespace, data_type, options).await
        };

        if let Ok(page) = &result {
            self.cache.insert(key, page.clone());
        }
        result
    }

    async fn fetch_page(
        &self,
        url: &str,
        namespace: &str,
        data_type: DataType,
        options: &ListOptions,
    ) -> Result<FetchedPage> {
        let start = Instant::now();
        let mut list: RecordsList = match self.fetcher.fetch_json(url).await {
            Ok(value) => serde_json::from_value(value)?,
            Err(e) if e.is_not_found() => {
                debug!(namespace = %namespace, data_type = %data_type, "No records (404)");
                return Ok(FetchedPage::empty());
            }
            Err(e) => return Err(e),
        };

        if let Some(limit) = options.limit {
            list.truncate(limit);
        }

        let items = list
            .records
            .iter()
            .map(|record| decode_value_json(&record.data.value))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            namespace = %namespace,
            data_type = %data_type,
            records = items.len(),
            more = list.next_page().is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched records page"
        );

        Ok(FetchedPage {
            items,
            list,
            loading: false,
        })
    }

    /// PipelineRuns matching `options`
    ///
    /// Pass a `cache_key` only for a query whose answer can never change,
    /// e.g. a finished PipelineRun looked up by name.
    pub async fn get_pipeline_runs(
        &self,
        namespace: &str,
        options: &ListOptions,
        page_token: Option<&str>,
        cache_key: Option<&str>,
    ) -> Result<FetchedPage> {
        self.get_filtered_records(
            namespace,
            DataType::PipelineRun,
            None,
            options,
            page_token,
            cache_key,
        )
        .await
    }

    /// TaskRuns matching `options`; same caching rules as `get_pipeline_runs`
    pub async fn get_task_runs(
        &self,
        namespace: &str,
        options: &ListOptions,
        page_token: Option<&str>,
        cache_key: Option<&str>,
    ) -> Result<FetchedPage> {
        self.get_filtered_records(
            namespace,
            DataType::TaskRun,
            None,
            options,
            page_token,
            cache_key,
        )
        .await
    }

    /// Follow continuation tokens and collect every page into one
    ///
    /// Not cached. A `limit` in `options` stops after the first page, and so
    /// does a server answering with the token it was just given.
    pub async fn get_all_records(
        &self,
        namespace: &str,
        data_type: DataType,
        options: &ListOptions,
    ) -> Result<FetchedPage> {
        let mut combined = FetchedPage::empty();
        let mut page_token: Option<String> = None;

        for page_count in 1..=MAX_PAGES {
            let page = self
                .get_filtered_records(
                    namespace,
                    data_type,
                    None,
                    options,
                    page_token.as_deref(),
                    None,
                )
                .await?;

            combined.items.extend(page.items);
            combined.list.records.extend(page.list.records);

            match page.list.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    warn!(
                        namespace = %namespace,
                        page = page_count,
                        "Server repeated the continuation token, stopping"
                    );
                    return Ok(combined);
                }
                Some(token) => {
                    debug!(
                        namespace = %namespace,
                        page = page_count,
                        total_so_far = combined.items.len(),
                        "Fetched page, continuing"
                    );
                    page_token = Some(token);
                }
                None => return Ok(combined),
            }
        }

        info!(
            namespace = %namespace,
            pages = MAX_PAGES,
            "Stopped following continuation tokens"
        );
        combined.list.next_page_token = page_token;
        Ok(combined)
    }

    /// Log text of a TaskRun
    ///
    /// Looks up the Log record for the TaskRun, then fetches its content.
    /// Fails with `ResultsError::NotFound` when no Log record exists.
    pub async fn get_task_run_log(&self, namespace: &str, task_run_name: &str) -> Result<String> {
        let filter = Filter::and([
            Filter::eq("data.spec.resource.kind", "TaskRun"),
            Filter::eq("data.spec.resource.name", task_run_name),
        ])
        .to_string();

        let page = self
            .get_filtered_records(
                namespace,
                DataType::Log,
                Some(&filter),
                &ListOptions::with_limit(1),
                None,
                None,
            )
            .await?;

        let Some(record) = page.list.records.first() else {
            return Err(ResultsError::NotFound(format!(
                "log for task run '{}' in namespace '{}'",
                task_run_name, namespace
            )));
        };

        debug!(task_run = %task_run_name, record = %record.name, "Fetching task run log");
        let value = self
            .fetcher
            .fetch_json(&log_url(&self.workspace, &record.name))
            .await?;
        let log: LogResponse = serde_json::from_value(value)?;
        decode_log(&log.result.data)
    }
}
