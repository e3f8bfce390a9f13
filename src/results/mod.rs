// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Tekton Results query layer
//!
//! - `filter`: filter expression tree and its text form
//! - `selector`: Kubernetes-style selectors translated to filters
//! - `url`: list and log request paths
//! - `fetch`: the JSON fetch primitive (`JsonFetcher`, `HttpFetcher`)
//! - `cache`: session cache and in-flight de-duplication
//! - `client`: `ResultsClient`, which ties the above together

pub mod cache;
pub mod client;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod records;
pub mod selector;
pub mod url;

pub use cache::{FetchedPage, ResultsCache};
pub use client::ResultsClient;
pub use error::{Result, ResultsError};
pub use fetch::{HttpFetcher, JsonFetcher};
pub use filter::{CompareOp, Filter};
pub use records::{DataType, Record, RecordsList};
pub use selector::{MatchExpression, Operator, Selector};
pub use url::ListOptions;
