// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Request paths for the Results service behind the console plugin proxy

use url::form_urlencoded;

use super::error::Result;
use super::filter::Filter;
use super::records::DataType;
use super::selector::Selector;

const WORKSPACE_PLACEHOLDER: &str = "<_workspace_>";

/// Path prefix of the v1alpha2 `parents` collection, per workspace
const URL_PREFIX: &str = "/plugins/tekton-results/workspaces/<_workspace_>/apis/results.tekton.dev/v1alpha2/parents";

pub const MINIMUM_PAGE_SIZE: i64 = 5;
pub const MAXIMUM_PAGE_SIZE: i64 = 10_000;
pub const DEFAULT_PAGE_SIZE: i64 = 30;

/// Server-side ordering; list results are always newest first
const ORDER_BY: &str = "create_time desc";

/// Paging and filtering options for a list request
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Requested page size, clamped into [5, 10000]
    pub page_size: Option<i64>,
    pub selector: Option<Selector>,
    /// Return at most this many records and never paginate further.
    /// Takes precedence over `page_size`.
    pub limit: Option<usize>,
    /// Extra raw filter expression, ANDed with everything else
    pub filter: Option<String>,
}

impl ListOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Effective `page_size` query value
    pub fn effective_page_size(&self) -> i64 {
        let requested = match self.limit {
            Some(limit) => i64::try_from(limit).unwrap_or(i64::MAX),
            None => self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        requested.clamp(MINIMUM_PAGE_SIZE, MAXIMUM_PAGE_SIZE)
    }
}

/// Path prefix for a workspace
pub fn url_prefix(workspace: &str) -> String {
    URL_PREFIX.replace(WORKSPACE_PLACEHOLDER, workspace)
}

/// Combined list filter: data type, explicit filter, selector, extra filter
pub fn records_filter(
    data_type: DataType,
    filter: Option<&str>,
    options: &ListOptions,
) -> Result<Filter> {
    let selector = match &options.selector {
        Some(selector) => selector.to_filter()?,
        None => Filter::empty(),
    };
    Ok(Filter::and([
        Filter::eq("data_type", data_type.as_str()),
        Filter::from(filter),
        selector,
        Filter::from(options.filter.as_deref()),
    ]))
}

/// Path and query of a list-records request
///
/// Fails only when the selector contains an operator that has no filter
/// translation.
pub fn records_url(
    workspace: &str,
    namespace: &str,
    data_type: DataType,
    filter: Option<&str>,
    options: &ListOptions,
    page_token: Option<&str>,
) -> Result<String> {
    let filter = records_filter(data_type, filter, options)?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("order_by", ORDER_BY);
    query.append_pair("page_size", &options.effective_page_size().to_string());
    if let Some(token) = page_token.filter(|t| !t.is_empty()) {
        query.append_pair("page_token", token);
    }
    query.append_pair("filter", &filter.to_string());

    Ok(format!(
        "{}/{}/results/-/records?{}",
        url_prefix(workspace),
        namespace,
        query.finish()
    ))
}

/// Path of the log content for a Log record
pub fn log_url(workspace: &str, record_name: &str) -> String {
    format!(
        "{}/{}",
        url_prefix(workspace),
        record_name.replace("/records/", "/logs/")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::selector::{MatchExpression, Operator};

    /// Decoded query parameters of a built URL
    fn params(url: &str) -> Vec<(String, String)> {
        let (_, query) = url.split_once('?').unwrap();
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn param(url: &str, key: &str) -> Option<String> {
        params(url)
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[test]
    fn test_url_prefix() {
        assert_eq!(
            url_prefix("ws1"),
            "/plugins/tekton-results/workspaces/ws1/apis/results.tekton.dev/v1alpha2/parents"
        );
    }

    #[test]
    fn test_default_request() {
        let url = records_url(
            "ws1",
            "team-a",
            DataType::PipelineRun,
            None,
            &ListOptions::default(),
            None,
        )
        .unwrap();
        assert_eq!(
            url,
            concat!(
                "/plugins/tekton-results/workspaces/ws1/apis/results.tekton.dev/v1alpha2/parents",
                "/team-a/results/-/records",
                "?order_by=create_time+desc&page_size=30",
                "&filter=data_type+%3D%3D+%22tekton.dev%2Fv1beta1.PipelineRun%22"
            )
        );
    }

    #[test]
    fn test_page_size_clamped() {
        let opts = |page_size| ListOptions {
            page_size: Some(page_size),
            ..Default::default()
        };
        assert_eq!(opts(0).effective_page_size(), 5);
        assert_eq!(opts(-3).effective_page_size(), 5);
        assert_eq!(opts(999_999).effective_page_size(), 10_000);
        assert_eq!(opts(50).effective_page_size(), 50);

        let url = records_url("w", "ns", DataType::TaskRun, None, &opts(0), None).unwrap();
        assert_eq!(param(&url, "page_size").as_deref(), Some("5"));
        let url = records_url("w", "ns", DataType::TaskRun, None, &opts(999_999), None).unwrap();
        assert_eq!(param(&url, "page_size").as_deref(), Some("10000"));
    }

    #[test]
    fn test_limit_takes_precedence_over_page_size() {
        let opts = ListOptions {
            page_size: Some(100),
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(opts.effective_page_size(), 5);

        let opts = ListOptions {
            page_size: Some(10),
            limit: Some(200),
            ..Default::default()
        };
        assert_eq!(opts.effective_page_size(), 200);
        assert_eq!(ListOptions::with_limit(0).effective_page_size(), 5);
        assert_eq!(ListOptions::with_limit(usize::MAX).effective_page_size(), 10_000);
    }

    #[test]
    fn test_page_token_only_when_given() {
        let opts = ListOptions::default();
        let url = records_url("w", "ns", DataType::TaskRun, None, &opts, None).unwrap();
        assert_eq!(param(&url, "page_token"), None);
        let url = records_url("w", "ns", DataType::TaskRun, None, &opts, Some("abc=")).unwrap();
        assert_eq!(param(&url, "page_token").as_deref(), Some("abc="));
    }

    #[test]
    fn test_filter_combines_every_operand() {
        let opts = ListOptions {
            selector: Some(
                Selector::default()
                    .with_match_label("app", "web")
                    .with_expression(MatchExpression::new(
                        "env",
                        Operator::In,
                        vec!["prod".to_string()],
                    )),
            ),
            filter: Some("data.status.conditions[0].status == \"True\"".to_string()),
            ..Default::default()
        };
        let url = records_url(
            "w",
            "ns",
            DataType::PipelineRun,
            Some("data.metadata.name == \"x\""),
            &opts,
            None,
        )
        .unwrap();
        assert_eq!(
            param(&url, "filter").unwrap(),
            concat!(
                r#"data_type == "tekton.dev/v1beta1.PipelineRun""#,
                r#" && data.metadata.name == "x""#,
                r#" && data.metadata.labels["app"] == "web""#,
                r#" && data.metadata.labels["env"] in ["prod"]"#,
                r#" && data.status.conditions[0].status == "True""#,
            )
        );
    }

    #[test]
    fn test_order_is_fixed() {
        let url = records_url("w", "ns", DataType::Log, None, &ListOptions::default(), None)
            .unwrap();
        assert_eq!(param(&url, "order_by").as_deref(), Some("create_time desc"));
    }

    #[test]
    fn test_unsupported_operator_surfaces_from_url_builder() {
        let opts = ListOptions {
            selector: Some(Selector::default().with_expression(MatchExpression::new(
                "a",
                Operator::from("Near"),
                vec![],
            ))),
            ..Default::default()
        };
        assert!(records_url("w", "ns", DataType::TaskRun, None, &opts, None).is_err());
    }

    #[test]
    fn test_log_url() {
        assert_eq!(
            log_url("ws", "ns/results/abc/records/def"),
            "/plugins/tekton-results/workspaces/ws/apis/results.tekton.dev/v1alpha2/parents/ns/results/abc/logs/def"
        );
    }
}
