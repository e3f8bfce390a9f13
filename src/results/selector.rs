// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Translation of Kubernetes-style selectors into Results filter expressions
//!
//! A `Selector` is the same document a dashboard hands to a Kubernetes list
//! call (`matchLabels`, `matchExpressions`) extended with two free-text
//! filters (`filterByName`, `filterByCommit`). Records in the Results store
//! carry the original resource under `data`, so every label lookup becomes
//! `data.metadata.labels["key"]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::{Result, ResultsError};
use super::filter::{CompareOp, Filter};

/// Label set by Pipelines-as-Code with the commit a run was triggered for
pub const COMMIT_LABEL: &str = "pipelinesascode.tekton.dev/sha";
/// Label set on integration test runs with the commit under test
pub const TEST_SERVICE_COMMIT_LABEL: &str = "pac.test.appstudio.openshift.io/sha";
/// Annotation set by the build service with the built commit
pub const COMMIT_ANNOTATION: &str = "build.appstudio.redhat.com/commit_sha";

/// Match-expression operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Exists,
    DoesNotExist,
    In,
    NotIn,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    /// Anything else; kept so translation can report it
    Other(String),
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s {
            "Exists" => Operator::Exists,
            "DoesNotExist" => Operator::DoesNotExist,
            "In" => Operator::In,
            "NotIn" => Operator::NotIn,
            "Equals" => Operator::Equals,
            "NotEquals" | "NotEqual" => Operator::NotEquals,
            "GreaterThan" => Operator::GreaterThan,
            "LessThan" => Operator::LessThan,
            other => Operator::Other(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from(s.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Exists => "Exists",
            Operator::DoesNotExist => "DoesNotExist",
            Operator::In => "In",
            Operator::NotIn => "NotIn",
            Operator::Equals => "Equals",
            Operator::NotEquals => "NotEquals",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThan => "LessThan",
            Operator::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

/// A single (key, operator, values) predicate over the label set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchExpression {
    pub key: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl MatchExpression {
    pub fn new(key: impl Into<String>, operator: Operator, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            operator,
            values: Some(values),
        }
    }

    fn values(&self) -> &[String] {
        self.values.as_deref().unwrap_or(&[])
    }

    /// First value, when present and non-empty
    fn first_value(&self) -> Option<&str> {
        self.values().first().map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Translate into a filter expression
    ///
    /// Operators that need values yield an empty filter when none are given.
    pub fn to_filter(&self) -> Result<Filter> {
        let label = label_field(&self.key);
        let filter = match &self.operator {
            Operator::Exists => {
                Filter::raw(format!("data.metadata.labels.contains(\"{}\")", self.key))
            }
            Operator::DoesNotExist => {
                Filter::raw(format!("!data.metadata.labels.contains(\"{}\")", self.key))
            }
            Operator::NotIn => Filter::and(self.values().iter().map(|v| Filter::neq(&label, v))),
            Operator::In if self.values().is_empty() => Filter::empty(),
            Operator::In => Filter::in_list(label, self.values().to_vec()),
            Operator::Equals => self
                .first_value()
                .map(|v| Filter::eq(label, v))
                .unwrap_or_default(),
            Operator::NotEquals => self
                .first_value()
                .map(|v| Filter::neq(label, v))
                .unwrap_or_default(),
            Operator::GreaterThan => self
                .first_value()
                .map(|v| Filter::binary(label, v, CompareOp::Gt))
                .unwrap_or_default(),
            Operator::LessThan => self
                .first_value()
                .map(|v| Filter::binary(label, v, CompareOp::Lt))
                .unwrap_or_default(),
            Operator::Other(op) => return Err(ResultsError::UnsupportedOperator(op.clone())),
        };
        Ok(filter)
    }
}

/// Parses `key Operator [v1,v2,...]`, e.g. `env In prod,staging` or `app Exists`
impl FromStr for MatchExpression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(key), Some(operator)) = (parts.next(), parts.next()) else {
            return Err(format!(
                "invalid match expression '{}': expected 'key Operator [v1,v2,...]'",
                s
            ));
        };
        let values: Vec<String> = parts
            .flat_map(|p| p.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            key: key.to_string(),
            operator: Operator::from(operator),
            values: if values.is_empty() { None } else { Some(values) },
        })
    }
}

/// Structured description of which records to match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<MatchExpression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_commit: Option<String>,
    /// Remaining keys; used as a plain label map when neither
    /// `matchLabels` nor `matchExpressions` is set
    #[serde(flatten)]
    pub labels: BTreeMap<String, String>,
}

impl Selector {
    pub fn with_match_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_expression(mut self, expression: MatchExpression) -> Self {
        self.match_expressions
            .get_or_insert_with(Vec::new)
            .push(expression);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.filter_by_name = Some(name.into());
        self
    }

    pub fn with_commit(mut self, sha: impl Into<String>) -> Self {
        self.filter_by_commit = Some(sha.into());
        self
    }

    /// Translate the whole selector into one AND-combined filter
    pub fn to_filter(&self) -> Result<Filter> {
        let mut parts = Vec::new();

        if let Some(name) = self.filter_by_name.as_deref() {
            parts.push(name_filter(name));
        }

        if let Some(sha) = self.filter_by_commit.as_deref() {
            parts.push(commit_sha_filter(sha));
        }

        if self.match_labels.is_some() || self.match_expressions.is_some() {
            if let Some(labels) = &self.match_labels {
                parts.push(labels_to_filter(labels));
            }
            if let Some(expressions) = &self.match_expressions {
                parts.push(expressions_to_filter(expressions)?);
            }
        } else {
            parts.push(labels_to_filter(&self.labels));
        }

        Ok(Filter::and(parts))
    }
}

fn label_field(key: &str) -> String {
    format!("data.metadata.labels[\"{}\"]", key)
}

/// AND of `data.metadata.labels["key"] == "value"` for every label
pub fn labels_to_filter(labels: &BTreeMap<String, String>) -> Filter {
    Filter::and(labels.iter().map(|(k, v)| Filter::eq(label_field(k), v)))
}

/// Prefix match on the record's resource name, case-folded
pub fn name_filter(name: &str) -> Filter {
    if name.is_empty() {
        return Filter::empty();
    }
    Filter::raw(format!(
        "data.metadata.name.startsWith(\"{}\")",
        name.trim().to_lowercase()
    ))
}

/// Any of the places a commit SHA may be recorded equals `sha`
pub fn commit_sha_filter(sha: &str) -> Filter {
    if sha.is_empty() {
        return Filter::empty();
    }
    Filter::or([
        Filter::eq(label_field(COMMIT_LABEL), sha),
        Filter::eq(label_field(TEST_SERVICE_COMMIT_LABEL), sha),
        Filter::eq(
            format!("data.metadata.annotations[\"{}\"]", COMMIT_ANNOTATION),
            sha,
        ),
    ])
}

pub fn expressions_to_filter(expressions: &[MatchExpression]) -> Result<Filter> {
    let parts = expressions
        .iter()
        .map(MatchExpression::to_filter)
        .collect::<Result<Vec<_>>>()?;
    Ok(Filter::and(parts))
}
