// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Filter expressions for the Tekton Results list API
//!
//! The Results service accepts a CEL filter string in the `filter` query
//! parameter. Expressions are built as a small tree and rendered with
//! `Display`, which produces the exact text the service expects:
//!
//! - `And` joins non-empty operands with ` && `
//! - `Or` joins non-empty operands with ` || ` and wraps them in parentheses
//!   when more than one operand survives
//! - `Compare` renders `left op right`; `==`/`!=` quote the right-hand side
//!
//! Empty operands are dropped everywhere, so composing optional pieces never
//! leaves a dangling `&&`. Values are not escaped: a value containing `"`
//! produces a broken expression.
//!
//! REST API reference:
//! https://github.com/tektoncd/results/blob/main/docs/api/rest-api-spec.md

use std::fmt;

/// Comparison operator in a binary expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Pre-rendered text, emitted verbatim (may be empty)
    Raw(String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Compare {
        left: String,
        op: CompareOp,
        /// Right-hand side exactly as it should appear (already quoted if needed)
        right: String,
    },
    /// `left in ["a","b"]`
    InList { left: String, values: Vec<String> },
}

impl Filter {
    /// The empty filter
    pub fn empty() -> Self {
        Filter::Raw(String::new())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Filter::Raw(text.into())
    }

    /// `field == "value"`
    pub fn eq(field: impl Into<String>, value: &str) -> Self {
        Self::binary(field, quote(value), CompareOp::Eq)
    }

    /// `field != "value"`
    pub fn neq(field: impl Into<String>, value: &str) -> Self {
        Self::binary(field, quote(value), CompareOp::NotEq)
    }

    /// `left op right` with `right` emitted as-is
    pub fn binary(left: impl Into<String>, right: impl Into<String>, op: CompareOp) -> Self {
        Filter::Compare {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    pub fn in_list(left: impl Into<String>, values: Vec<String>) -> Self {
        Filter::InList {
            left: left.into(),
            values,
        }
    }

    pub fn and(operands: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(operands.into_iter().collect())
    }

    /// True when the filter renders to the empty string
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Raw(text) => text.is_empty(),
            Filter::And(ops) | Filter::Or(ops) => ops.iter().all(Filter::is_empty),
            Filter::Compare { .. } | Filter::InList { .. } => false,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::empty()
    }
}

impl From<&str> for Filter {
    fn from(text: &str) -> Self {
        Filter::Raw(text.to_string())
    }
}

impl From<String> for Filter {
    fn from(text: String) -> Self {
        Filter::Raw(text)
    }
}

impl From<Option<&str>> for Filter {
    fn from(text: Option<&str>) -> Self {
        text.map(Filter::from).unwrap_or_default()
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}

fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[&Filter], sep: &str) -> fmt::Result {
    for (idx, operand) in operands.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", operand)?;
    }
    Ok(())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Raw(text) => f.write_str(text),
            Filter::And(ops) => {
                let present: Vec<&Filter> = ops.iter().filter(|op| !op.is_empty()).collect();
                write_joined(f, &present, " && ")
            }
            Filter::Or(ops) => {
                let present: Vec<&Filter> = ops.iter().filter(|op| !op.is_empty()).collect();
                if present.len() > 1 {
                    f.write_str("(")?;
                    write_joined(f, &present, " || ")?;
                    f.write_str(")")
                } else {
                    write_joined(f, &present, " || ")
                }
            }
            Filter::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Filter::InList { left, values } => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "{} in [{}]", left, quoted.join(","))
            }
        }
    }
}

/// AND of the given operands, rendered
pub fn and<I, F>(operands: I) -> String
where
    I: IntoIterator<Item = F>,
    F: Into<Filter>,
{
    Filter::and(operands.into_iter().map(Into::into)).to_string()
}

/// OR of the given operands, rendered
pub fn or<I, F>(operands: I) -> String
where
    I: IntoIterator<Item = F>,
    F: Into<Filter>,
{
    Filter::or(operands.into_iter().map(Into::into)).to_string()
}
