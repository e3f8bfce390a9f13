// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tekton_results::results::{DataType, ListOptions, MatchExpression, Selector};

#[derive(Parser, Debug)]
#[command(name = "tekton-results")]
#[command(author, version, about = "Query Tekton Results records and logs")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Console URL serving the tekton-results plugin proxy
    #[arg(long, env = "TEKTON_RESULTS_URL", global = true)]
    pub url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "TEKTON_RESULTS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Workspace the namespace belongs to
    #[arg(short, long, env = "TEKTON_RESULTS_WORKSPACE", global = true)]
    pub workspace: Option<String>,

    /// Namespace to query
    #[arg(short, long, env = "TEKTON_RESULTS_NAMESPACE", global = true)]
    pub namespace: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Omit column headers in output
    #[arg(long, global = true)]
    pub no_headers: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List PipelineRun records
    PipelineRuns(ListArgs),

    /// List TaskRun records
    TaskRuns(ListArgs),

    /// Print the log of a TaskRun
    Log {
        /// TaskRun name
        task_run: String,
    },

    /// Print the list request path without sending it
    Url {
        #[arg(value_enum)]
        data_type: DataTypeArg,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Save connection defaults to the config file
    Configure,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct ListArgs {
    /// Exact label match, repeatable: -l app=web
    #[arg(short = 'l', long = "label", value_name = "KEY=VALUE", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Match expression, repeatable: -e "env In prod,staging", -e "app Exists"
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub expressions: Vec<MatchExpression>,

    /// Resource name prefix
    #[arg(long)]
    pub name: Option<String>,

    /// Commit SHA
    #[arg(long)]
    pub commit: Option<String>,

    /// Extra raw filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Records per page (clamped to 5..=10000)
    #[arg(long, allow_negative_numbers = true)]
    pub page_size: Option<i64>,

    /// Return at most this many records, without pagination
    #[arg(long)]
    pub limit: Option<usize>,

    /// Continuation token from a previous page
    #[arg(long)]
    pub page_token: Option<String>,

    /// Follow continuation tokens and print every page
    #[arg(long, conflicts_with = "page_token")]
    pub all: bool,
}

impl ListArgs {
    pub fn selector(&self) -> Option<Selector> {
        if self.labels.is_empty()
            && self.expressions.is_empty()
            && self.name.is_none()
            && self.commit.is_none()
        {
            return None;
        }

        let mut selector = Selector::default();
        for (key, value) in &self.labels {
            selector = selector.with_match_label(key, value);
        }
        for expression in &self.expressions {
            selector = selector.with_expression(expression.clone());
        }
        selector.filter_by_name = self.name.clone();
        selector.filter_by_commit = self.commit.clone();
        Some(selector)
    }

    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            page_size: self.page_size,
            selector: self.selector(),
            limit: self.limit,
            filter: self.filter.clone(),
        }
    }
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("invalid label '{}': expected KEY=VALUE", s)),
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DataTypeArg {
    PipelineRun,
    TaskRun,
    Log,
}

impl From<DataTypeArg> for DataType {
    fn from(arg: DataTypeArg) -> Self {
        match arg {
            DataTypeArg::PipelineRun => DataType::PipelineRun,
            DataTypeArg::TaskRun => DataType::TaskRun,
            DataTypeArg::Log => DataType::Log,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Yaml,
}
