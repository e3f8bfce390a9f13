// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod output;
mod progress;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

use cli::{Args, Command, ListArgs, OutputFormat};
use output::RecordTable;
use tekton_results::config::{self, Config};
use tekton_results::results::url::records_url;
use tekton_results::results::{DataType, HttpFetcher, ResultsCache, ResultsClient};

/// Log to a rotating file under ~/.tekton-results/log/, and to stderr with --verbose
///
/// `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};

    let Ok(log_dir) = config::base_dir().map(|dir| dir.join("log")) else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory {}: {}", log_dir.display(), e);
        return;
    }

    // Daily or 10MB, whichever comes first; keep the last 5
    let rotation = RollingConditionBase::new().daily().max_size(10 * 1024 * 1024);
    let appender = RollingFileAppenderBase::new(log_dir.join("tekton-results.log"), rotation, 5);
    let (writer, guard) = match appender {
        Ok(appender) => appender.get_non_blocking_appender(),
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            return;
        }
    };
    std::mem::forget(guard);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("tekton_results={}", default_level))
    });

    let stderr = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .with(stderr)
        .init();
}

/// Settings from the command line, environment and config file, in that order
fn resolve_config(args: &Args) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Ignoring config file: {:#}", e);
        Config::default()
    });
    config.merge(Config {
        base_url: args.url.clone(),
        workspace: args.workspace.clone(),
        namespace: args.namespace.clone(),
        timeout_secs: args.timeout,
    });
    config
}

fn require<'a>(value: &'a Option<String>, what: &str, flag: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("No {} configured; pass {} or run `configure`", what, flag))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = resolve_config(&args);

    if let Command::Configure = args.command {
        config.save().context("Failed to save configuration")?;
        println!("Saved configuration to {}", Config::config_path()?.display());
        return Ok(());
    }

    let workspace = require(&config.workspace, "workspace", "--workspace")?;
    let namespace = require(&config.namespace, "namespace", "--namespace")?;

    if let Command::Url { data_type, list } = &args.command {
        let opts = list.list_options();
        let url = records_url(
            workspace,
            namespace,
            DataType::from(*data_type),
            None,
            &opts,
            list.page_token.as_deref(),
        )?;
        println!("{}", url);
        return Ok(());
    }

    let base_url = require(&config.base_url, "service URL", "--url")?;
    let fetcher = HttpFetcher::new(base_url, args.token.as_deref(), config.timeout())
        .context("Failed to create HTTP client")?;
    let cache = Arc::new(ResultsCache::new());
    let client = ResultsClient::new(fetcher, cache, workspace);

    info!(base_url = %base_url, workspace = %workspace, namespace = %namespace, "Querying Tekton Results");

    match &args.command {
        Command::PipelineRuns(list) => {
            run_list(&client, &args, namespace, DataType::PipelineRun, list).await
        }
        Command::TaskRuns(list) => {
            run_list(&client, &args, namespace, DataType::TaskRun, list).await
        }
        Command::Log { task_run } => {
            let log = client
                .get_task_run_log(namespace, task_run)
                .await
                .with_context(|| format!("Failed to fetch log for task run '{}'", task_run))?;
            print!("{}", log);
            Ok(())
        }
        Command::Url { .. } | Command::Configure => Ok(()),
    }
}

async fn run_list(
    client: &ResultsClient<HttpFetcher>,
    args: &Args,
    namespace: &str,
    data_type: DataType,
    list: &ListArgs,
) -> Result<()> {
    let what = match data_type {
        DataType::PipelineRun => "PipelineRuns",
        DataType::TaskRun => "TaskRuns",
        DataType::Log => "Logs",
    };
    let spinner = progress::create_spinner(
        &progress::fetch_message(what, namespace, list.all),
        matches!(args.output, OutputFormat::Table),
    );

    let opts = list.list_options();
    let result = if list.all {
        client.get_all_records(namespace, data_type, &opts).await
    } else {
        client
            .get_filtered_records(
                namespace,
                data_type,
                None,
                &opts,
                list.page_token.as_deref(),
                None,
            )
            .await
    };
    spinner.finish_and_clear();
    let page = result.with_context(|| format!("Failed to list {}", what))?;

    println!(
        "{}",
        RecordTable::from_page(&page).format(&args.output, args.no_headers)
    );
    if let Some(token) = page.next_page_token() {
        eprintln!("More records available: --page-token {}", token);
    }
    Ok(())
}
