use std::io::{self, Write};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::Serialize;
use tracing::info;

use crate::app::ports::{ChunkWriter, EngineStatusSource, SqlExecutor};
use crate::app::{
    BulkLoader, LogProgress, PollConfig, poll_until_below_limit, run_stage, run_stress,
};
use crate::cli::{Args, BenchArgs, Command, LoadArgs, PurgeArgs, StressArgs};
use crate::domain::{EngineStatusSnapshot, Row};
use crate::infra::adapters::{ChurnWriter, InsertWriter, MySqlAdapter};
use crate::infra::config::AppConfig;
use crate::infra::source::read_csv_rows;
use crate::infra::sql::{build_delete_limited, build_truncate};

/// Overrides `connection.password` from the config file.
const PASSWORD_ENV: &str = "SEEDLOAD_PASSWORD";

pub async fn run(args: Args) -> Result<()> {
    let config = AppConfig::resolve(args.config.as_deref())?
        .with_password_override(std::env::var(PASSWORD_ENV).ok());
    let adapter = Arc::new(
        MySqlAdapter::new(config.to_profile())
            .with_binary(config.loader.mysql_bin.clone())
            .with_timeout_secs(config.loader.timeout_secs),
    );
    info!(connection = %adapter.profile().display_name(), "Using connection");

    match args.command {
        Command::Load(load) => run_load(&config, adapter, load).await,
        Command::Bench(bench) => run_bench(adapter, bench).await,
        Command::Purge(purge) => run_purge(adapter.as_ref(), purge).await,
        Command::Stress(stress) => run_stress_queries(adapter.as_ref(), stress).await,
        Command::Status => run_status(adapter.as_ref()).await,
    }
}

async fn run_load(config: &AppConfig, adapter: Arc<MySqlAdapter>, args: LoadArgs) -> Result<()> {
    let loader = BulkLoader::new(args.batch_size.unwrap_or(config.loader.batch_size))?;
    let source = read_csv_rows(&args.file).wrap_err("Failed to read rows")?;
    let writer: Box<dyn ChunkWriter<Row>> = match args.delete_half_by {
        Some(key_column) => Box::new(ChurnWriter::new(
            adapter.clone(),
            &args.table,
            source.columns,
            key_column,
        )),
        None => Box::new(InsertWriter::new(adapter.clone(), &args.table, source.columns)),
    };
    let probe = args
        .engine_metrics
        .then_some(adapter.as_ref() as &dyn EngineStatusSource);

    let report = run_stage(
        &args.table,
        &loader,
        &source.rows,
        writer.as_ref(),
        probe,
        &mut LogProgress,
    )
    .await;

    if args.json {
        print_json(&report)
    } else {
        print_lines(&report.summary_lines())
    }
}

/// One stage per batch size over the same rows.
async fn run_bench(adapter: Arc<MySqlAdapter>, args: BenchArgs) -> Result<()> {
    // Validate every size before touching the table.
    let loaders = args
        .batch_sizes
        .iter()
        .map(|&size| BulkLoader::new(size))
        .collect::<Result<Vec<_>, _>>()?;
    let source = read_csv_rows(&args.file).wrap_err("Failed to read rows")?;
    let writer = InsertWriter::new(adapter.clone(), &args.table, source.columns);
    let truncate_sql = build_truncate(&args.table);

    let mut reports = Vec::with_capacity(loaders.len());
    for loader in &loaders {
        if args.truncate {
            adapter
                .execute_write(&truncate_sql)
                .await
                .wrap_err_with(|| format!("Failed to truncate {}", args.table))?;
        }
        info!(
            batch_size = loader.batch_size().get(),
            "Inserting records in batches of {}",
            loader.batch_size()
        );

        let report = run_stage(
            &args.table,
            loader,
            &source.rows,
            &writer,
            Some(adapter.as_ref() as &dyn EngineStatusSource),
            &mut LogProgress,
        )
        .await;

        if !args.json {
            print_lines(&report.summary_lines())?;
            print_lines(&[String::new()])?;
        }
        reports.push(report);
    }

    if args.json {
        print_json(&reports)?;
    }
    Ok(())
}

async fn run_purge(adapter: &MySqlAdapter, args: PurgeArgs) -> Result<()> {
    let mut config = PollConfig::new(args.limit, Duration::from_millis(args.delay_ms));
    if let Some(max) = args.max_attempts {
        let max = NonZeroU32::new(max).ok_or_else(|| eyre!("--max-attempts must be positive"))?;
        config = config.with_max_attempts(max);
    }
    if let Some(secs) = args.max_duration_secs {
        config = config.with_max_duration(Duration::from_secs(secs));
    }

    let sql = build_delete_limited(&args.table, args.condition.as_deref(), args.limit);
    let sql = sql.as_str();
    let outcome = poll_until_below_limit(
        move || async move {
            adapter
                .execute_write(sql)
                .await
                .map(|result| result.affected_rows)
        },
        &config,
    )
    .await?;

    print_lines(&[format!(
        "Deleted {} rows from {} in {} passes.",
        outcome.rows_processed, args.table, outcome.passes
    )])
}

async fn run_stress_queries(executor: &dyn SqlExecutor, args: StressArgs) -> Result<()> {
    let log_interval = Duration::from_millis(args.log_interval_ms);
    let mut reports = Vec::with_capacity(args.queries.len());
    for query in &args.queries {
        let report = run_stress(executor, query, query, args.iterations, log_interval).await?;
        if !args.json {
            print_lines(&[report.summary_line()])?;
        }
        reports.push(report);
    }

    if args.json {
        print_json(&reports)?;
    }
    Ok(())
}

async fn run_status(source: &dyn EngineStatusSource) -> Result<()> {
    let snapshot = source.snapshot().await?;
    print_lines(&status_lines(&snapshot))
}

fn status_lines(snapshot: &EngineStatusSnapshot) -> Vec<String> {
    vec![
        "InnoDB Status:".to_string(),
        format!("Pages Created: {}", counter_display(snapshot.pages_created)),
        format!("Free Buffers: {}", counter_display(snapshot.free_buffers)),
    ]
}

fn counter_display(value: Option<u64>) -> String {
    value.map_or_else(|| "Not Found".to_string(), |v| v.to_string())
}

fn print_lines(lines: &[String]) -> Result<()> {
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
