use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cold_start_bench::report::{self, OutputFormat, RenderOptions};
use cold_start_bench::{analyze, Args, Dispatcher, HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries nothing but the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let options = RenderOptions {
        format: if args.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        color: !args.no_color && std::io::stdout().is_terminal(),
    };

    // ── 1. Validate before anything is sent ─────────────────────
    let config = args.into_config()?;

    // ── 2. Dispatch ─────────────────────────────────────────────
    let transport = HttpTransport::new().context("failed to construct HTTP client")?;
    let sample = Dispatcher::new(Arc::new(transport))
        .run(&config)
        .await
        .context("load test aborted")?;

    // ── 3. Analyse ──────────────────────────────────────────────
    let analysis = analyze(&sample);
    info!(
        "{} of {} successful responses look like cold starts",
        analysis.count,
        sample.success_count()
    );

    // ── 4. Report ───────────────────────────────────────────────
    let rendered = report::render(&config, &sample, &analysis, options)
        .context("failed to render report")?;
    println!("{}", rendered.trim_end());

    Ok(())
}
