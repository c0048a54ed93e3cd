use super::resolve_config;
use crate::cli::args::ValidateArgs;
use crate::exit_codes;
use anyhow::Context;
use sift_core::providers::build_client;
use sift_core::{Orchestrator, QcItem, QcResult};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    // 1. Config plus command-line overrides
    let mut config = match resolve_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    if args.no_semantic {
        config.semantic.enabled = false;
    }
    if let Some(provider) = args.judge {
        config.semantic.provider = provider;
    }

    // 2. Items
    let items = match read_items(&args.input) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("input error: {e:#}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    // 3. Pipeline
    let client = match build_client(&config.semantic) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("judge setup failed: {e:#}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let orchestrator = match Orchestrator::new(config, client) {
        Ok(o) => Arc::new(o),
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    info!(
        items = items.len(),
        parallel = args.parallel,
        layers = ?orchestrator.layer_kinds(),
        "starting validation"
    );
    let results = orchestrator
        .clone()
        .validate_batch(items, !args.no_semantic, args.parallel)
        .await?;

    // 4. Report
    write_results(&results, args.output.as_deref())?;
    let stats = orchestrator.stats();
    if args.summary {
        eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    }
    info!(
        total = stats.total_checked,
        passed = stats.passed,
        failed = stats.failed,
        "validation finished"
    );

    Ok(if stats.failed == 0 {
        exit_codes::SUCCESS
    } else {
        exit_codes::ITEMS_FAILED
    })
}

fn read_items(path: &Path) -> anyhow::Result<Vec<QcItem>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading items from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading items from {}", path.display()))?
    };
    parse_items(&raw)
}

/// Accepts a JSON array or JSON Lines (blank lines ignored).
fn parse_items(raw: &str) -> anyhow::Result<Vec<QcItem>> {
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(raw).context("parsing JSON array of items");
    }
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("parsing item on line {}", idx + 1))
        })
        .collect()
}

fn write_results(results: &[QcResult], output: Option<&Path>) -> anyhow::Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);
    for result in results {
        serde_json::to_writer(&mut out, result)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
