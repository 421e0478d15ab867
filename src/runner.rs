use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use header_hardener::analyze::{AnalysisResult, Analyzer, EvaluatedHeader};
use header_hardener::concurrent::{BatchRunner, ResultCache};
use header_hardener::config::Config;
use header_hardener::fixes::{FrameworkConfig, Platform};
use header_hardener::http_client::create_client;
use header_hardener::output::{render_csp, render_hsts, render_report, write_csv, write_jsonl};
use header_hardener::probe::{analyze_url, HttpHeaderSource, Throttle};
use header_hardener::publish::{DirectoryPublisher, PatchPublisher, PublishRequest};
use header_hardener::utils::{ensure_dir, read_targets};
use header_hardener::{check_hsts_preload, validate_csp};

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    // Our crate at the requested level, HTTP internals kept at INFO.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter_str = format!(
        "header_hardener={crate},reqwest=info,hyper=info,h2=info",
        crate = crate_level
    );
    let env_filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { url, json, platforms, timeout } => {
            let mut config = config;
            if let Some(t) = timeout {
                config.timeout_secs = t;
            }
            handle_analyze(&config, &url, json, parse_platforms(&platforms)).await
        }
        Commands::Batch { file, out, concurrency, per_host } => {
            let mut config = config;
            if let Some(c) = concurrency {
                config.concurrency = c;
            }
            if let Some(p) = per_host {
                config.per_host = p;
            }
            handle_batch(&config, &file, &out).await
        }
        Commands::Csp { policy } => {
            println!("{}", render_csp(&validate_csp(&policy)));
            Ok(())
        }
        Commands::Hsts { value } => {
            println!("{}", render_hsts(&check_hsts_preload(&value)));
            Ok(())
        }
        Commands::Fix { url, platforms, existing, out } => {
            handle_fix(&config, &url, parse_platforms(&platforms), existing.as_deref(), &out).await
        }
    }
}

fn parse_platforms(raw: &[String]) -> Vec<Platform> {
    raw.iter()
        .filter_map(|s| s.parse::<Platform>().ok())
        .collect()
}

/// Shared pieces every networked command needs.
fn build_source(config: &Config) -> anyhow::Result<HttpHeaderSource> {
    let client = create_client(config.timeout_secs, &config.user_agent).context("building HTTP client")?;
    let throttle = Arc::new(Throttle::new(config.concurrency as usize, config.per_host as usize));
    Ok(HttpHeaderSource::new(client)
        .with_retries(config.retries as usize)
        .with_throttle(throttle))
}

fn build_analyzer(config: &Config, platforms: Vec<Platform>) -> Analyzer {
    let platforms = if platforms.is_empty() { config.platforms.clone() } else { platforms };
    Analyzer::new().with_platforms(platforms)
}

async fn handle_analyze(config: &Config, url: &str, json: bool, platforms: Vec<Platform>) -> anyhow::Result<()> {
    let source = build_source(config)?;
    let analyzer = build_analyzer(config, platforms);
    let result = analyze_url(&analyzer, &source, url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_report(&result, std::io::stdout().is_terminal()));
    }
    Ok(())
}

async fn handle_batch(config: &Config, file: &Path, out: &Path) -> anyhow::Result<()> {
    let targets = read_targets(file).with_context(|| format!("reading targets from {}", file.display()))?;
    if targets.is_empty() {
        warn!(file = %file.display(), "no targets found");
        return Ok(());
    }
    ensure_dir(out)?;
    info!(targets = targets.len(), concurrency = config.concurrency, "starting batch");

    let progress = ProgressBar::new(targets.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let source = Arc::new(build_source(config)?);
    let cache = Arc::new(ResultCache::new(Duration::from_secs(config.cache_ttl_secs)));
    let runner = BatchRunner::new(
        Arc::new(build_analyzer(config, Vec::new())),
        source,
        config.concurrency as usize,
    )
    .with_cache(cache)
    .with_progress(progress.clone());

    let outcomes = runner.run(targets).await;
    progress.finish_and_clear();

    let mut ok: Vec<&AnalysisResult> = Vec::new();
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => ok.push(result),
            Err(e) => eprintln!("  {} -> {}", outcome.url, e),
        }
    }

    let jsonl = out.join("results.jsonl");
    let csv = out.join("summary.csv");
    write_jsonl(&jsonl, &ok)?;
    write_csv(&csv, &ok)?;

    let (completed, errors) = runner.get_stats();
    println!("Analyzed {} of {} targets ({} failed)", runner.succeeded(), completed, errors);
    println!("  {}", jsonl.display());
    println!("  {}", csv.display());
    Ok(())
}

async fn handle_fix(
    config: &Config,
    url: &str,
    platforms: Vec<Platform>,
    existing: Option<&Path>,
    out: &Path,
) -> anyhow::Result<()> {
    let source = build_source(config)?;
    let analyzer = build_analyzer(config, platforms.clone());
    let result = analyze_url(&analyzer, &source, url).await?;

    if result.fix_set.is_empty() {
        println!("{} already sends every recommended header (score {}, {})", result.url, result.score, result.grade);
        return Ok(());
    }

    // Explicit platforms first, then the detected one, then the configured defaults.
    let platforms = if !platforms.is_empty() {
        platforms
    } else if let Some(detected) = &result.framework {
        vec![detected.clone()]
    } else {
        config.platforms.clone()
    };

    let mut configs: Vec<FrameworkConfig> = platforms.into_iter().map(FrameworkConfig::new).collect();
    if let (Some(path), Some(first)) = (existing, configs.first_mut()) {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading existing config {}", path.display()))?;
        let mut merged = FrameworkConfig::with_content(first.platform.clone(), content);
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            merged.config_file = name.to_string();
        }
        *first = merged;
    }

    let evaluated: Vec<EvaluatedHeader> = result.evaluated().cloned().collect();
    let fixes = analyzer.generate_fixes_with(&evaluated, &configs);
    let result = AnalysisResult { fixes, ..result };

    let request = PublishRequest::from_analysis(&result, &configs);
    for (path, warning) in request.warnings() {
        warn!(file = path, "{}", warning);
    }

    let outcome = DirectoryPublisher::new(out).publish(&request).await?;
    println!(
        "{} fix{} for {} written to {} ({} file{})",
        result.fix_set.len(),
        if result.fix_set.len() == 1 { "" } else { "es" },
        result.url,
        outcome.location,
        outcome.files_written,
        if outcome.files_written == 1 { "" } else { "s" },
    );
    Ok(())
}
