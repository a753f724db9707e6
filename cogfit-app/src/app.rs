use crate::cli::Args;
use anyhow::{Context, Result, bail};
use cogfit_core::Stage;
use cogfit_experiment::{BatchConfig, TaskKind};
use cogfit_stats::{RenderOptions, TaskResult, render_report};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    task: &'static str,
    passed: bool,
    result: &'a TaskResult,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    seed: Option<u64>,
    tasks: Vec<JsonEntry<'a>>,
}

pub struct App {
    config: BatchConfig,
    tasks: Vec<TaskKind>,
    json: Option<PathBuf>,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => BatchConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BatchConfig::default(),
        };
        if args.seed.is_some() {
            config.seed = args.seed;
        }
        if args.iterations.is_some() {
            config.iterations = args.iterations;
        }
        config.show_rmse |= args.show_rmse;

        let tasks = parse_tasks(&args.task)?;
        Ok(Self {
            config,
            tasks,
            json: args.json,
        })
    }

    pub fn run(self) -> Result<()> {
        println!("=== COGNITIVE TASK FIT ===");
        println!(
            "Tasks: {}",
            self.tasks
                .iter()
                .map(TaskKind::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        match self.config.seed {
            Some(seed) => println!("Seed: {seed}\n"),
            None => println!("Seed: random\n"),
        }

        let results = self.evaluate()?;
        let options = RenderOptions {
            show_rmse: self.config.show_rmse,
        };
        let report = render_report(&results, options);
        print!("{report}");

        if let Some(path) = &self.json {
            if let Err(err) = self.write_json(path, &results) {
                warn!(path = %path.display(), "json output failed: {err:#}");
            }
        }

        let failed = results.iter().filter(|r| !r.passed()).count();
        info!(tasks = results.len(), failed, "evaluation finished");
        Ok(())
    }

    fn evaluate(&self) -> Result<Vec<TaskResult>> {
        let mut results = Vec::with_capacity(self.tasks.len());
        for kind in &self.tasks {
            let mut stage = Stage::echoing();
            info!(task = %kind, "evaluating");
            let result = kind
                .evaluate(&self.config, Some(&mut stage))
                .with_context(|| format!("evaluating {kind}"))?;
            results.push(result);
        }
        Ok(results)
    }

    fn write_json(&self, path: &Path, results: &[TaskResult]) -> Result<()> {
        let report = JsonReport {
            seed: self.config.seed,
            tasks: self
                .tasks
                .iter()
                .zip(results)
                .map(|(kind, result)| JsonEntry {
                    task: kind.name(),
                    passed: result.passed(),
                    result,
                })
                .collect(),
        };
        let text = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "results written");
        Ok(())
    }
}

fn parse_tasks(spec: &str) -> Result<Vec<TaskKind>> {
    if spec.eq_ignore_ascii_case("all") {
        return Ok(TaskKind::ALL.to_vec());
    }
    let mut tasks = Vec::new();
    for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<TaskKind>() {
            Ok(kind) if !tasks.contains(&kind) => tasks.push(kind),
            Ok(_) => {}
            Err(err) => bail!(err),
        }
    }
    if tasks.is_empty() {
        bail!("no task selected");
    }
    Ok(tasks)
}
