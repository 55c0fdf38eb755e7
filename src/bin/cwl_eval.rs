#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cwl_eval::{load_config_from_path, run_evaluation, EvalConfig, EvalRequest, MetricRegistry, ReportFormat};

#[derive(Parser)]
#[command(
    name = "cwl-eval",
    version,
    about = "C/W/L evaluation of TREC formatted runs"
)]
struct Cli {
    /// TREC qrel file: `topic unused doc gain`
    #[arg(required_unless_present = "list_metrics")]
    gain_file: Option<PathBuf>,
    /// TREC run file: `topic element_type doc rank score run`
    #[arg(required_unless_present = "list_metrics")]
    result_file: Option<PathBuf>,
    /// Cost per element type: `element_type cost`
    #[arg(short = 'c', long, alias = "cost_file")]
    cost_file: Option<PathBuf>,
    /// Metrics to report, one `Name(params)` per line (default: baseline set)
    #[arg(short = 'm', long, alias = "metrics_file")]
    metrics_file: Option<PathBuf>,
    /// Write BibTeX for the metrics used to this file
    #[arg(short = 'b', long, alias = "bib_file")]
    bib_file: Option<PathBuf>,
    /// Include column names in the output
    #[arg(short = 'n', long)]
    colnames: bool,
    /// Report residuals (best case minus worst case)
    #[arg(short = 'r', long)]
    residuals: bool,
    #[arg(long, alias = "max_gain")]
    max_gain: Option<f64>,
    #[arg(long, alias = "min_gain")]
    min_gain: Option<f64>,
    #[arg(long, alias = "max_cost")]
    max_cost: Option<f64>,
    #[arg(long, alias = "min_cost")]
    min_cost: Option<f64>,
    /// Depth every ranking is evaluated to
    #[arg(long, alias = "max_depth")]
    max_depth: Option<usize>,
    /// JSON run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,
    /// Write scores here instead of stdout
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,
    /// Print the registered metric identifiers and exit
    #[arg(long)]
    list_metrics: bool,
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn eval_config(&self) -> Result<EvalConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config_from_path(path)?,
            None => EvalConfig::default(),
        };
        if let Some(v) = self.max_gain {
            config.bounds.max_gain = v;
        }
        if let Some(v) = self.min_gain {
            config.bounds.min_gain = v;
        }
        if let Some(v) = self.max_cost {
            config.bounds.max_cost = v;
        }
        if let Some(v) = self.min_cost {
            config.bounds.min_cost = v;
        }
        if let Some(v) = self.max_depth {
            config.bounds.depth = v;
        }
        if let Some(v) = self.format {
            config.format = v;
        }
        config.residuals |= self.residuals;
        config.colnames |= self.colnames;
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = MetricRegistry::default();
    if cli.list_metrics {
        for name in registry.list() {
            println!("{name}");
        }
        return Ok(());
    }

    let (Some(gain_file), Some(result_file)) = (cli.gain_file.clone(), cli.result_file.clone())
    else {
        return Err("gain_file and result_file are required".into());
    };
    let request = EvalRequest {
        gain_file,
        result_file,
        cost_file: cli.cost_file.clone(),
        metrics_file: cli.metrics_file.clone(),
        bib_file: cli.bib_file.clone(),
        config: cli.eval_config()?,
    };

    let out: Box<dyn Write> = match &cli.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let summary = run_evaluation(&request, &registry, out)?;
    tracing::info!(topics = summary.topics, rows = summary.rows, "done");
    Ok(())
}
