use std::path::PathBuf;

use clap::Parser;

use crate::config::resolve::{resolve_run_config, PathOverrides};
use crate::error::Result;
use crate::load::FileTally;
use crate::pipeline::{self, RunReport};
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "medgraph")]
#[command(
    about = "Build a drug-disease graph, its projections and summary tables from CSV",
    long_about = None
)]
pub struct Cli {
    /// TOML run configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Edge rows (drug_id, disease_id, subject_id[, admissions | admission_id])
    #[arg(long)]
    pub edges: Option<PathBuf>,
    /// Node attributes (node_id, type[, name, ...])
    #[arg(long)]
    pub nodes: Option<PathBuf>,
    /// Directory receiving the graphs and tables
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        output::disable_colors();
    }
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = resolve_run_config(
        cli.config,
        PathOverrides {
            edges: cli.edges,
            nodes: cli.nodes,
            outdir: cli.outdir,
        },
    )?;

    let report = pipeline::run(&config)?;
    print_report(&report, cli.quiet);
    Ok(())
}

fn print_report(report: &RunReport, quiet: bool) {
    if !quiet {
        for file in &report.written {
            output::wrote(&file.path);
        }
        output::info(&format!(
            "{} drugs, {} diseases, {} associations; {} disease pairs, {} drug pairs",
            report.drugs, report.diseases, report.associations, report.disease_pairs, report.drug_pairs
        ));
    }

    warn_skipped("nodes.csv", &report.load.nodes);
    warn_skipped("edges.csv", &report.load.edges);

    for file in report.written.iter().filter(|file| file.is_empty()) {
        output::warn(&format!("{} is empty", file.path.display()));
    }
}

fn warn_skipped(label: &str, tally: &FileTally) {
    if tally.skipped_total() == 0 {
        return;
    }
    let reasons = tally
        .skipped
        .iter()
        .map(|(reason, count)| format!("{count} {reason}"))
        .collect::<Vec<_>>()
        .join(", ");
    output::warn(&format!(
        "skipped {} of {} {} rows ({})",
        tally.skipped_total(),
        tally.rows,
        label,
        reasons
    ));
}
