#![allow(non_snake_case)]
use RustedRAM::Examples::ram_examples::ram_examples;
use RustedRAM::Utils::logger::parse_loglevel;
use RustedRAM::numerical::RAM::{RamError, RamMethod};
use RustedRAM::numerical::RAM_task::RamTask;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// RAM calculator: area under f(x) = x^2 + 4x by left, right, midpoint or trapezoid sums
#[derive(Parser, Debug)]
#[command(name = "RustedRAM", version, about)]
struct Cli {
    /// initial point of the interval
    #[arg(long, allow_negative_numbers = true)]
    a: Option<f64>,
    /// final point of the interval
    #[arg(long, allow_negative_numbers = true)]
    b: Option<f64>,
    /// number of rectangles (or trapezoids)
    #[arg(short)]
    n: Option<usize>,
    /// LRAM, RRAM, MRAM or TRAM
    #[arg(short, long)]
    method: Option<String>,
    /// task file with "integration" and "postprocessing" sections
    #[arg(short, long)]
    task: Option<PathBuf>,
    /// where to draw the chart (.png or .svg)
    #[arg(long)]
    plot: Option<PathBuf>,
    #[arg(long)]
    no_plot: bool,
    /// save sample points and f values as csv
    #[arg(long)]
    csv: Option<PathBuf>,
    /// run a convergence study doubling n this many times
    #[arg(long)]
    convergence: Option<u32>,
    /// compare all four rules on the same interval
    #[arg(long)]
    compare: bool,
    #[arg(long)]
    loglevel: Option<String>,
    /// also write the log into log_<date>.txt
    #[arg(long)]
    log_file: bool,
    /// write a task file template and exit
    #[arg(long)]
    template: Option<PathBuf>,
    /// run one of the numbered usage examples and exit
    #[arg(long)]
    example: Option<usize>,
}

fn build_task(cli: Cli) -> Result<RamTask, RamError> {
    // the method name is checked before anything is read or computed
    let method = cli.method.as_deref().map(RamMethod::parse).transpose()?;
    let mut task = match &cli.task {
        Some(path) => RamTask::parse_file(path)?,
        None => RamTask::default(),
    };
    if let Some(method) = method {
        task.request.method = method;
    }
    if let Some(a) = cli.a {
        task.request.a = a;
    }
    if let Some(b) = cli.b {
        task.request.b = b;
    }
    if let Some(n) = cli.n {
        task.request.n = n;
    }
    let post = &mut task.postprocessing;
    if let Some(plot) = cli.plot {
        post.plot = true;
        post.plot_file = plot;
    }
    if cli.no_plot {
        post.plot = false;
    }
    if let Some(csv) = cli.csv {
        post.csv_file = Some(csv);
    }
    if let Some(doublings) = cli.convergence {
        post.convergence = Some(doublings);
    }
    if cli.compare {
        post.compare = true;
    }
    if let Some(level) = cli.loglevel {
        parse_loglevel(&level)?;
        post.loglevel = level;
    }
    if cli.log_file {
        post.log_to_file = true;
    }
    Ok(task)
}

fn run(cli: Cli) -> Result<(), RamError> {
    if let Some(example) = cli.example {
        ram_examples(example);
        return Ok(());
    }
    if let Some(path) = &cli.template {
        RamTask::create_template_file(path)?;
        println!("template written to {}", path.display());
        return Ok(());
    }
    let task = build_task(cli)?;
    let outcome = task.solve()?;
    if let Some(chart) = outcome.chart {
        println!("chart: {}", chart.display());
    }
    for path in outcome.saved {
        println!("saved: {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
