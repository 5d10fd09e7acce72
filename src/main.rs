//! u-harvest - timber-harvest planner
//!
//! Reads one instance record, plans it with the SAT-backed engine, and
//! prints the plan. Prints `UNSAT` and exits with status 1 when no plan
//! exists; exits with status 2 when the engine budget runs out.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use u_harvest::engine::{EngineConfig, LinearSearchEngine};
use u_harvest::generate::ContiguityKind;
use u_harvest::io::{format_plan, parse_instance};
use u_harvest::objective::ObjectiveForm;
use u_harvest::planner::{Infeasibility, PlanOutcome, Planner, PlannerConfig};

/// u-harvest - timber-harvest planner with a contiguous natural reserve
#[derive(Parser, Debug)]
#[command(name = "u-harvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Instance file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Engine wall-clock budget in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Engine budget in SAT solver calls
    #[arg(long)]
    node_limit: Option<u64>,

    /// Reserve contiguity encoding
    #[arg(long, value_enum, default_value_t = StrategyArg::Tree)]
    strategy: StrategyArg,

    /// Objective representation
    #[arg(long, value_enum, default_value_t = ObjectiveArg::SoftLiterals)]
    objective: ObjectiveArg,

    /// Write the model as weighted DIMACS CNF to this path
    #[arg(long)]
    export_wcnf: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Depth-labelled spanning tree (exact)
    Tree,
    /// Pairwise common-neighbour closure (incomplete)
    LocalClosure,
}

impl From<StrategyArg> for ContiguityKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Tree => ContiguityKind::SpanningTree,
            StrategyArg::LocalClosure => ContiguityKind::LocalClosure,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ObjectiveArg {
    /// Weighted soft literals plus an offset
    SoftLiterals,
    /// Linear sum over harvest variables
    Linear,
}

impl From<ObjectiveArg> for ObjectiveForm {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::SoftLiterals => ObjectiveForm::SoftLiterals,
            ObjectiveArg::Linear => ObjectiveForm::LinearSum,
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let text = read_input(cli.input.as_ref())?;
    let instance = parse_instance(&text).context("failed to parse instance")?;
    info!(
        units = instance.unit_count(),
        periods = instance.period_count(),
        amin = instance.min_reserve_area(),
        "instance loaded"
    );

    let mut engine = EngineConfig::default();
    if let Some(ms) = cli.time_limit_ms {
        engine = engine.with_time_limit(Duration::from_millis(ms));
    }
    if let Some(nodes) = cli.node_limit {
        engine = engine.with_node_limit(nodes);
    }
    let planner = Planner::new(
        PlannerConfig::default()
            .with_strategy(cli.strategy.into())
            .with_objective(cli.objective.into())
            .with_engine(engine),
    );

    if let Some(path) = &cli.export_wcnf {
        let built = planner.build_model(&instance)?;
        std::fs::write(path, built.to_wcnf()?.to_dimacs())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "exported WCNF");
    }

    match planner.plan(&instance, &LinearSearchEngine::new())? {
        PlanOutcome::Optimal(plan) => {
            print!("{}", format_plan(&plan));
            Ok(ExitCode::SUCCESS)
        }
        PlanOutcome::Infeasible(Infeasibility::Unsatisfiable) => {
            println!("UNSAT");
            Ok(ExitCode::FAILURE)
        }
        PlanOutcome::Infeasible(Infeasibility::EngineTimeout) => {
            eprintln!("engine budget exhausted before a plan was proven optimal");
            Ok(ExitCode::from(2))
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    run(&cli)
}
