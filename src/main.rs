use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lookup_logic::script::{run_script, ScriptEvent};
use lookup_logic::{EngineConfig, LogicEngine, PoolConfig, SizeClass, DEFAULT_MAX_BRANCHES};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lookup-logic", about = "Build range formulas from token scripts and query them")]
struct Cli {
    /// Log every reduction (equivalent to RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Largest branch count a single merge may produce.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_BRANCHES)]
    max_branches: usize,

    /// Variable node capacity of the block pool.
    #[arg(long, global = true, default_value_t = PoolConfig::default().variable_capacity)]
    variable_capacity: usize,

    /// Operator node capacity of the block pool.
    #[arg(long, global = true, default_value_t = PoolConfig::default().operator_capacity)]
    operator_capacity: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a token script and print the final formula and query results.
    Run {
        /// Script file (one engine call per line).
        script: PathBuf,
    },
    /// Run a token script and report pool usage.
    Check {
        /// Script file (one engine call per line).
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = EngineConfig::default()
        .with_max_branches(cli.max_branches)
        .with_verbose(cli.verbose)
        .with_pool(
            PoolConfig::default()
                .with_capacity(SizeClass::Variable, cli.variable_capacity)
                .with_capacity(SizeClass::Operator, cli.operator_capacity),
        );

    match cli.command {
        Commands::Run { script } => run(script, config)?,
        Commands::Check { script } => check(script, config)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_and_run(path: &PathBuf, config: EngineConfig) -> Result<(LogicEngine, Vec<ScriptEvent>)> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let mut engine = LogicEngine::new(config).context("failed to initialize logic engine")?;
    let events = run_script(&mut engine, &source)
        .with_context(|| format!("script {} failed", path.display()))?;
    Ok((engine, events))
}

fn run(path: PathBuf, config: EngineConfig) -> Result<()> {
    let (engine, events) = load_and_run(&path, config)?;

    for event in &events {
        print_event(event);
    }

    match engine.root() {
        Some(root) => print!("{}", root),
        None if engine.is_empty() => println!("logic is empty"),
        None => println!("{} subtrees pending (missing reduce?)", engine.depth()),
    }

    Ok(())
}

fn check(path: PathBuf, config: EngineConfig) -> Result<()> {
    let (mut engine, events) = load_and_run(&path, config)?;

    println!(
        "ok: {} lines produced output, {} subtrees pending, {} nodes live",
        events.len(),
        engine.depth(),
        engine.nodes_in_use()
    );
    println!("{}", engine.pool_stats().report());

    engine.clear();
    let leaked = engine.allocator().leaked();
    if !leaked.is_empty() {
        for (class, slots) in &leaked {
            eprintln!("leak: {} {} block(s) at slots {:?}", slots.len(), class, slots);
        }
        anyhow::bail!("{} size class(es) leaked blocks", leaked.len());
    }

    Ok(())
}

fn print_event(event: &ScriptEvent) {
    match event {
        ScriptEvent::Resolved { line, name, range } => {
            println!(
                "line {}\t{}\t{}\t({} values)",
                line,
                name,
                range,
                range.cardinality()
            );
        }
        ScriptEvent::Printed { line, formula } => match formula {
            Some(text) => print!("line {}\n{}", line, text),
            None => println!("line {}\tlogic is empty", line),
        },
    }
}
