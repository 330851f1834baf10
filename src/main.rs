use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use abrewrite::{
    ConsoleSink, DEFAULT_MAX_STEPS, Program, RunConfig, resolve_program_path, run_with_sink,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rule file, or a program name looked up as code/<NAME>.ab
    #[arg(value_name = "PROGRAM")]
    program: String,

    /// Initial tape
    #[arg(value_name = "INPUT")]
    input: String,

    /// Show the rule applied at each step
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Maximum number of steps before the run is cut off
    #[arg(long = "maxloop", visible_alias = "max-steps", value_name = "N", default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Never colour the output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    let path = resolve_program_path(&cwd, &args.program)
        .with_context(|| format!("No rule file found for {}", args.program))?;
    let program = Program::load(&path)?;

    let config = RunConfig::default()
        .with_verbose(args.verbose)
        .with_max_steps(args.max_steps);
    let color = !args.no_color && io::stdout().is_terminal();
    let mut sink = ConsoleSink::stdout(color);

    let outcome = run_with_sink(&program, &args.input, &config, &mut sink);
    tracing::info!(
        termination = ?outcome.termination,
        steps = outcome.steps,
        "run complete"
    );
    sink.into_result().context("Failed to write output")?;
    Ok(())
}
