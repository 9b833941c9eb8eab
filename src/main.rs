//! attoprop CLI
//!
//! # Commands
//!
//! - `attoprop [prove]` - Read a formula from stdin and print a proof of it (or of its negation)
//!   from a minimal set of hypotheses, or `:(` if there is none
//! - `attoprop check` - Read `hypotheses |- conclusion` followed by proof lines from stdin and
//!   print every line with its justification, or `Proof is incorrect`

use anyhow::{Context, Result};
use attoprop::{
    annotate, error::SynthesisError, prove, AnnotatedProof, Formatter, Strategy, Variables,
};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attoprop")]
#[command(about = "Proves propositional formulas from minimal hypotheses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Only print the lines the conclusion depends on
    #[arg(short, long, global = true)]
    minimize: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prove a formula read from stdin (default)
    Prove {
        /// Only assume variables to be true for the formula and false for its negation
        #[arg(long)]
        uniform: bool,
    },
    /// Check a proof read from stdin
    Check,
}

fn print_proof(fmt: &Formatter, proof: AnnotatedProof, minimize: bool) -> Result<()> {
    let proof = if minimize { proof.minimize() } else { proof };
    let mut s = String::new();
    fmt.format_proof(&mut s, &proof);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(s.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn prove_formula(strategy: Strategy, minimize: bool) -> Result<()> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read the formula")?;
    let mut fmt = Formatter::new();
    let formula = fmt.parse_expression(&line)?;
    let variables = Variables::collect(&formula)?;
    info!(variables = variables.len(), "parsed formula");

    let synthesis = match prove(&formula, &variables, strategy) {
        Ok(synthesis) => synthesis,
        Err(SynthesisError::NoHypotheses) => {
            println!(":(");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let proof = synthesis
        .annotate()
        .context("synthesized proof does not check")?;
    print_proof(&fmt, proof, minimize)
}

fn check_proof(minimize: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let header = lines.next().context("missing sequent")??;
    let mut fmt = Formatter::new();
    let sequent = fmt
        .parse_sequent(&header)
        .context("failed to parse the sequent")?;

    let mut proof = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let expression = fmt
            .parse_expression(&line)
            .with_context(|| format!("failed to parse input line {}", i + 2))?;
        proof.push(expression);
    }

    match annotate(sequent, proof) {
        Ok(proof) => print_proof(&fmt, proof, minimize),
        Err(e) => {
            info!(%e, "proof rejected");
            println!("Proof is incorrect");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Prove { uniform: false }) {
        Commands::Prove { uniform } => {
            let strategy = if uniform {
                Strategy::Uniform
            } else {
                Strategy::Mixed
            };
            prove_formula(strategy, cli.minimize)
        }
        Commands::Check => check_proof(cli.minimize),
    }
}
