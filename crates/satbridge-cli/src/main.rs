//! satbridge command-line client.
//!
//! Provides the `satbridge` binary. The `solve` subcommand runs one formula
//! through the same stage/invoke/interpret pipeline the HTTP server uses,
//! without going through HTTP.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use satbridge_solver::{FormulaRequest, InputMode, SolvePipeline, SolverConfig, Verdict};

/// Exit status when the solver produced a verdict.
const EXIT_VERDICT: i32 = 0;
/// Exit status for staging, launch, timeout or solver failures.
const EXIT_SOLVER_ERROR: i32 = 1;
/// Exit status when the formula itself could not be read.
const EXIT_IO_ERROR: i32 = 2;

/// Front end for an external SAT/LTL solver.
#[derive(Parser)]
#[command(name = "satbridge", about = "Run formulas through an external SAT/LTL solver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Solve one formula and print its verdict.
    Solve {
        /// Formula file, or `-` to read from stdin.
        input: PathBuf,

        /// Solver executable.
        #[arg(short, long, env = "SATBRIDGE_SOLVER_PATH", default_value = "LTLSolver")]
        solver: PathBuf,

        /// Extra solver argument, placed before the staged input (repeatable).
        #[arg(long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,

        /// How the formula reaches the solver: argument or stdin.
        #[arg(long, env = "SATBRIDGE_INPUT_MODE", default_value = "argument")]
        input_mode: InputMode,

        /// Time bound for the solver run, in milliseconds.
        #[arg(short, long, env = "SATBRIDGE_TIMEOUT_MS", default_value_t = 30_000)]
        timeout_ms: u64,

        /// Directory for staged artifacts (default: $TMPDIR/satbridge).
        #[arg(long, env = "SATBRIDGE_STAGING_DIR")]
        staging_dir: Option<PathBuf>,

        /// Exit status the solver uses on successful completion.
        #[arg(long, env = "SATBRIDGE_SUCCESS_EXIT_CODE", default_value_t = 0)]
        success_exit_code: i32,

        /// File extension for staged artifacts; empty for none.
        #[arg(long, env = "SATBRIDGE_ARTIFACT_EXTENSION", default_value = "cnf")]
        artifact_extension: String,

        /// Print a JSON object instead of the bare verdict.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satbridge_solver=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            input,
            solver,
            args,
            input_mode,
            timeout_ms,
            staging_dir,
            success_exit_code,
            artifact_extension,
            json,
        } => {
            let defaults = SolverConfig::default();
            let config = SolverConfig {
                executable: solver,
                args,
                input_mode,
                timeout_ms,
                staging_dir: staging_dir.unwrap_or(defaults.staging_dir),
                success_exit_code,
                artifact_extension,
            };
            let exit_code = run_solve(&input, &config, json).await;
            process::exit(exit_code);
        }
    }
}

/// Execute the solve subcommand.
///
/// Returns exit code: 0 = verdict printed, 1 = solver error, 2 = I/O error.
async fn run_solve(input: &Path, config: &SolverConfig, json: bool) -> i32 {
    let text = match read_formula(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read formula '{}': {}", input.display(), e);
            return EXIT_IO_ERROR;
        }
    };

    let pipeline = SolvePipeline::from_config(config);
    let report = pipeline.solve(&FormulaRequest::new(text)).await;

    if json {
        let mut body = serde_json::json!({
            "outputText": report.verdict.label(),
            "elapsedMs": report.elapsed_ms,
        });
        if let Verdict::Error(reason) = &report.verdict {
            body["error"] = serde_json::json!({
                "message": reason.to_string(),
                "reason": reason,
            });
        }
        println!("{}", body);
    }

    match &report.verdict {
        Verdict::Satisfiable | Verdict::Unsatisfiable => {
            if !json {
                println!("{}", report.verdict.label());
            }
            EXIT_VERDICT
        }
        Verdict::Error(reason) => {
            eprintln!("Error: {}", reason);
            EXIT_SOLVER_ERROR
        }
    }
}

/// Reads the formula as raw bytes; the solver decides what they mean.
fn read_formula(input: &Path) -> std::io::Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut text = Vec::new();
        std::io::stdin().read_to_end(&mut text)?;
        Ok(text)
    } else {
        std::fs::read(input)
    }
}
