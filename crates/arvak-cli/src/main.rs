//! Arvak Command-Line Interface
//!
//! ```text
//! ↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙→↗↗↑↑↑↗↑↑↑↑↗↗↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙
//! ↙↗↗↗↗↗↗↗↗↗↗↗↗↗↗→↗↘↓↗↑↑↑↑↖↖          ←↑↑↑↑↑↗↘↙↘→→↗↗↗↗↗↗↗↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗↗↗↗↗↗↗↗→→↗↑↑↑↑                      ↑↑↑↑↗↓↓→→→→↗↗↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗→→→↗→→↑↑↑↑                 ↑↑↑↑↑       ↑↑↗↓↘↗→→→↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗→↗↗→↘↗↑↑                   ↑↑↗↑↑↑↑↑↑↑←    ↑↑↑↗→↗↗→→↗↗↗↗↙
//! ↙↗↗↗↗↗↗↗→↑↑↑                 ↖↙↓ ↑↑↑↑↑→→↑↑→↑↑↑     ↑↑↗↓→→↗↗↗↗↙
//! ↙↗↗↗→→↘↗↑          ↙↘↑↑↑↗→→→→→→→→→→→→→→→↗↗→↑→↑↑     ↑↑↘→→↗↗↗↙
//! ↙↗→→→→↓↗↑    ←↑→→→→→→→→→→→→→→→↑↑→→→→→→→→↑↑↑↗→↑→→↑     ↑↑→→↗↗↗↙
//! ↙↗↗↗↗→↑↑    ↗→↑↑→→→→→→→→→→→→→→→→→→→→→→→→→→↑↑→→↑→↑↑     ↑↑↓→↗↗↙
//! ↙↗↗→↓↑↑    ↙→→↑→→→→→→→→→→→→→→→→→→→→→→→→→→→→→↑→↑→→↑↑     ↑↑↓↗↗↙
//! ↙↗→↓↑↑    ↙↑→→→→→→→→→→→→→→→→→→→→→→→→→→→→→→→→→↑↑↗→→→↑     ↑→→↗↙
//! ↙↗→↘↑             ↑→→→→→→→→→→→→→→→→→→→→→→→→→→→↑↑→→↑↑     ↑↑↓↗↙
//! ↙→↓↑↑       ↑↑↑↑↑↑↑→→→→→→→→→→→→→→→→→→→→→→→→→→→↑↑→→↑↑↑     ↑↙→↙
//! ↙→→↑         ↑↑→→→→↑↑→↗↑↑↑→→→→→→→→→↑→→→→→→→→→→↑↑→→→↑     ↑↗↘↙
//! ↙→↑↑             ↖        ↑↑↗→→→↑↑↑↗→→→→→→→→→→→↑→→↑→↑     ↗↑↓↙
//! ↙↙↑                          ↑↑↑→→→→→→→→→→→→→→→↑↑→↗↑↑↑     ↑↙↙
//! ↙↙↑                          ↑↑→→→→→→→→→→→→→→→→↑↑→→↑→↑     ↑↙↙
//! ↙↙↑                          ↑→→→→→→→→→→→→→→→→→↑↑↗→→↑↑     ↑↙↙
//! ↙↓↑                         ←↑→→→→→→→→→→→→→→→→→↑↑↑→→↑↑    ↑↑↙↙
//! ↙↙↑                         ↑→→→→→→→→→→→→→→→→→→↗↑↑↑→→↑    ↑↗↘↙
//! ↙↙↑                        ↑→→→→→→→→→→→→→→→→→→→→↑→↑↑↑     ↑↙→↙
//! ↙↘↗↑                      ↑→→→→→→→→→→→→→→→→→→→→↑↑        ↑↑→→↙
//! ↙→↙↑↑                    ↑→→→→→→→→→→→→→→→→→→↑↑           ↑↙↗→↙
//! ↙↗→↓↑                   ↑↑→→→→→→→→→→→→→→→→↑↙            ↑↑→↗→↙
//! ↙→→↓↑↑                  ↑→→→→→→→→→→→→→→↑↑              ↑↑↙→→↗↙
//! ↙↗↗→↓↑↑                ↑↑→→→→→→→→→→→↑↑↖               ↑↑↓→↗↗↗↙
//! ↙↗↗↗↗↘↗↑↓              ↑↑→→→→→→→→→↑↙                ↑↑↗↘→→→↗↗↙
//! ↙↗↗→↗→↓→↑↑             ↑↑→→→→→→↑↑                  ↑↑↘↓→→↗↗↗↗↙
//! ↙↗↗↗↗↗↗→↓↗↑↑            ↑→→→↗↑                   ↑↑→↓↓→↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗→→↗↘↘↑↑↖          ↑→↑↑                   ↑↑↗↙→↗↗↗↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗↗↗↗↗→↓↘↑↑↑        ↑↑                   ↑↑↗↓↓→→→→↗↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗↗→→→↗→↘↓↓↗↑↑↑←                     ↑↑↑↑↘↙↓→↗↗↗↗↗↗↗↗↗↗↗↗↙
//! ↙↗↗↗↗↗↗↗↗↗↗↗↗↗→↘↙↓↑↑↑↑↑↗           ↖↑↑↑↑↗↓↓↓→↗↗↗↗↗↗↗↗↗↗↗↗↗↗↗↙
//! ↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙→↗↑↑↑↑↑↑↑↑↑↑→↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙↙
//!
//!                    A R V A K
//!          Rust-Native Quantum Compilation
//!              for HPC Environments
//!
//!            "Swift as the eternal steeds"
//! ```

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::style;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use arvak_adapter_sim::SimulatorBackend;
use arvak_compile::Placement;
use arvak_hal::Backend;
use arvak_session::{ErrorMitigation, InputFormat, RunConfig, Session, Source};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Exit code used when the input circuit file is missing.
const EXIT_MISSING_INPUT: i32 = 10;

/// Arvak - Rust-native quantum compilation and orchestration for HPC
#[derive(Parser)]
#[command(name = "arvak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Circuit source file (OpenQASM 3 by default; see --xasm/--quil1)
    input_circuit: Option<PathBuf>,

    /// Number of qubits to allocate (ignored if the input declares its own)
    #[arg(short = 'q', long = "qubits", default_value_t = 12)]
    qubits: u32,

    /// Number of measurement shots (0 requests the exact distribution)
    #[arg(short = 's', long = "shots", default_value_t = 1024)]
    shots: u64,

    /// Singular-value decomposition cutoff (MPS-class backends only)
    #[arg(long = "svd-cutoff", default_value_t = 1.0e-8)]
    svd_cutoff: f64,

    /// Maximum MPS bond dimension (MPS-class backends only)
    #[arg(long = "max-bond-dimension", default_value_t = 256)]
    max_bond_dimension: usize,

    /// Run a synthesised random circuit of this depth instead of a file
    #[arg(long = "random")]
    random: Option<u32>,

    /// Jensen-Shannon divergence threshold for the amplitude comparison
    #[arg(long = "threshold", default_value_t = 0.05)]
    threshold: f64,

    /// Accelerator/backend name (this build ships one local simulator backend)
    #[arg(long = "acc", default_value = "tnqvm-exatn-mps")]
    acc: String,

    /// Enable a default noise model during execution
    #[arg(short = 'n', long = "noise")]
    noise: bool,

    /// Parse the input as XASM (`__qpu__ void QBCIRCUIT(qbit q) { ... }`)
    #[arg(short = 'x', long = "xasm")]
    xasm: bool,

    /// Parse the input as Quil 1.0
    #[arg(long = "quil1")]
    quil1: bool,

    /// Skip qubit placement/routing
    #[arg(long = "noplacement")]
    noplacement: bool,

    /// Run circuit optimisation passes before execution
    #[arg(long = "optimise")]
    optimise: bool,

    /// Compile the circuit and print it without executing
    #[arg(long = "nosim")]
    nosim: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().count() == 1 {
        report::print_quickstart();
        return Ok(());
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    if cli.shots == 0 {
        println!("shots == 0: requesting the exact measurement distribution, nothing to sample.");
        return Ok(0);
    }

    let input_format = if cli.xasm {
        InputFormat::Xasm
    } else if cli.quil1 {
        InputFormat::Quil
    } else {
        InputFormat::OpenQasm
    };

    let source = if let Some(depth) = cli.random {
        tracing::info!(depth, "synthesising a random circuit; depth is accepted but not yet wired to a depth-parameterised sampler");
        Source::Random { num_qubits: cli.qubits }
    } else {
        match &cli.input_circuit {
            Some(path) => {
                if !path.is_file() {
                    eprintln!(
                        "{} input circuit file not found: {}",
                        style("Error:").red().bold(),
                        path.display()
                    );
                    return Ok(EXIT_MISSING_INPUT);
                }
                Source::FilePath(path.clone())
            }
            None => {
                eprintln!(
                    "{} no input circuit given (and --random was not set)",
                    style("Error:").red().bold()
                );
                return Ok(EXIT_MISSING_INPUT);
            }
        }
    };

    let acc = if cli.noise && cli.acc == "tnqvm-exatn-mps" {
        "aer".to_string()
    } else {
        cli.acc.clone()
    };
    if acc != "simulator" {
        tracing::warn!(
            requested = %acc,
            "this build ships one local backend ('simulator'); the requested accelerator name is recorded but not used for backend selection"
        );
    }
    if cli.svd_cutoff != 1.0e-8 || cli.max_bond_dimension != 256 {
        tracing::debug!("--svd-cutoff/--max-bond-dimension only affect MPS-class backends, none of which are present in this build");
    }

    if cli.nosim {
        return report::print_compiled_only(&cli, source, input_format);
    }

    let mut config = RunConfig::new(source, "simulator");
    config.num_qubits = cli.qubits;
    config.shots = cli.shots;
    config.noise_enabled = cli.noise;
    config.input_format = input_format;
    config.placement = if cli.noplacement { Placement::None } else { Placement::Swap };
    if cli.optimise {
        config.optimisation_passes = vec![
            "optimize_1q".to_string(),
            "cancel_cx".to_string(),
            "commutative_cancellation".to_string(),
        ];
    }
    config.error_mitigation = if cli.noise {
        ErrorMitigation::RoError
    } else {
        ErrorMitigation::None
    };

    let backend: Arc<dyn Backend> = Arc::new(SimulatorBackend::new());
    let session = Session::new(vec![backend]);
    session.set(0, 0, config);
    session.run().await?;

    let cell = session
        .get(0, 0)
        .expect("cell (0, 0) was just populated by run()");
    let result = cell
        .result
        .expect("run() returned Ok, so cell (0, 0) has a result");

    report::print_classical(&result);
    report::print_quantum(&result);

    let jsd_failed = result
        .jensen_shannon_divergence
        .is_some_and(|divergence| divergence.abs() > cli.threshold);

    Ok(if jsd_failed { 1 } else { 0 })
}
