//! Result printing and the no-argument quickstart banner.
//!
//! `print_classical`/`print_quantum` mirror the shot-count table and
//! timing summary a thin quantum CLI prints after a run; `print_compiled_only`
//! backs `--nosim`, which compiles without executing.

use std::path::Path;

use arvak_compile::PassManagerBuilder;
use arvak_ir::Circuit;
use arvak_session::{CellResult, InputFormat, Placement, Source};

use crate::Cli;

pub fn print_quickstart() {
    println!(
        r#"Arvak — Rust-native quantum compilation and orchestration

Usage: arvak [OPTIONS] [INPUT_CIRCUIT]

Quick start:
  arvak circuit.qasm              run circuit.qasm on the local simulator
  arvak -x kernel.xasm             run an XASM kernel
  arvak --random 4 -q 4            run a synthesised 4-qubit circuit
  arvak --nosim -q 2 bell.qasm     compile only, print the transpiled circuit

Run `arvak --help` for the full flag list."#
    );
}

pub fn print_classical(result: &CellResult) {
    println!("--- measurement counts ---");
    let mut entries: Vec<(&String, &u64)> = result.counts.raw().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (bitstring, count) in entries {
        println!("{bitstring}: {count}");
    }
    if result.partial {
        println!("(partial result: fewer shots were accumulated than requested)");
    }
}

pub fn print_quantum(result: &CellResult) {
    println!("--- <Z> expectation values ---");
    for (qubit, z) in result.expectation_z.iter().enumerate() {
        println!("q[{qubit}]: {z:.6}");
    }
    if let Some(ms) = result.execution_time_ms {
        println!("execution time: {ms:.3} ms");
    }
    if let Some(ms) = result.queue_time_ms {
        println!("queue time: {ms:.3} ms");
    }
    if let Some(divergence) = result.jensen_shannon_divergence {
        println!("Jensen-Shannon divergence: {divergence:.6}");
    }
}

/// `--nosim`: resolve and compile a circuit without handing it to a backend.
pub fn print_compiled_only(cli: &Cli, source: Source, input_format: InputFormat) -> anyhow::Result<i32> {
    let circuit = resolve_source(source, input_format)?;

    let placement = if cli.noplacement { Placement::None } else { Placement::Swap };
    let mut builder = PassManagerBuilder::new().with_placement(placement);
    if cli.optimise {
        builder = builder.with_optimization_level(2);
    } else {
        builder = builder.with_optimization_level(0);
    }
    let (manager, mut properties) = builder.build();

    let mut dag = circuit.dag().clone();
    manager.run(&mut dag, &mut properties)?;
    let compiled = Circuit::from_dag(dag);

    let qasm = arvak_qasm3::emit(&compiled)?;
    println!("--- compiled circuit ---");
    print!("{qasm}");

    Ok(0)
}

fn resolve_source(source: Source, input_format: InputFormat) -> anyhow::Result<Circuit> {
    match source {
        Source::Random { num_qubits } => Ok(Circuit::ghz(num_qubits)?),
        Source::Ir(circuit) => Ok((*circuit).clone()),
        Source::Text(text) => Ok(parse_text(&text, input_format)?),
        Source::FilePath(path) => Ok(parse_text(&read_file(&path)?, input_format)?),
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

fn parse_text(text: &str, format: InputFormat) -> Result<Circuit, arvak_qasm3::ParseError> {
    match format {
        InputFormat::OpenQasm => arvak_qasm3::parse(text),
        InputFormat::Xasm => arvak_qasm3::parse_xasm(text),
        InputFormat::Quil => arvak_qasm3::parse_quil(text),
    }
}
