//! XASM front-end (`-x`/`--xasm` input format): the QB SDK's
//! `__qpu__ void QBCIRCUIT(qbit q) { ... }` gate-call dialect.
//!
//! XASM's grammar is a flat list of `Name(args);` calls against a single
//! qubit register, so unlike the OpenQASM 3 front-end a hand-rolled
//! scanner is enough — there's no block/include/classical structure to
//! tokenize against. Composite macro calls that take non-qubit,
//! non-numeric arguments (e.g. `qft(q, {"nq",4})`'s settings map) are
//! out of scope; only gate calls over individual `q[N]` qubits are
//! recognised.

use arvak_ir::{Circuit, ClbitId, ParameterExpression, QubitId};

use crate::error::{ParseError, ParseResult};
use crate::expr::parse_expression;

struct Call {
    name: String,
    qubits: Vec<u32>,
    params: Vec<ParameterExpression>,
}

/// Parse an XASM kernel body into a `Circuit`.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let body = extract_body(source)?;

    let mut num_qubits = 0u32;
    let mut num_clbits = 0u32;
    let mut calls = Vec::new();

    for stmt in split_statements(&body) {
        let call = parse_call(&stmt)?;
        for &q in &call.qubits {
            num_qubits = num_qubits.max(q + 1);
        }
        if call.name.eq_ignore_ascii_case("measure") {
            if let Some(&q) = call.qubits.first() {
                num_clbits = num_clbits.max(q + 1);
            }
        }
        calls.push(call);
    }

    let mut circuit = Circuit::with_size("xasm_circuit", num_qubits.max(1), num_clbits);
    for call in &calls {
        lower_call(&mut circuit, call)?;
    }
    Ok(circuit)
}

fn extract_body(source: &str) -> ParseResult<String> {
    let stripped: String = source
        .lines()
        .map(strip_line_comment)
        .collect::<Vec<_>>()
        .join("\n");

    let open = stripped
        .find('{')
        .ok_or_else(|| ParseError::Generic("XASM source missing kernel body '{'".into()))?;
    let close = stripped
        .rfind('}')
        .ok_or_else(|| ParseError::Generic("XASM source missing kernel body '}'".into()))?;
    if close <= open {
        return Err(ParseError::Generic("malformed XASM kernel body".into()));
    }
    Ok(stripped[open + 1..close].to_string())
}

fn strip_line_comment(line: &str) -> &str {
    line.find("//").map_or(line, |idx| &line[..idx])
}

fn split_statements(body: &str) -> Vec<String> {
    body.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_args(src: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in src.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.clone());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        args.push(current);
    }
    args
}

/// Match a bare `q[N]` qubit reference — XASM has only one qubit register.
fn parse_qubit_ref(arg: &str) -> Option<u32> {
    let open = arg.find('[')?;
    let close = arg.find(']')?;
    if close <= open {
        return None;
    }
    arg[open + 1..close].trim().parse().ok()
}

fn parse_call(src: &str) -> ParseResult<Call> {
    let open = src
        .find('(')
        .ok_or_else(|| ParseError::Generic(format!("expected '(' in XASM statement: {src}")))?;
    let close = src
        .rfind(')')
        .ok_or_else(|| ParseError::Generic(format!("expected ')' in XASM statement: {src}")))?;
    if close <= open {
        return Err(ParseError::Generic(format!("malformed XASM statement: {src}")));
    }

    let name = src[..open].trim().to_string();
    let args_src = &src[open + 1..close];

    let mut qubits = Vec::new();
    let mut params = Vec::new();
    for arg in split_args(args_src) {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        if let Some(index) = parse_qubit_ref(arg) {
            qubits.push(index);
        } else {
            params.push(parse_expression(arg)?);
        }
    }

    Ok(Call { name, qubits, params })
}

fn require(cond: bool, gate: &str) -> ParseResult<()> {
    if cond {
        Ok(())
    } else {
        Err(ParseError::Generic(format!(
            "wrong argument count for '{gate}'"
        )))
    }
}

fn lower_call(circuit: &mut Circuit, call: &Call) -> ParseResult<()> {
    let qubits: Vec<QubitId> = call.qubits.iter().map(|&q| QubitId(q)).collect();
    let params = &call.params;

    match call.name.to_lowercase().as_str() {
        "i" => Ok(()),
        "x" => {
            for &q in &qubits {
                circuit.x(q)?;
            }
            Ok(())
        }
        "y" => {
            for &q in &qubits {
                circuit.y(q)?;
            }
            Ok(())
        }
        "z" => {
            for &q in &qubits {
                circuit.z(q)?;
            }
            Ok(())
        }
        "h" => {
            for &q in &qubits {
                circuit.h(q)?;
            }
            Ok(())
        }
        "s" => {
            for &q in &qubits {
                circuit.s(q)?;
            }
            Ok(())
        }
        "sdg" => {
            for &q in &qubits {
                circuit.sdg(q)?;
            }
            Ok(())
        }
        "t" => {
            for &q in &qubits {
                circuit.t(q)?;
            }
            Ok(())
        }
        "tdg" => {
            for &q in &qubits {
                circuit.tdg(q)?;
            }
            Ok(())
        }
        "rx" => {
            require(params.len() == 1, "Rx")?;
            for &q in &qubits {
                circuit.rx(params[0].clone(), q)?;
            }
            Ok(())
        }
        "ry" => {
            require(params.len() == 1, "Ry")?;
            for &q in &qubits {
                circuit.ry(params[0].clone(), q)?;
            }
            Ok(())
        }
        "rz" => {
            require(params.len() == 1, "Rz")?;
            for &q in &qubits {
                circuit.rz(params[0].clone(), q)?;
            }
            Ok(())
        }
        "cnot" | "cx" => {
            require(qubits.len() == 2, "CNOT")?;
            circuit.cx(qubits[0], qubits[1])?;
            Ok(())
        }
        "cz" => {
            require(qubits.len() == 2, "CZ")?;
            circuit.cz(qubits[0], qubits[1])?;
            Ok(())
        }
        "cy" => {
            require(qubits.len() == 2, "CY")?;
            circuit.cy(qubits[0], qubits[1])?;
            Ok(())
        }
        "ch" => {
            require(qubits.len() == 2, "CH")?;
            circuit.ch(qubits[0], qubits[1])?;
            Ok(())
        }
        "swap" => {
            require(qubits.len() == 2, "Swap")?;
            circuit.swap(qubits[0], qubits[1])?;
            Ok(())
        }
        "ccx" | "toffoli" | "ccnot" => {
            require(qubits.len() == 3, "CCX")?;
            circuit.ccx(qubits[0], qubits[1], qubits[2])?;
            Ok(())
        }
        "cswap" | "fredkin" => {
            require(qubits.len() == 3, "CSwap")?;
            circuit.cswap(qubits[0], qubits[1], qubits[2])?;
            Ok(())
        }
        "measure" => {
            require(qubits.len() == 1, "Measure")?;
            circuit.measure(qubits[0], ClbitId(qubits[0].0))?;
            Ok(())
        }
        other => Err(ParseError::UnknownGate(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bell_kernel() {
        let source = r"
            __qpu__ void QBCIRCUIT(qbit q) {
                H(q[0]);
                CNOT(q[0],q[1]);
                Measure(q[0]);
                Measure(q[1]);
            }
        ";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.dag().num_ops(), 4);
    }

    #[test]
    fn test_parse_rotation_angles() {
        let source = r"
            __qpu__ void QBCIRCUIT(qbit q) {
                Rx(q[0], 0.125*pi);
                Ry(q[0], 0.25*pi);
                Rz(q[0], 0.5*pi);
                Measure(q[0]);
            }
        ";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 1);
        assert_eq!(circuit.dag().num_ops(), 4);
    }

    #[test]
    fn test_unknown_gate_rejected() {
        let source = r"
            __qpu__ void QBCIRCUIT(qbit q) {
                Frobnicate(q[0]);
            }
        ";
        assert!(parse(source).is_err());
    }

    #[test]
    fn test_missing_body_rejected() {
        assert!(parse("not xasm at all").is_err());
    }
}
