//! Quil 1.0 front-end (`--quil1` input format).
//!
//! Quil's body is a flat, line-oriented instruction list (`GATE q...`,
//! `GATE(params) q...`, `MEASURE q [ro[n]]`) with no nested blocks, so it
//! parses the same way as the XASM front-end: line-by-line, reusing the
//! shared angle-expression evaluator. `DECLARE`/`PRAGMA`/`DEFGATE`/
//! `DEFCIRCUIT` directives are recognised and skipped — classical memory
//! declarations and custom gate/circuit definitions carry no information
//! this lowering needs or supports.

use arvak_ir::{Circuit, ClbitId, ParameterExpression, QubitId};

use crate::error::{ParseError, ParseResult};
use crate::expr::parse_expression;

enum Instr {
    Gate {
        name: String,
        params: Vec<ParameterExpression>,
        qubits: Vec<u32>,
    },
    Measure {
        qubit: u32,
        clbit: u32,
    },
}

/// Parse a Quil 1.0 program into a `Circuit`.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let mut num_qubits = 0u32;
    let mut num_clbits = 0u32;
    let mut instrs = Vec::new();

    for raw_line in source.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if is_skipped_directive(line) {
            continue;
        }

        let instr = parse_line(line)?;
        match &instr {
            Instr::Gate { qubits, .. } => {
                for &q in qubits {
                    num_qubits = num_qubits.max(q + 1);
                }
            }
            Instr::Measure { qubit, clbit } => {
                num_qubits = num_qubits.max(qubit + 1);
                num_clbits = num_clbits.max(clbit + 1);
            }
        }
        instrs.push(instr);
    }

    let mut circuit = Circuit::with_size("quil_circuit", num_qubits.max(1), num_clbits);
    for instr in &instrs {
        lower(&mut circuit, instr)?;
    }
    Ok(circuit)
}

fn strip_comment(line: &str) -> &str {
    line.find('#').map_or(line, |idx| &line[..idx])
}

fn is_skipped_directive(line: &str) -> bool {
    ["DECLARE", "PRAGMA", "DEFGATE", "DEFCIRCUIT"]
        .iter()
        .any(|keyword| line.starts_with(keyword))
}

fn parse_line(line: &str) -> ParseResult<Instr> {
    let mut tokens = line.split_whitespace();
    let head = tokens
        .next()
        .ok_or_else(|| ParseError::Generic("empty instruction".into()))?;

    if head.eq_ignore_ascii_case("MEASURE") {
        let qubit = tokens
            .next()
            .and_then(|t| t.parse::<u32>().ok())
            .ok_or_else(|| ParseError::Generic(format!("MEASURE missing qubit operand: {line}")))?;
        let clbit = match tokens.next() {
            Some(reference) => parse_memory_ref(reference)?,
            None => qubit,
        };
        return Ok(Instr::Measure { qubit, clbit });
    }

    let (name, params) = if let Some(paren) = head.find('(') {
        let close = head
            .rfind(')')
            .ok_or_else(|| ParseError::Generic(format!("unterminated '(' in {head}")))?;
        let name = head[..paren].to_string();
        let params = head[paren + 1..close]
            .split(',')
            .map(|p| parse_expression(p.trim()))
            .collect::<ParseResult<Vec<_>>>()?;
        (name, params)
    } else {
        (head.to_string(), Vec::new())
    };

    let qubits = tokens
        .map(|t| {
            t.parse::<u32>()
                .map_err(|_| ParseError::Generic(format!("invalid qubit index: {t}")))
        })
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(Instr::Gate { name, params, qubits })
}

fn parse_memory_ref(token: &str) -> ParseResult<u32> {
    if let Some(open) = token.find('[') {
        let close = token
            .find(']')
            .ok_or_else(|| ParseError::Generic(format!("malformed memory reference: {token}")))?;
        token[open + 1..close]
            .trim()
            .parse()
            .map_err(|_| ParseError::Generic(format!("invalid memory index: {token}")))
    } else {
        token
            .parse()
            .map_err(|_| ParseError::Generic(format!("invalid memory reference: {token}")))
    }
}

fn require(cond: bool, gate: &str) -> ParseResult<()> {
    if cond {
        Ok(())
    } else {
        Err(ParseError::Generic(format!(
            "wrong operand count for '{gate}'"
        )))
    }
}

fn lower(circuit: &mut Circuit, instr: &Instr) -> ParseResult<()> {
    match instr {
        Instr::Measure { qubit, clbit } => {
            circuit.measure(QubitId(*qubit), ClbitId(*clbit))?;
            Ok(())
        }
        Instr::Gate { name, params, qubits } => {
            let qubits: Vec<QubitId> = qubits.iter().map(|&q| QubitId(q)).collect();
            match name.to_uppercase().as_str() {
                "I" => Ok(()),
                "X" => {
                    for &q in &qubits {
                        circuit.x(q)?;
                    }
                    Ok(())
                }
                "Y" => {
                    for &q in &qubits {
                        circuit.y(q)?;
                    }
                    Ok(())
                }
                "Z" => {
                    for &q in &qubits {
                        circuit.z(q)?;
                    }
                    Ok(())
                }
                "H" => {
                    for &q in &qubits {
                        circuit.h(q)?;
                    }
                    Ok(())
                }
                "S" => {
                    for &q in &qubits {
                        circuit.s(q)?;
                    }
                    Ok(())
                }
                "T" => {
                    for &q in &qubits {
                        circuit.t(q)?;
                    }
                    Ok(())
                }
                "PHASE" => {
                    require(params.len() == 1, "PHASE")?;
                    for &q in &qubits {
                        circuit.p(params[0].clone(), q)?;
                    }
                    Ok(())
                }
                "RX" => {
                    require(params.len() == 1, "RX")?;
                    for &q in &qubits {
                        circuit.rx(params[0].clone(), q)?;
                    }
                    Ok(())
                }
                "RY" => {
                    require(params.len() == 1, "RY")?;
                    for &q in &qubits {
                        circuit.ry(params[0].clone(), q)?;
                    }
                    Ok(())
                }
                "RZ" => {
                    require(params.len() == 1, "RZ")?;
                    for &q in &qubits {
                        circuit.rz(params[0].clone(), q)?;
                    }
                    Ok(())
                }
                "CNOT" => {
                    require(qubits.len() == 2, "CNOT")?;
                    circuit.cx(qubits[0], qubits[1])?;
                    Ok(())
                }
                "CZ" => {
                    require(qubits.len() == 2, "CZ")?;
                    circuit.cz(qubits[0], qubits[1])?;
                    Ok(())
                }
                "SWAP" => {
                    require(qubits.len() == 2, "SWAP")?;
                    circuit.swap(qubits[0], qubits[1])?;
                    Ok(())
                }
                "CPHASE" => {
                    require(params.len() == 1 && qubits.len() == 2, "CPHASE")?;
                    circuit.cp(params[0].clone(), qubits[0], qubits[1])?;
                    Ok(())
                }
                "CCNOT" => {
                    require(qubits.len() == 3, "CCNOT")?;
                    circuit.ccx(qubits[0], qubits[1], qubits[2])?;
                    Ok(())
                }
                "CSWAP" => {
                    require(qubits.len() == 3, "CSWAP")?;
                    circuit.cswap(qubits[0], qubits[1], qubits[2])?;
                    Ok(())
                }
                other => Err(ParseError::UnknownGate(other.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bell_program() {
        let source = "H 0\nCNOT 0 1\nMEASURE 0 ro[0]\nMEASURE 1 ro[1]\n";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.dag().num_ops(), 4);
    }

    #[test]
    fn test_declare_and_pragma_skipped() {
        let source = "DECLARE ro BIT[2]\nPRAGMA INITIAL_REWIRING \"GREEDY\"\nH 0\nMEASURE 0 ro[0]\n";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.dag().num_ops(), 2);
    }

    #[test]
    fn test_parametric_gate_with_angle_expression() {
        let source = "RX(pi/4) 0\nMEASURE 0 0\n";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.dag().num_ops(), 2);
    }

    #[test]
    fn test_bare_measure_index_used_as_clbit() {
        let circuit = parse("MEASURE 0 0\n").unwrap();
        assert_eq!(circuit.num_clbits(), 1);
    }

    #[test]
    fn test_unknown_gate_rejected() {
        assert!(parse("FROBNICATE 0\n").is_err());
    }
}
