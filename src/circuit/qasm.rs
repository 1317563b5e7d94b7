//! OpenQASM 2.0 reading and writing.

use super::expr;
use super::{check_unit_count, Circuit, CircuitError, Command, Register, UnitId};
use std::f64::consts::PI;
use std::sync::OnceLock;

use regex::Regex;

pub const MEASURE: &str = "Measure";
pub const BARRIER: &str = "Barrier";
pub const RESET: &str = "Reset";

/// A `qelib1.inc` gate and the TKET operation it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSpec {
    pub qasm: &'static str,
    pub op_type: &'static str,
    pub params: usize,
    pub qubits: usize,
}

const fn gate(qasm: &'static str, op_type: &'static str, params: usize, qubits: usize) -> GateSpec {
    GateSpec {
        qasm,
        op_type,
        params,
        qubits,
    }
}

/// Supported gates. When several QASM names map to one operation, the first
/// listed is used for output.
pub const GATES: &[GateSpec] = &[
    gate("id", "noop", 0, 1),
    gate("x", "X", 0, 1),
    gate("y", "Y", 0, 1),
    gate("z", "Z", 0, 1),
    gate("h", "H", 0, 1),
    gate("s", "S", 0, 1),
    gate("sdg", "Sdg", 0, 1),
    gate("t", "T", 0, 1),
    gate("tdg", "Tdg", 0, 1),
    gate("sx", "SX", 0, 1),
    gate("sxdg", "SXdg", 0, 1),
    gate("rx", "Rx", 1, 1),
    gate("ry", "Ry", 1, 1),
    gate("rz", "Rz", 1, 1),
    gate("u1", "U1", 1, 1),
    gate("p", "U1", 1, 1),
    gate("u2", "U2", 2, 1),
    gate("u3", "U3", 3, 1),
    gate("u", "U3", 3, 1),
    gate("cx", "CX", 0, 2),
    gate("CX", "CX", 0, 2),
    gate("cy", "CY", 0, 2),
    gate("cz", "CZ", 0, 2),
    gate("ch", "CH", 0, 2),
    gate("swap", "SWAP", 0, 2),
    gate("crx", "CRx", 1, 2),
    gate("cry", "CRy", 1, 2),
    gate("crz", "CRz", 1, 2),
    gate("cu1", "CU1", 1, 2),
    gate("cu3", "CU3", 3, 2),
    gate("rzz", "ZZPhase", 1, 2),
    gate("ccx", "CCX", 0, 3),
    gate("cswap", "CSWAP", 0, 3),
];

pub fn gate_by_name(name: &str) -> Option<&'static GateSpec> {
    GATES.iter().find(|g| g.qasm == name)
}

pub fn gate_by_op(op_type: &str) -> Option<&'static GateSpec> {
    GATES.iter().find(|g| g.op_type == op_type)
}

fn ident_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex literal"))
}

fn register_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(qreg|creg)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*([0-9]+)\s*\]$")
            .expect("valid regex literal")
    })
}

fn unit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\[\s*([0-9]+)\s*\])?$").expect("valid regex literal")
    })
}

fn application_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\((.*)\))?\s*([^()]*)$").expect("valid regex literal")
    })
}

/// A statement with the line it starts on.
struct Statement {
    line: usize,
    text: String,
    /// False for trailing text with no closing `;`.
    terminated: bool,
}

/// Split source into `;`-terminated statements, dropping `//` comments.
fn statements(source: &str) -> Vec<Statement> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut start_line = 1;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let code = raw_line.split("//").next().unwrap_or_default();

        for piece in code.split_inclusive(';') {
            if current.trim().is_empty() {
                start_line = line_no;
            }
            match piece.strip_suffix(';') {
                Some(body) => {
                    current.push_str(body);
                    let text = current.trim().to_string();
                    if !text.is_empty() {
                        out.push(Statement {
                            line: start_line,
                            text,
                            terminated: true,
                        });
                    }
                    current.clear();
                }
                None => {
                    current.push_str(piece);
                    current.push(' ');
                }
            }
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        out.push(Statement {
            line: start_line,
            text: rest.to_string(),
            terminated: false,
        });
    }

    out
}

fn first_word(text: &str) -> &str {
    text.split(|c: char| c.is_whitespace() || c == '(' || c == '{')
        .next()
        .unwrap_or_default()
}

/// Parse an OpenQASM 2.0 program.
pub fn parse_qasm(source: &str) -> Result<Circuit, CircuitError> {
    let mut circuit = Circuit::new();

    for (position, stmt) in statements(source).into_iter().enumerate() {
        let line = stmt.line;
        let text = stmt.text.as_str();
        let keyword = first_word(text);

        if !stmt.terminated && !matches!(keyword, "gate" | "opaque" | "if") {
            return Err(parse_error(line, format!("missing ';' after '{}'", text)));
        }

        match keyword {
            "OPENQASM" => {
                let version = text["OPENQASM".len()..].trim();
                if position != 0 {
                    return Err(parse_error(line, "OPENQASM header must come first"));
                }
                if !version.starts_with('2') {
                    return Err(CircuitError::Unsupported {
                        line,
                        construct: format!("OPENQASM {}", version),
                    });
                }
            }
            "include" => {}
            "qreg" | "creg" => declare_register(&mut circuit, line, text)?,
            "gate" | "opaque" | "if" => {
                return Err(CircuitError::Unsupported {
                    line,
                    construct: keyword.to_string(),
                })
            }
            "measure" => {
                let operands = text["measure".len()..].trim();
                let (qubit, bit) = operands
                    .split_once("->")
                    .ok_or_else(|| parse_error(line, "expected 'measure a -> b'"))?;
                let qubit = resolve_unit(&circuit, line, qubit, UnitKind::Qubit)?;
                let bit = resolve_unit(&circuit, line, bit, UnitKind::Bit)?;
                circuit.commands.push(Command {
                    op_type: MEASURE.to_string(),
                    params: Vec::new(),
                    args: vec![qubit, bit],
                });
            }
            "barrier" | "reset" => {
                let args = resolve_units(&circuit, line, &text[keyword.len()..])?;
                let op_type = if keyword == "barrier" { BARRIER } else { RESET };
                if op_type == RESET && args.len() != 1 {
                    return Err(parse_error(line, "reset takes one qubit"));
                }
                circuit.commands.push(Command {
                    op_type: op_type.to_string(),
                    params: Vec::new(),
                    args,
                });
            }
            _ => {
                let command = parse_application(&circuit, line, text)?;
                circuit.commands.push(command);
            }
        }
    }

    Ok(circuit)
}

fn parse_error(line: usize, message: impl Into<String>) -> CircuitError {
    CircuitError::Parse {
        line,
        message: message.into(),
    }
}

fn declare_register(circuit: &mut Circuit, line: usize, text: &str) -> Result<(), CircuitError> {
    let caps = register_pattern()
        .captures(text)
        .ok_or_else(|| parse_error(line, format!("malformed register declaration '{}'", text)))?;
    let name = caps[2].to_string();
    let size: u32 = caps[3]
        .parse()
        .map_err(|_| parse_error(line, format!("register size '{}' out of range", &caps[3])))?;

    if circuit.qreg(&name).is_some() || circuit.creg(&name).is_some() {
        return Err(parse_error(line, format!("register '{}' declared twice", name)));
    }

    let register = Register { name, size };
    let registers = if &caps[1] == "qreg" {
        &mut circuit.qregs
    } else {
        &mut circuit.cregs
    };
    registers.push(register);
    check_unit_count(registers).map_err(|e| parse_error(line, e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Qubit,
    Bit,
}

fn resolve_units(circuit: &Circuit, line: usize, text: &str) -> Result<Vec<UnitId>, CircuitError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(parse_error(line, "expected at least one qubit"));
    }
    text.split(',')
        .map(|arg| resolve_unit(circuit, line, arg, UnitKind::Qubit))
        .collect()
}

fn resolve_unit(
    circuit: &Circuit,
    line: usize,
    text: &str,
    kind: UnitKind,
) -> Result<UnitId, CircuitError> {
    let text = text.trim();
    let caps = unit_pattern()
        .captures(text)
        .ok_or_else(|| parse_error(line, format!("malformed argument '{}'", text)))?;
    let name = &caps[1];

    let register = match kind {
        UnitKind::Qubit => circuit.qreg(name),
        UnitKind::Bit => circuit.creg(name),
    }
    .ok_or_else(|| parse_error(line, format!("undeclared register '{}'", name)))?;

    let Some(index) = caps.get(2) else {
        return Err(CircuitError::Unsupported {
            line,
            construct: format!("register broadcast '{}'", name),
        });
    };
    let index: u32 = index
        .as_str()
        .parse()
        .map_err(|_| parse_error(line, format!("index out of range in '{}'", text)))?;
    if index >= register.size {
        return Err(parse_error(
            line,
            format!("index {} out of range for register '{}' of size {}", index, name, register.size),
        ));
    }

    Ok(UnitId::new(name, index))
}

fn parse_application(circuit: &Circuit, line: usize, text: &str) -> Result<Command, CircuitError> {
    let caps = application_pattern()
        .captures(text)
        .ok_or_else(|| parse_error(line, format!("malformed statement '{}'", text)))?;
    let name = &caps[1];

    let spec = gate_by_name(name).ok_or_else(|| CircuitError::UnknownGate {
        line,
        name: name.to_string(),
    })?;

    let params: Vec<f64> = match caps.get(2) {
        Some(list) if !list.as_str().trim().is_empty() => list
            .as_str()
            .split(',')
            .map(|p| {
                expr::evaluate(p)
                    .map(|radians| radians / PI)
                    .map_err(|e| parse_error(line, format!("in parameter '{}': {}", p.trim(), e)))
            })
            .collect::<Result<_, _>>()?,
        _ => Vec::new(),
    };
    if params.len() != spec.params {
        return Err(parse_error(
            line,
            format!("gate '{}' takes {} parameters, got {}", name, spec.params, params.len()),
        ));
    }

    let args = resolve_units(circuit, line, &caps[3])?;
    if args.len() != spec.qubits {
        return Err(parse_error(
            line,
            format!("gate '{}' takes {} qubits, got {}", name, spec.qubits, args.len()),
        ));
    }
    for (i, a) in args.iter().enumerate() {
        if args[..i].contains(a) {
            return Err(parse_error(line, format!("qubit {} used twice in '{}'", a, name)));
        }
    }

    Ok(Command {
        op_type: spec.op_type.to_string(),
        params,
        args,
    })
}

/// Write a circuit as an OpenQASM 2.0 program.
pub fn serialize_qasm(circuit: &Circuit) -> Result<String, CircuitError> {
    let mut output = String::new();

    output.push_str("OPENQASM 2.0;\n");
    output.push_str("include \"qelib1.inc\";\n\n");

    for reg in &circuit.qregs {
        check_ident(&reg.name)?;
        output.push_str(&format!("qreg {}[{}];\n", reg.name, reg.size));
    }
    for reg in &circuit.cregs {
        check_ident(&reg.name)?;
        output.push_str(&format!("creg {}[{}];\n", reg.name, reg.size));
    }

    for command in &circuit.commands {
        output.push_str(&serialize_command(command)?);
        output.push('\n');
    }

    Ok(output)
}

fn check_ident(name: &str) -> Result<(), CircuitError> {
    if ident_pattern().is_match(name) {
        Ok(())
    } else {
        Err(CircuitError::Invalid(format!(
            "register name '{}' is not a valid identifier",
            name
        )))
    }
}

fn join_units(args: &[UnitId]) -> String {
    args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(",")
}

fn serialize_command(command: &Command) -> Result<String, CircuitError> {
    let args = &command.args;
    match command.op_type.as_str() {
        MEASURE => match args.as_slice() {
            [qubit, bit] => Ok(format!("measure {} -> {};", qubit, bit)),
            _ => Err(CircuitError::Invalid("Measure needs a qubit and a bit".to_string())),
        },
        BARRIER => Ok(format!("barrier {};", join_units(args))),
        RESET => Ok(format!("reset {};", join_units(args))),
        op_type => {
            let spec = gate_by_op(op_type)
                .ok_or_else(|| CircuitError::NotExpressible(op_type.to_string()))?;
            if command.params.len() != spec.params || args.len() != spec.qubits {
                return Err(CircuitError::Invalid(format!(
                    "{} expects {} parameters and {} qubits",
                    op_type, spec.params, spec.qubits
                )));
            }

            let mut text = spec.qasm.to_string();
            if !command.params.is_empty() {
                let params: Vec<String> =
                    command.params.iter().map(|p| format!("{}*pi", p)).collect();
                text.push_str(&format!("({})", params.join(",")));
            }
            text.push_str(&format!(" {};", join_units(args)));
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELL: &str = r#"OPENQASM 2.0;
include "qelib1.inc";

// Bell pair
qreg q[2];
creg c[2];
h q[0];
cx q[0],q[1];
rz(pi/2) q[1];
measure q[0] -> c[0];
measure q[1] -> c[1];
"#;

    #[test]
    fn test_parse_bell() {
        let circuit = parse_qasm(BELL).unwrap();

        assert_eq!(circuit.qubits().len(), 2);
        assert_eq!(circuit.bits().len(), 2);
        assert_eq!(circuit.commands.len(), 5);

        let ops: Vec<_> = circuit.commands.iter().map(|c| c.op_type.as_str()).collect();
        assert_eq!(ops, vec!["H", "CX", "Rz", "Measure", "Measure"]);
        assert_eq!(circuit.commands[2].params, vec![0.5]);
        assert_eq!(
            circuit.commands[1].args,
            vec![UnitId::new("q", 0), UnitId::new("q", 1)]
        );
        assert_eq!(circuit.commands[4].args[1], UnitId::new("c", 1));
    }

    #[test]
    fn test_multi_parameter_gate_and_barrier() {
        let source = "OPENQASM 2.0;\nqreg q[2];\nu3(pi, -pi/2, 0) q[0]; barrier q[0], q[1];\nreset q[1];";
        let circuit = parse_qasm(source).unwrap();

        assert_eq!(circuit.commands[0].op_type, "U3");
        assert_eq!(circuit.commands[0].params, vec![1.0, -0.5, 0.0]);
        assert_eq!(circuit.commands[1].op_type, BARRIER);
        assert_eq!(circuit.commands[1].args.len(), 2);
        assert_eq!(circuit.commands[2].op_type, RESET);
    }

    #[test]
    fn test_unsupported_constructs() {
        let gate_def = "OPENQASM 2.0;\nqreg q[1];\ngate g a { h a; }\ng q[0];";
        assert!(matches!(
            parse_qasm(gate_def),
            Err(CircuitError::Unsupported { line: 3, .. })
        ));

        let conditional = "OPENQASM 2.0;\nqreg q[1];\ncreg c[1];\nif(c==1) x q[0];";
        assert!(matches!(
            parse_qasm(conditional),
            Err(CircuitError::Unsupported { line: 4, .. })
        ));

        let broadcast = "OPENQASM 2.0;\nqreg q[2];\nh q;";
        assert!(matches!(
            parse_qasm(broadcast),
            Err(CircuitError::Unsupported { line: 3, .. })
        ));

        let qasm3 = "OPENQASM 3.0;";
        assert!(matches!(parse_qasm(qasm3), Err(CircuitError::Unsupported { .. })));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_qasm("qreg q[1];\nfoo q[0];"),
            Err(CircuitError::UnknownGate { line: 2, .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[1];\nh q[1];"),
            Err(CircuitError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[2];\ncx q[0];"),
            Err(CircuitError::Parse { .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[2];\ncx q[0],q[0];"),
            Err(CircuitError::Parse { .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[1];\nh q[0]"),
            Err(CircuitError::Parse { .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[1];\nrz(tau) q[0];"),
            Err(CircuitError::Parse { .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[4000000000];"),
            Err(CircuitError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_qasm("qreg a[1048576];\nqreg b[1];"),
            Err(CircuitError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_qasm("qreg q[99999999999];"),
            Err(CircuitError::Parse { .. })
        ));
    }

    #[test]
    fn test_serialize_qasm() {
        let circuit = parse_qasm(BELL).unwrap();
        let text = serialize_qasm(&circuit).unwrap();

        assert!(text.starts_with("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n"));
        assert!(text.contains("qreg q[2];\n"));
        assert!(text.contains("creg c[2];\n"));
        assert!(text.contains("cx q[0],q[1];\n"));
        assert!(text.contains("rz(0.5*pi) q[1];\n"));
        assert!(text.contains("measure q[1] -> c[1];\n"));

        assert_eq!(parse_qasm(&text).unwrap(), circuit);
    }

    #[test]
    fn test_serialize_rejects_unknown_op() {
        let mut circuit = parse_qasm("qreg q[1];").unwrap();
        circuit.commands.push(Command {
            op_type: "PhasedX".to_string(),
            params: vec![0.5, 0.5],
            args: vec![UnitId::new("q", 0)],
        });
        assert!(matches!(
            serialize_qasm(&circuit),
            Err(CircuitError::NotExpressible(_))
        ));
    }
}
