//! TKET JSON serial form.

use super::expr;
use super::qasm::BARRIER;
use super::{
    check_unit_count, format_half_turns, Circuit, CircuitError, Command, Register, UnitId,
    MAX_UNITS,
};
use serde::{Deserialize, Serialize};

/// `["reg", [index, ...]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SerialUnit(String, Vec<u32>);

impl From<&UnitId> for SerialUnit {
    fn from(unit: &UnitId) -> Self {
        SerialUnit(unit.register.clone(), vec![unit.index])
    }
}

impl TryFrom<&SerialUnit> for UnitId {
    type Error = CircuitError;

    fn try_from(unit: &SerialUnit) -> Result<Self, Self::Error> {
        match unit.1.as_slice() {
            [index] => Ok(UnitId::new(unit.0.clone(), *index)),
            other => Err(CircuitError::Invalid(format!(
                "unit '{}' has {} indices, expected one",
                unit.0,
                other.len()
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerialOp {
    #[serde(rename = "type")]
    op_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerialCommand {
    op: SerialOp,
    args: Vec<SerialUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerialCircuit {
    bits: Vec<SerialUnit>,
    commands: Vec<SerialCommand>,
    #[serde(default)]
    created_qubits: Vec<SerialUnit>,
    #[serde(default)]
    discarded_qubits: Vec<SerialUnit>,
    implicit_permutation: Vec<(SerialUnit, SerialUnit)>,
    phase: String,
    qubits: Vec<SerialUnit>,
}

/// Encode a circuit as a single-line TKET JSON document.
pub fn serialize_circuit_json(circuit: &Circuit) -> Result<String, CircuitError> {
    let qubits: Vec<SerialUnit> = circuit.qubits().iter().map(SerialUnit::from).collect();
    let bits: Vec<SerialUnit> = circuit.bits().iter().map(SerialUnit::from).collect();

    let commands = circuit
        .commands
        .iter()
        .map(|command| {
            let params = (!command.params.is_empty())
                .then(|| command.params.iter().map(|p| format_half_turns(*p)).collect());
            let signature = (command.op_type == BARRIER)
                .then(|| command.args.iter().map(|_| "Q".to_string()).collect());
            SerialCommand {
                op: SerialOp {
                    op_type: command.op_type.clone(),
                    params,
                    signature,
                },
                args: command.args.iter().map(SerialUnit::from).collect(),
            }
        })
        .collect();

    let serial = SerialCircuit {
        bits,
        commands,
        created_qubits: Vec::new(),
        discarded_qubits: Vec::new(),
        implicit_permutation: qubits.iter().map(|q| (q.clone(), q.clone())).collect(),
        phase: format_half_turns(circuit.phase),
        qubits,
    };

    Ok(serde_json::to_string(&serial)?)
}

/// Decode a TKET JSON document. Registers are rebuilt from the declared
/// qubits and bits, sized by the largest index seen.
pub fn parse_circuit_json(text: &str) -> Result<Circuit, CircuitError> {
    let serial: SerialCircuit = serde_json::from_str(text)?;

    let mut circuit = Circuit::new();
    circuit.phase = parse_half_turns(&serial.phase)?;
    circuit.qregs = registers(&serial.qubits)?;
    circuit.cregs = registers(&serial.bits)?;

    for command in &serial.commands {
        let params = command
            .op
            .params
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| parse_half_turns(p))
            .collect::<Result<Vec<_>, _>>()?;
        let args = command
            .args
            .iter()
            .map(UnitId::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for arg in &args {
            let declared = circuit.qreg(&arg.register).or_else(|| circuit.creg(&arg.register));
            if !declared.is_some_and(|r| arg.index < r.size) {
                return Err(CircuitError::Invalid(format!(
                    "command {} uses undeclared unit {}",
                    command.op.op_type, arg
                )));
            }
        }

        circuit.commands.push(Command {
            op_type: command.op.op_type.clone(),
            params,
            args,
        });
    }

    Ok(circuit)
}

fn parse_half_turns(text: &str) -> Result<f64, CircuitError> {
    expr::evaluate(text)
        .map_err(|e| CircuitError::Invalid(format!("parameter '{}': {}", text, e)))
}

fn registers(units: &[SerialUnit]) -> Result<Vec<Register>, CircuitError> {
    let mut registers: Vec<Register> = Vec::new();
    for unit in units {
        let unit = UnitId::try_from(unit)?;
        let size = unit
            .index
            .checked_add(1)
            .filter(|size| *size <= MAX_UNITS)
            .ok_or_else(|| {
                CircuitError::Invalid(format!(
                    "unit {} exceeds the {} unit limit",
                    unit, MAX_UNITS
                ))
            })?;
        match registers.iter_mut().find(|r| r.name == unit.register) {
            Some(reg) => reg.size = reg.size.max(size),
            None => registers.push(Register {
                name: unit.register,
                size,
            }),
        }
    }
    check_unit_count(&registers)?;
    Ok(registers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::parse_qasm;
    use serde_json::Value;

    const BELL_JSON: &str = r#"{"bits": [["c", [0]], ["c", [1]]], "commands": [{"args": [["q", [0]]], "op": {"type": "H"}}, {"args": [["q", [0]], ["q", [1]]], "op": {"type": "CX"}}, {"args": [["q", [1]]], "op": {"params": ["0.5"], "type": "Rz"}}, {"args": [["q", [0]], ["c", [0]]], "op": {"type": "Measure"}}], "created_qubits": [], "discarded_qubits": [], "implicit_permutation": [[["q", [0]], ["q", [0]]], [["q", [1]], ["q", [1]]]], "phase": "0.0", "qubits": [["q", [0]], ["q", [1]]]}"#;

    #[test]
    fn test_parse_circuit_json() {
        let circuit = parse_circuit_json(BELL_JSON).unwrap();

        assert_eq!(circuit.qregs, vec![Register { name: "q".to_string(), size: 2 }]);
        assert_eq!(circuit.cregs, vec![Register { name: "c".to_string(), size: 2 }]);
        assert_eq!(circuit.commands.len(), 4);
        assert_eq!(circuit.commands[2].params, vec![0.5]);
        assert_eq!(circuit.phase, 0.0);
    }

    #[test]
    fn test_serialize_circuit_json() {
        let circuit = parse_qasm(
            "OPENQASM 2.0;\nqreg q[2];\ncreg c[1];\nrz(pi/4) q[0];\nbarrier q[0],q[1];\nmeasure q[1] -> c[0];",
        )
        .unwrap();
        let json: Value = serde_json::from_str(&serialize_circuit_json(&circuit).unwrap()).unwrap();

        assert_eq!(json["phase"], "0.0");
        assert_eq!(json["qubits"], serde_json::json!([["q", [0]], ["q", [1]]]));
        assert_eq!(json["bits"], serde_json::json!([["c", [0]]]));
        assert_eq!(json["commands"][0]["op"]["type"], "Rz");
        assert_eq!(json["commands"][0]["op"]["params"], serde_json::json!(["0.25"]));
        assert_eq!(json["commands"][1]["op"]["signature"], serde_json::json!(["Q", "Q"]));
        assert!(json["commands"][2]["op"].get("params").is_none());
        assert_eq!(json["implicit_permutation"][1], serde_json::json!([["q", [1]], ["q", [1]]]));
    }

    #[test]
    fn test_json_to_qasm_and_back() {
        let circuit = parse_circuit_json(BELL_JSON).unwrap();
        let qasm = crate::circuit::serialize_qasm(&circuit).unwrap();

        assert!(qasm.contains("rz(0.5*pi) q[1];"));
        assert_eq!(parse_qasm(&qasm).unwrap(), circuit);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_circuit_json("{"), Err(CircuitError::Json(_))));

        let undeclared = r#"{"bits": [], "commands": [{"args": [["r", [0]]], "op": {"type": "H"}}], "implicit_permutation": [], "phase": "0.0", "qubits": [["q", [0]]]}"#;
        assert!(matches!(parse_circuit_json(undeclared), Err(CircuitError::Invalid(_))));

        let boundary = r#"{"bits": [], "commands": [], "implicit_permutation": [], "phase": "0.0", "qubits": [["q", [4294967295]]]}"#;
        assert!(matches!(parse_circuit_json(boundary), Err(CircuitError::Invalid(_))));

        let oversized = r#"{"bits": [], "commands": [], "implicit_permutation": [], "phase": "0.0", "qubits": [["q", [1048576]]]}"#;
        assert!(matches!(parse_circuit_json(oversized), Err(CircuitError::Invalid(_))));

        let multi_index = r#"{"bits": [], "commands": [], "implicit_permutation": [], "phase": "0.0", "qubits": [["q", [0, 1]]]}"#;
        assert!(matches!(parse_circuit_json(multi_index), Err(CircuitError::Invalid(_))));
    }
}
