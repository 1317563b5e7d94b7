//! Circuit format conversion.
//!
//! Converts between OpenQASM 2.0 text and the TKET JSON serial form used
//! by the pattern-matching benchmarks. Parameters are held in half-turns
//! (multiples of pi) throughout, as TKET stores them.

pub mod expr;
pub mod json;
pub mod qasm;

pub use json::{parse_circuit_json, serialize_circuit_json};
pub use qasm::{parse_qasm, serialize_qasm};

use std::fmt;
use thiserror::Error;

/// Most qubits, and separately most bits, a circuit may declare.
pub const MAX_UNITS: u32 = 1 << 20;

/// Errors raised while converting circuits.
#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: unsupported construct '{construct}'")]
    Unsupported { line: usize, construct: String },

    #[error("line {line}: unknown gate '{name}'")]
    UnknownGate { line: usize, name: String },

    #[error("operation '{0}' has no OpenQASM 2.0 equivalent")]
    NotExpressible(String),

    #[error("invalid circuit: {0}")]
    Invalid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single qubit or bit, `register[index]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    pub register: String,
    pub index: u32,
}

impl UnitId {
    pub fn new(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A named register of `size` units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub size: u32,
}

/// One operation applied to some units.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// TKET operation type, e.g. `CX` or `Rz`.
    pub op_type: String,
    /// Parameters in half-turns.
    pub params: Vec<f64>,
    pub args: Vec<UnitId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circuit {
    pub qregs: Vec<Register>,
    pub cregs: Vec<Register>,
    pub commands: Vec<Command>,
    /// Global phase in half-turns.
    pub phase: f64,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// All qubits, register by register.
    pub fn qubits(&self) -> Vec<UnitId> {
        units(&self.qregs)
    }

    /// All classical bits, register by register.
    pub fn bits(&self) -> Vec<UnitId> {
        units(&self.cregs)
    }
}

/// Fail when `registers` declare more than [`MAX_UNITS`] units in total.
pub(crate) fn check_unit_count(registers: &[Register]) -> Result<(), CircuitError> {
    let total: u64 = registers.iter().map(|r| u64::from(r.size)).sum();
    if total > u64::from(MAX_UNITS) {
        return Err(CircuitError::Invalid(format!(
            "{} units declared, at most {} supported",
            total, MAX_UNITS
        )));
    }
    Ok(())
}

fn units(registers: &[Register]) -> Vec<UnitId> {
    registers
        .iter()
        .flat_map(|r| (0..r.size).map(move |i| UnitId::new(r.name.clone(), i)))
        .collect()
}

/// Format a half-turn value the way TKET writes it: always with a
/// fractional part.
pub(crate) fn format_half_turns(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}
