//! Convert an OpenQASM 2.0 string to TKET JSON.
//!
//! Usage: qasm-to-json <qasm string>

use matchbench::circuit::{parse_qasm, serialize_circuit_json};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "qasm-to-json".to_string());

    if args.len() != 2 {
        println!("Usage: {} <qasm string>", program);
        return ExitCode::FAILURE;
    }

    match parse_qasm(&args[1]).and_then(|circuit| serialize_circuit_json(&circuit)) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
