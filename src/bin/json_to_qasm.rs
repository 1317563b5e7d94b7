//! Convert a TKET JSON string to OpenQASM 2.0.
//!
//! Usage: json-to-qasm <json string>

use matchbench::circuit::{parse_circuit_json, serialize_qasm};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json-to-qasm".to_string());

    if args.len() != 2 {
        println!("Usage: {} <json string>", program);
        return ExitCode::FAILURE;
    }

    match parse_circuit_json(&args[1]).and_then(|circuit| serialize_qasm(&circuit)) {
        Ok(qasm) => {
            print!("{}", qasm);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
