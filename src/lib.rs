//! matchbench - pattern matching benchmark aggregation and plotting.
//!
//! Loads the result tables written by the Quartz and Portmatching benchmark
//! runs, merges them into one normalized table and draws runtime against
//! pattern count, faceted by qubit count. Also hosts the OpenQASM / TKET
//! JSON circuit converters used to prepare benchmark inputs.

pub mod analysis;
pub mod circuit;
pub mod cli;
pub mod config;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod plot;
pub mod report;
