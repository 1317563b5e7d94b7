//! Analysis modules.
//!
//! Aggregation of per-source records and normalization of the resulting
//! table into the schema the charts consume.

pub mod aggregator;
pub mod grammar;
pub mod normalizer;

pub use aggregator::*;
pub use grammar::{DatasetGrammar, Extraction, GrammarWarning};
pub use normalizer::{
    normalize, BenchPoint, DurationColumn, Normalized, NormalizedTable, SchemaOptions,
};
