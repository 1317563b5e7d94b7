//! Table export and run summaries.

pub mod export;
pub mod summary;

pub use export::{write_table, ExportError, ExportFormat};
pub use summary::generate_summary_text;
