//! Batch I/O around the engine: CSV seed files and wallet reports, JSON-lines
//! requests and order exports.

pub mod csv;
pub mod jsonl;
