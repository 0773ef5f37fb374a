//! Input/output helpers.
//!
//! - model artifacts (`artifacts`)
//! - CSV ingest for batch prediction (`ingest`)
//! - record and presentation JSON (`record`)
//! - category vocabularies (`vocabulary`)
//! - prediction exports (CSV/JSON) (`export`)

pub mod artifacts;
pub mod export;
pub mod ingest;
pub mod record;
pub mod vocabulary;

pub use artifacts::*;
pub use export::*;
pub use ingest::*;
