//! `census-income` library crate.
//!
//! The binary (`income`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - other front-ends can reuse the same schema, encoders and presentation
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod models;
pub mod report;

#[cfg(test)]
pub mod testing;
