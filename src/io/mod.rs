//! Input/output helpers.
//!
//! - sales CSV ingest + validation (`ingest`)
//! - forecast table read/write (`forecast_file`)
//! - filtered exports (`export`)
//! - atomic replace-on-write (`atomic`)

pub mod atomic;
pub mod export;
pub mod forecast_file;
pub mod ingest;

pub use export::*;
pub use forecast_file::*;
pub use ingest::*;
