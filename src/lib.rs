//! salesnorm normalizes spreadsheet sales reports from heterogeneous
//! distributors into a fixed canonical schema. The heart of the crate is the
//! Transformer: it locates the real header row inside noisy spreadsheet
//! data, strips structurally empty rows and columns, and maps unknown source
//! columns onto the target fields using configurable matching strategies.

pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod table;
pub mod transform;
