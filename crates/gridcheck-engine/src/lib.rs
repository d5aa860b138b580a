//! gridcheck_engine - I/O-free comparison primitives for spreadsheet grading.

pub mod engine;
