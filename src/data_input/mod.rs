// src/data_input/mod.rs

pub mod capture_data;
pub mod capture_parser;
pub mod file_discovery;
pub mod touchstone;

// src/data_input/mod.rs
