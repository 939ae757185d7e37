// src/data_analysis/mod.rs

pub mod aggregation;
pub mod cycle_delay;
pub mod edge_detection;
pub mod propagation_delay;
pub mod return_loss;

// src/data_analysis/mod.rs
