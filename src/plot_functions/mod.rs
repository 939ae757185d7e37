// src/plot_functions/mod.rs

pub mod plot_cycle_delay_scatter;
pub mod plot_edge_delay_scatter;
pub mod plot_propagation_boxplot;
pub mod plot_return_loss;

// src/plot_functions/mod.rs
