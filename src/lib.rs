pub mod config;
pub mod error;
pub mod linest;
pub mod regression;
pub mod sample;
pub mod solver;
