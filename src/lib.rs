pub mod board;
pub mod config;
pub mod constants;
pub mod engine;
pub mod geometry;
pub mod rng;
pub mod types;
