pub mod config;
pub mod layers;
