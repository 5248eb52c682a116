pub mod config;
pub mod probes;
pub mod workflows;
