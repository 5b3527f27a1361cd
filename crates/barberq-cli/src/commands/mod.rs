pub mod config;
pub mod log;
pub mod queue;
pub mod service;
pub mod status;
