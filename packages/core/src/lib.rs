// Library root: exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod cache;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod weather;
pub mod cli;
pub mod config;
pub mod logging;
