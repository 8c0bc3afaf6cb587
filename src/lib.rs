// Focus Calendar scheduling core
// Exports all modules for the binary, tests and benches

pub mod error;
pub mod models;
pub mod services;
pub mod utils;
