// Shared helpers that don't belong to a single service

pub mod date;
