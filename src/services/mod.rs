// Service module exports

pub mod controller;
pub mod database;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod merge;
pub mod optimistic;
pub mod schedule;
pub mod store;
