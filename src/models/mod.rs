// Module exports for models

pub mod drag;
pub mod event;
pub mod settings;
pub mod task;
