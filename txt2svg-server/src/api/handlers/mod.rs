//! API request handlers.

pub mod assets;
pub mod service;
