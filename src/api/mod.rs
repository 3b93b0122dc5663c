//! API endpoint handlers

pub mod fichas;
pub mod health;
pub mod openapi;
pub mod settings;
