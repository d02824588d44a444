//! HTTP route handlers

pub mod sessions;
pub mod status;
pub mod tournaments;
