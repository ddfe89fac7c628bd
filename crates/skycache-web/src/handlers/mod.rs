//! # Web API Handlers

pub mod health;
pub mod keys;
pub mod weather;
