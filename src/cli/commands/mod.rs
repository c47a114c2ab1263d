//! Command implementations

pub mod audit;
pub mod classify;
pub mod config;
pub mod rules;
pub mod spec;
