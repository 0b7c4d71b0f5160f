//! ODDSBOARD — bookmaker consensus for football fixtures
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod engine;
pub mod schedule;
pub mod service;
pub mod platforms;
pub mod text;
pub mod dashboard;
