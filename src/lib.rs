//! # Tenders API Library
//!
//! This library provides the core functionality for the Tenders API service:
//! the versioned tender store, its HTTP handlers and the server wiring.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod service;
pub mod telemetry;
pub use migration;
