//! Database seeding functionality
//!
//! This module provides functionality to seed the database with the
//! directory data (employees, organizations, responsibilities) that tenders
//! are authorized against.

pub mod directory;

pub use directory::{
    DemoDirectory, grant_responsibility, seed_demo_directory, seed_employee, seed_organization,
};
