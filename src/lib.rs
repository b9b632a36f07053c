//! Larder Library
//!
//! Recipe import, meal planning, and grocery list aggregation.

pub mod build_info;
pub mod db;
pub mod grocery;
pub mod import;
pub mod mcp;
pub mod models;
pub mod tools;
