//! Waterlog Library
//!
//! Hydration tracking: drink intake log, daily water goal estimation and
//! intake statistics, served over MCP.

pub mod build_info;
pub mod db;
pub mod hydration;
pub mod mcp;
pub mod models;
pub mod tools;
