//! Domain types shared across the audit pipeline.

pub mod models;
