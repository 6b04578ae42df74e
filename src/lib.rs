// src/lib.rs

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod lifecycle;
pub mod service;
pub mod test_utils;
