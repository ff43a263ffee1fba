//! Shared test utilities for template-analyser integration tests.
//!
//! This module provides:
//! - `TestHarness` owning a temp directory with template files and a SQLite store
//! - Builders for DOCX packages, catalogs and scripted extractors

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
