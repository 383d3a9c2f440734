//! Test module for conform-core
//!
//! This module contains tests for:
//! - Result validation and download checks
//! - Step running, timing and status lines
//! - The conformance sequence against fake adapters
//! - Process-backed adapters (manifest, wire format, discovery, handlers)
//! - Configuration loading and defaults

mod config_tests;
mod fixtures;
