//! depshift - Dependency update engine library
//!
//! Parses dependency files into a normalized model, finds the newest version
//! each dependency can move to, and rewrites the files for it:
//! - Go modules (go.mod, go.sum)
//! - Maven (pom.xml, including parent and property resolution)

pub mod cli;
pub mod config;
pub mod conflict;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod property;
pub mod registry;
pub mod resolver;
pub mod scheme;
pub mod update;
