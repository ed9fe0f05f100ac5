//! Manifest file loading, parsing and patching
//!
//! This module provides functionality to:
//! - Load dependency files from a directory
//! - Parse dependencies from go.mod and pom.xml files
//! - Apply updated requirements back into the original file text
//! - Write changed files to disk

pub mod detector;
mod go_mod;
pub mod pom;
pub mod pom_xml;
mod writer;

pub use detector::load_dependency_files;
pub use go_mod::{
    local_replacements, required_version, retarget_replacements, GoModParser, GoModUpdater,
};
pub use pom::{repository_urls, PomCoordinates, PomParser, PomUpdater};
pub use writer::{ManifestWriter, WriteResult};

use crate::domain::{Dependency, DependencyFile, Ecosystem};
use crate::error::EngineError;
use crate::property::{PomFetcher, PropertyResolver};
use async_trait::async_trait;
use std::ops::Range;
use std::sync::Arc;

/// Trait for turning dependency files into dependencies
#[async_trait]
pub trait FileParser: Send + Sync {
    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;

    /// Parse every dependency declared across `files`
    async fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>, EngineError>;
}

/// Trait for writing updated requirements back into dependency files
pub trait FileUpdater: Send + Sync {
    /// Returns the ecosystem this updater handles
    fn ecosystem(&self) -> Ecosystem;

    /// Returns `files` with every changed requirement of `dependencies` applied
    ///
    /// Files without a changed declaration are returned unchanged.
    fn apply(
        &self,
        files: &[DependencyFile],
        dependencies: &[Dependency],
    ) -> Result<Vec<DependencyFile>, EngineError>;
}

/// Get a file parser for the specified ecosystem
///
/// `fetcher` lets the Maven parser resolve properties from parent POMs
/// that are not part of the file set.
pub fn get_parser(
    ecosystem: Ecosystem,
    fetcher: Option<Arc<dyn PomFetcher>>,
) -> Box<dyn FileParser> {
    match ecosystem {
        Ecosystem::GoModules => Box::new(GoModParser),
        Ecosystem::Maven => {
            let resolver = match fetcher {
                Some(fetcher) => PropertyResolver::new(fetcher),
                None => PropertyResolver::offline(),
            };
            Box::new(PomParser::new(Arc::new(resolver)))
        }
    }
}

/// Get a file updater for the specified ecosystem
pub fn get_updater(ecosystem: Ecosystem) -> Box<dyn FileUpdater> {
    match ecosystem {
        Ecosystem::GoModules => Box::new(GoModUpdater),
        Ecosystem::Maven => Box::new(PomUpdater),
    }
}

/// Adds `dependency` to `dependencies`, merging requirements by name
///
/// Requirements keep first-seen file order.
pub(crate) fn merge_dependency(
    dependencies: &mut Vec<Dependency>,
    dependency: Dependency,
) -> Result<(), EngineError> {
    match dependencies
        .iter_mut()
        .find(|d| d.name() == dependency.name())
    {
        Some(existing) => {
            *existing =
                existing.merged_with(dependency.requirements(), dependency.is_top_level())?;
        }
        None => dependencies.push(dependency),
    }
    Ok(())
}

/// Replaces the bytes in `span` with `replacement`
pub(crate) fn replace_span(content: &str, span: Range<usize>, replacement: &str) -> String {
    let mut result = String::with_capacity(content.len() + replacement.len());
    result.push_str(&content[..span.start]);
    result.push_str(replacement);
    result.push_str(&content[span.end..]);
    result
}
