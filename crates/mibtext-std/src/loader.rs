//! Filesystem batch loading.
//!
//! Reads module sources from disk, runs them through a pluggable front end
//! (any `Fn(&str) -> Result<ParseNode, MibError>`), applies the skip list,
//! and feeds the core [`Loader`]. Loading is best-effort: a file that does
//! not read, parse or walk is logged and the batch continues.

use crate::report::TracingReporter;
use crate::skiplist::SkipList;
use mibtext_core::ast::{ParseNode, Rule};
use mibtext_core::report::LoadReporter;
use mibtext_core::{Loader, MibError, MibStore};
use std::fs;
use std::path::Path;

/// Filesystem-level load failures. Per-module problems never surface
/// here; they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The directory itself could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A core loader plus filesystem conveniences.
pub struct BatchLoader<R: LoadReporter = TracingReporter> {
    loader: Loader<R>,
    skip: SkipList,
}

impl Default for BatchLoader<TracingReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchLoader<TracingReporter> {
    /// A batch loader logging through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter)
    }
}

impl<R: LoadReporter> BatchLoader<R> {
    /// A batch loader with a custom reporter.
    #[must_use]
    pub fn with_reporter(reporter: R) -> Self {
        Self {
            loader: Loader::with_reporter(reporter),
            skip: SkipList::default(),
        }
    }

    /// Attach a skip list.
    #[must_use]
    pub fn skip_list(mut self, skip: SkipList) -> Self {
        self.skip = skip;
        self
    }

    /// Load one in-memory source. `origin` identifies where the source
    /// came from (file stem, archive id) for origin-qualified skip
    /// entries. Returns whether the module was added.
    pub fn load_source<F>(&mut self, origin: &str, source: &str, parse: &F) -> bool
    where
        F: Fn(&str) -> Result<ParseNode, MibError>,
    {
        let tree = match parse(source) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::warn!("{origin}: front end failed: {err}");
                return false;
            }
        };

        let name = tree
            .child(Rule::ModuleName)
            .map(ParseNode::text)
            .unwrap_or_default();
        if self.skip.matches_origin(origin, name) {
            tracing::info!("skipping module {name} ({origin}): listed in skip file");
            return false;
        }

        match self.loader.add_tree(&tree) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("{origin}: {err}");
                false
            }
        }
    }

    /// Load one file. Read failures are logged, not fatal.
    pub fn load_file<F>(&mut self, path: &Path, parse: &F) -> bool
    where
        F: Fn(&str) -> Result<ParseNode, MibError>,
    {
        let origin = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match fs::read_to_string(path) {
            Ok(source) => self.load_source(&origin, &source, parse),
            Err(err) => {
                tracing::warn!("{}: {err}", path.display());
                false
            }
        }
    }

    /// Load every regular file in a directory, in name order so batches
    /// are deterministic. Returns how many modules were added.
    pub fn load_dir<F>(&mut self, dir: &Path, parse: &F) -> Result<usize, LoadError>
    where
        F: Fn(&str) -> Result<ParseNode, MibError>,
    {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            if self.load_file(&path, parse) {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Finish the batch and build the store.
    #[must_use]
    pub fn finish(self) -> MibStore {
        self.loader.build()
    }
}
