// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage for the fail list: the set of tests that are currently expected to fail.
//!
//! The fail list is a UTF-8 text file with one [`DottedName`] per line. Surrounding whitespace is
//! ignored on read, and the file is always rewritten with `\n` line endings, sorted
//! case-insensitively.

use crate::{
    errors::{BaselineReadError, BaselineWriteError},
    results::{DottedName, ResultTable},
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
};

/// The set of tests expected to fail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaselineSet {
    names: BTreeSet<DottedName>,
}

impl BaselineSet {
    /// Creates a new, empty `BaselineSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a fail list, one name per line.
    ///
    /// Lines are trimmed, and lines that are empty after trimming are skipped.
    pub fn from_reader(reader: impl BufRead) -> io::Result<Self> {
        let mut names = BTreeSet::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                names.insert(DottedName::new(name));
            }
        }
        Ok(Self { names })
    }

    /// Returns true if `name` is expected to fail.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the number of names in the set.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the names in byte order.
    pub fn iter(&self) -> impl Iterator<Item = &DottedName> + '_ {
        self.names.iter()
    }

    /// Returns the names in the order they're written to disk: case-insensitive, with ties broken
    /// by byte order.
    pub fn sorted_for_write(&self) -> Vec<&DottedName> {
        let mut names: Vec<_> = self.names.iter().collect();
        // The sort is stable and `names` starts out in byte order.
        names.sort_by_cached_key(|name| name.as_str().to_lowercase());
        names
    }

    /// Returns names in this set that aren't present in `results`.
    pub fn missing_from<'a>(
        &'a self,
        results: &'a ResultTable,
    ) -> impl Iterator<Item = &'a DottedName> + 'a {
        self.names
            .iter()
            .filter(move |name| !results.contains(name.as_str()))
    }

    /// Writes out the set, one name per line with `\n` line endings.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        for name in self.sorted_for_write() {
            writeln!(writer, "{name}")?;
        }
        Ok(())
    }
}

impl FromIterator<DottedName> for BaselineSet {
    fn from_iter<T: IntoIterator<Item = DottedName>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BaselineSet {
    type Item = &'a DottedName;
    type IntoIter = std::collections::btree_set::Iter<'a, DottedName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Loads and saves the fail list at a fixed path.
#[derive(Clone, Debug)]
pub struct BaselineStore {
    path: Utf8PathBuf,
}

impl BaselineStore {
    /// Creates a new `BaselineStore` backed by the file at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the fail list.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads the fail list.
    ///
    /// A missing file is an error: an absent fail list is a configuration problem, not an empty
    /// list.
    pub fn load(&self) -> Result<BaselineSet, BaselineReadError> {
        let file =
            File::open(&self.path).map_err(|error| BaselineReadError::new(&self.path, error))?;
        BaselineSet::from_reader(BufReader::new(file))
            .map_err(|error| BaselineReadError::new(&self.path, error))
    }

    /// Replaces the fail list on disk with `names`.
    ///
    /// The file is written atomically, so readers either see the old list or the new one.
    pub fn save(&self, names: &BaselineSet) -> Result<(), BaselineWriteError> {
        let file = AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite);
        file.write(|f| {
            let mut writer = BufWriter::new(f);
            names.write_to(&mut writer)?;
            writer.flush()
        })
        .map_err(|err| match err {
            atomicwrites::Error::Internal(error) | atomicwrites::Error::User(error) => {
                BaselineWriteError::new(&self.path, error)
            }
        })
    }
}
