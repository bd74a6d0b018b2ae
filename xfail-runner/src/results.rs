// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat pass/fail results collected from a test run.

use indexmap::IndexMap;
use std::{borrow::Borrow, fmt};

/// A hierarchical test identifier: the names of the enclosing suites and the test case, joined
/// with `.`.
///
/// For example, test case `basic` inside suite `TypeInfer` is `TypeInfer.basic`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DottedName(String);

impl DottedName {
    /// The separator placed between path segments.
    pub const SEPARATOR: &'static str = ".";

    /// Creates a new `DottedName` from an already-joined string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Joins the given suite and case names into a `DottedName`.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut name = String::new();
        for (idx, segment) in segments.into_iter().enumerate() {
            if idx > 0 {
                name.push_str(Self::SEPARATOR);
            }
            name.push_str(segment.as_ref());
        }
        Self(name)
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DottedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DottedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A mapping from [`DottedName`] to whether that test passed.
///
/// A test may be reported more than once (for example, once per subcase). It is only considered to
/// have passed if every report was a pass.
///
/// Tests are kept in the order they were first reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultTable {
    results: IndexMap<DottedName, bool>,
}

impl ResultTable {
    /// Creates a new, empty `ResultTable`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single report for `name`.
    ///
    /// The stored value is the logical AND of every report seen so far, so one failing report
    /// makes the test fail regardless of any other reports.
    pub fn record(&mut self, name: DottedName, passed: bool) {
        let entry = self.results.entry(name).or_insert(true);
        *entry = *entry && passed;
    }

    /// Returns whether `name` passed, or `None` if it was never reported.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.results.get(name).copied()
    }

    /// Returns true if `name` was reported in this run.
    pub fn contains(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    /// Returns the number of distinct tests reported.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no tests were reported.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over tests and whether they passed, in the order they were first reported.
    pub fn iter(&self) -> impl Iterator<Item = (&DottedName, bool)> + '_ {
        self.results.iter().map(|(name, &passed)| (name, passed))
    }

    /// Iterates over the tests that did not pass.
    pub fn failed_names(&self) -> impl Iterator<Item = &DottedName> + '_ {
        self.iter()
            .filter_map(|(name, passed)| (!passed).then_some(name))
    }
}

/// Everything extracted from a single result stream.
#[derive(Clone, Debug, Default)]
pub struct RunResults {
    pub(crate) table: ResultTable,
    pub(crate) skipped: usize,
}

impl RunResults {
    /// Creates a new, empty `RunResults`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the per-test results.
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Returns the number of tests the runner reported as skipped.
    ///
    /// A non-zero count usually means a test crashed the runner.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }
}
