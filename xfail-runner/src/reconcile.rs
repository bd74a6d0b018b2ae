// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of run results against the fail list.
//!
//! Every reported test is classified exactly once into an [`Outcome`]. Both the per-test
//! diagnostics and the overall verdict are derived from that single classification, so they
//! cannot disagree.

use crate::{
    baseline::BaselineSet,
    results::{DottedName, ResultTable},
};
use owo_colors::{OwoColorize, Style, style};
use std::{fmt, io};

/// How a single test's result compares to the fail list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The test passed and is not in the fail list.
    ExpectedPass,

    /// The test failed and is in the fail list.
    ExpectedFail,

    /// The test passed but is in the fail list.
    UnexpectedPass,

    /// The test failed but is not in the fail list.
    UnexpectedFail,
}

impl Outcome {
    /// Classifies a test that `passed` (or not), given whether it is in the fail list.
    pub fn classify(passed: bool, in_baseline: bool) -> Self {
        match (passed, in_baseline) {
            (true, false) => Self::ExpectedPass,
            (false, true) => Self::ExpectedFail,
            (true, true) => Self::UnexpectedPass,
            (false, false) => Self::UnexpectedFail,
        }
    }

    /// Returns true if the test's result disagrees with the fail list.
    pub fn is_unexpected(self) -> bool {
        matches!(self, Self::UnexpectedPass | Self::UnexpectedFail)
    }

    /// Returns true if the test passed.
    pub fn passed(self) -> bool {
        matches!(self, Self::ExpectedPass | Self::UnexpectedPass)
    }

    /// Returns the diagnostic printed for this outcome, if any.
    pub fn diagnostic(self) -> Option<&'static str> {
        match self {
            Self::UnexpectedPass => Some("should have failed"),
            Self::UnexpectedFail => Some("should have passed"),
            Self::ExpectedPass | Self::ExpectedFail => None,
        }
    }
}

/// The number of tests with each [`Outcome`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Tests that passed and are not in the fail list.
    pub expected_pass: usize,
    /// Tests that failed and are in the fail list.
    pub expected_fail: usize,
    /// Tests that passed but are in the fail list.
    pub unexpected_pass: usize,
    /// Tests that failed but are not in the fail list.
    pub unexpected_fail: usize,
}

impl OutcomeCounts {
    /// Returns the total number of tests with unexpected results.
    pub fn unexpected(&self) -> usize {
        self.unexpected_pass + self.unexpected_fail
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} expected pass, {} expected fail, {} unexpected pass, {} unexpected fail",
            self.expected_pass, self.expected_fail, self.unexpected_pass, self.unexpected_fail
        )
    }
}

/// Styles used to print diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticStyles {
    unexpected: Style,
    test_name: Style,
}

impl DiagnosticStyles {
    /// Enables colors.
    pub fn colorize(&mut self) {
        self.unexpected = style().red().bold();
        self.test_name = style().bold();
    }
}

/// The result of comparing a [`ResultTable`] against a [`BaselineSet`].
#[derive(Clone, Debug)]
pub struct Reconciliation<'a> {
    outcomes: Vec<(&'a DottedName, Outcome)>,
    not_reported: Vec<&'a DottedName>,
}

impl<'a> Reconciliation<'a> {
    /// Classifies every test in `results` against `baseline`.
    ///
    /// Names in `baseline` that were never reported don't participate in the verdict. They're
    /// available through [`not_reported`](Self::not_reported).
    pub fn new(results: &'a ResultTable, baseline: &'a BaselineSet) -> Self {
        let outcomes = results
            .iter()
            .map(|(name, passed)| {
                (
                    name,
                    Outcome::classify(passed, baseline.contains(name.as_str())),
                )
            })
            .collect();
        let not_reported = baseline.missing_from(results).collect();

        Self {
            outcomes,
            not_reported,
        }
    }

    /// Returns true if every reported test matched the fail list: it failed if and only if it is
    /// in the fail list.
    pub fn is_ok(&self) -> bool {
        self.unexpected().next().is_none()
    }

    /// Iterates over every reported test and its outcome, in the order the tests were reported.
    pub fn outcomes(&self) -> impl Iterator<Item = (&'a DottedName, Outcome)> + '_ {
        self.outcomes.iter().copied()
    }

    /// Iterates over tests whose results disagree with the fail list.
    pub fn unexpected(&self) -> impl Iterator<Item = (&'a DottedName, Outcome)> + '_ {
        self.outcomes().filter(|(_, outcome)| outcome.is_unexpected())
    }

    /// Returns fail list entries that were not reported by this run.
    pub fn not_reported(&self) -> &[&'a DottedName] {
        &self.not_reported
    }

    /// Returns the number of tests with each outcome.
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for (_, outcome) in self.outcomes() {
            match outcome {
                Outcome::ExpectedPass => counts.expected_pass += 1,
                Outcome::ExpectedFail => counts.expected_fail += 1,
                Outcome::UnexpectedPass => counts.unexpected_pass += 1,
                Outcome::UnexpectedFail => counts.unexpected_fail += 1,
            }
        }
        counts
    }

    /// Returns the fail list that would make this run pass: every reported test that failed.
    ///
    /// This is a full replacement. Entries in the old fail list that weren't reported this run are
    /// dropped.
    pub fn replacement_baseline(&self) -> BaselineSet {
        self.outcomes()
            .filter(|(_, outcome)| !outcome.passed())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Writes a line for every unexpected result.
    pub fn write_diagnostics(
        &self,
        mut writer: impl io::Write,
        styles: &DiagnosticStyles,
    ) -> io::Result<()> {
        for (name, outcome) in self.unexpected() {
            if let Some(diagnostic) = outcome.diagnostic() {
                writeln!(
                    writer,
                    "{}: {} {diagnostic}",
                    "UNEXPECTED".style(styles.unexpected),
                    name.style(styles.test_name),
                )?;
            }
        }
        Ok(())
    }
}
