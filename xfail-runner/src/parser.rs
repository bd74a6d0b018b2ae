// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming parser for the XML result stream produced by the test binary.
//!
//! The test binary is run with `--reporters=xml`, and prints a document shaped like:
//!
//! ```xml
//! <doctest binary="...">
//!   <TestSuite name="TypeInfer">
//!     <TestCase name="basic" filename="..." line="42">
//!       <OverallResultsAsserts successes="3" failures="0" test_case_success="true"/>
//!     </TestCase>
//!   </TestSuite>
//!   <OverallResultsAsserts successes="3" failures="0"/>
//!   <OverallResultsTestCases successes="1" failures="0" skipped="0"/>
//! </doctest>
//! ```
//!
//! The document is read incrementally as the test binary produces it. XML elements are translated
//! into [`ResultEvent`]s, which [`ResultStreamParser::apply`] folds into a [`RunResults`].

use crate::{
    errors::{ResultStreamError, ResultStreamErrorKind},
    results::{DottedName, RunResults},
};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::{io::BufRead, num::IntErrorKind};
use tracing::trace;

const TEST_SUITE_TAG: &[u8] = b"TestSuite";
const TEST_CASE_TAG: &[u8] = b"TestCase";
const OVERALL_RESULTS_ASSERTS_TAG: &[u8] = b"OverallResultsAsserts";
const OVERALL_RESULTS_TEST_CASES_TAG: &[u8] = b"OverallResultsTestCases";

const NAME_ATTR: &str = "name";
const TEST_CASE_SUCCESS_ATTR: &str = "test_case_success";
const SKIPPED_ATTR: &str = "skipped";

/// A single structural event in a result stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultEvent<'a> {
    /// A test suite was entered.
    SuiteEnter {
        /// The name of the suite.
        name: &'a str,
    },

    /// A test case was entered.
    CaseEnter {
        /// The name of the test case.
        name: &'a str,
    },

    /// The assertions for the innermost open test case were summarized.
    AssertionSummary {
        /// Whether every assertion in this fragment passed.
        success: bool,
    },

    /// The innermost open test case was exited.
    CaseExit,

    /// The innermost open test suite was exited.
    SuiteExit,

    /// The run as a whole was summarized.
    RunSummary {
        /// The raw `skipped` count. Values that aren't non-negative integers are treated as 0, and
        /// values too large for `usize` saturate.
        skipped: Option<&'a str>,
    },
}

/// The stack of suites and test cases that are currently open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseCursor {
    open: Vec<String>,
}

impl ParseCursor {
    /// Returns true if no suite or test case is open.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Returns the dotted name of the innermost open suite or test case.
    pub fn dotted_name(&self) -> DottedName {
        DottedName::from_segments(&self.open)
    }

    fn push(&mut self, name: &str) {
        self.open.push(name.to_owned());
    }

    fn pop(&mut self) -> Option<String> {
        self.open.pop()
    }
}

/// Incrementally builds a [`RunResults`] out of a result stream.
///
/// The parser only holds the nesting context. Results are accumulated into a `RunResults` owned
/// by the caller.
#[derive(Clone, Debug, Default)]
pub struct ResultStreamParser {
    cursor: ParseCursor,
}

impl ResultStreamParser {
    /// Creates a new parser with an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current nesting context.
    pub fn cursor(&self) -> &ParseCursor {
        &self.cursor
    }

    /// Applies a single event, updating `results` if it carries results.
    pub fn apply(
        &mut self,
        event: ResultEvent<'_>,
        results: &mut RunResults,
    ) -> Result<(), ResultStreamError> {
        match event {
            ResultEvent::SuiteEnter { name } | ResultEvent::CaseEnter { name } => {
                self.cursor.push(name);
            }
            ResultEvent::SuiteExit | ResultEvent::CaseExit => {
                if self.cursor.pop().is_none() {
                    return Err(self.error(ResultStreamErrorKind::UnbalancedExit));
                }
            }
            ResultEvent::AssertionSummary { success } => {
                // Summaries outside of any suite are run-wide totals.
                if !self.cursor.is_empty() {
                    let name = self.cursor.dotted_name();
                    trace!("{name}: assertion summary success={success}");
                    results.table.record(name, success);
                }
            }
            ResultEvent::RunSummary { skipped } => {
                results.skipped = parse_skipped_count(skipped);
            }
        }

        Ok(())
    }

    /// Reads an XML result stream to the end, accumulating results into `results`.
    ///
    /// On error, the returned [`ResultStreamError`] names the suite or test case that was open at
    /// the time.
    pub fn parse<R: BufRead>(
        &mut self,
        reader: R,
        results: &mut RunResults,
    ) -> Result<(), ResultStreamError> {
        let mut reader = Reader::from_reader(reader);
        let mut document = DocumentState::default();
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|err| self.error(ResultStreamErrorKind::Xml(err)))?;

            match event {
                Event::Start(start) => {
                    document
                        .enter(&start)
                        .map_err(|kind| self.error(kind))?;
                    self.handle_start(&start, results)?;
                }
                Event::Empty(start) => {
                    document
                        .enter(&start)
                        .map_err(|kind| self.error(kind))?;
                    self.handle_start(&start, results)?;
                    self.handle_end(start.name().as_ref(), results)?;
                    document.exit();
                }
                Event::End(end) => {
                    self.handle_end(end.name().as_ref(), results)?;
                    document.exit();
                }
                Event::Text(text) => {
                    if document.depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(self.error(ResultStreamErrorKind::ContentOutsideRoot));
                    }
                }
                Event::CData(_) => {
                    if document.depth == 0 {
                        return Err(self.error(ResultStreamErrorKind::ContentOutsideRoot));
                    }
                }
                Event::Eof => {
                    return document.finish().map_err(|kind| self.error(kind));
                }
                // Declarations, comments and processing instructions carry no results.
                _ => {}
            }

            buf.clear();
        }
    }

    // ---
    // Helper methods
    // ---

    fn handle_start(
        &mut self,
        start: &BytesStart<'_>,
        results: &mut RunResults,
    ) -> Result<(), ResultStreamError> {
        match start.name().as_ref() {
            TEST_SUITE_TAG => {
                let name = self.required_attribute(start, NAME_ATTR)?;
                self.apply(ResultEvent::SuiteEnter { name: &name }, results)
            }
            TEST_CASE_TAG => {
                let name = self.required_attribute(start, NAME_ATTR)?;
                self.apply(ResultEvent::CaseEnter { name: &name }, results)
            }
            OVERALL_RESULTS_ASSERTS_TAG => {
                // The run-wide totals have no per-case verdict.
                if self.cursor.is_empty() {
                    return Ok(());
                }
                let success = self.required_attribute(start, TEST_CASE_SUCCESS_ATTR)?;
                self.apply(
                    ResultEvent::AssertionSummary {
                        success: success == "true",
                    },
                    results,
                )
            }
            OVERALL_RESULTS_TEST_CASES_TAG => {
                let skipped = self.attribute(start, SKIPPED_ATTR)?;
                self.apply(
                    ResultEvent::RunSummary {
                        skipped: skipped.as_deref(),
                    },
                    results,
                )
            }
            _ => Ok(()),
        }
    }

    fn handle_end(
        &mut self,
        name: &[u8],
        results: &mut RunResults,
    ) -> Result<(), ResultStreamError> {
        match name {
            TEST_SUITE_TAG => self.apply(ResultEvent::SuiteExit, results),
            TEST_CASE_TAG => self.apply(ResultEvent::CaseExit, results),
            _ => Ok(()),
        }
    }

    fn attribute(
        &self,
        start: &BytesStart<'_>,
        attribute: &'static str,
    ) -> Result<Option<String>, ResultStreamError> {
        let Some(attr) = start
            .try_get_attribute(attribute)
            .map_err(|err| self.error(ResultStreamErrorKind::Xml(err)))?
        else {
            return Ok(None);
        };
        let value = attr
            .unescape_value()
            .map_err(|err| self.error(ResultStreamErrorKind::Xml(err)))?;
        Ok(Some(value.into_owned()))
    }

    fn required_attribute(
        &self,
        start: &BytesStart<'_>,
        attribute: &'static str,
    ) -> Result<String, ResultStreamError> {
        self.attribute(start, attribute)?.ok_or_else(|| {
            self.error(ResultStreamErrorKind::MissingAttribute {
                element: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                attribute,
            })
        })
    }

    fn error(&self, kind: ResultStreamErrorKind) -> ResultStreamError {
        let in_progress = (!self.cursor.is_empty()).then(|| self.cursor.dotted_name());
        ResultStreamError::new(in_progress, kind)
    }
}

/// Parses an XML result stream from `reader` into `results`.
///
/// This is a convenience wrapper around [`ResultStreamParser::parse`].
pub fn parse_result_stream<R: BufRead>(
    reader: R,
    results: &mut RunResults,
) -> Result<(), ResultStreamError> {
    ResultStreamParser::new().parse(reader, results)
}

/// Well-formedness tracking for the document as a whole, independent of which elements carry
/// results.
#[derive(Debug, Default)]
struct DocumentState {
    depth: usize,
    root_seen: bool,
}

impl DocumentState {
    fn enter(&mut self, start: &BytesStart<'_>) -> Result<(), ResultStreamErrorKind> {
        if self.depth == 0 {
            if self.root_seen {
                return Err(ResultStreamErrorKind::MultipleRoots {
                    element: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                });
            }
            self.root_seen = true;
        }
        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self) {
        // quick-xml rejects unmatched end tags, so depth is always non-zero here.
        self.depth = self.depth.saturating_sub(1);
    }

    fn finish(&self) -> Result<(), ResultStreamErrorKind> {
        if self.depth > 0 {
            Err(ResultStreamErrorKind::UnexpectedEof {
                open_elements: self.depth,
            })
        } else if !self.root_seen {
            Err(ResultStreamErrorKind::NoRootElement)
        } else {
            Ok(())
        }
    }
}

fn parse_skipped_count(skipped: Option<&str>) -> usize {
    let Some(skipped) = skipped else { return 0 };
    match skipped.trim().parse::<usize>() {
        Ok(count) => count,
        Err(error) if *error.kind() == IntErrorKind::PosOverflow => usize::MAX,
        Err(_) => 0,
    }
}
