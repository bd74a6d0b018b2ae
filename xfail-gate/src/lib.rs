// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs a unit-test binary and gates CI on a list of expected failures.
//!
//! `xfail-gate` launches the test binary, parses its XML results as they stream in, and compares
//! them against a fail list. The run passes if every test that ran failed exactly when it is in
//! the fail list. `--write` replaces the fail list with the current failures.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
