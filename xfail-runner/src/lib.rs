// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `xfail-gate`.
//!
//! The basic flow is:
//!
//! 1. Load the [fail list](baseline::BaselineStore) of tests that are expected to fail.
//! 2. Launch the unit-test binary through a [`TestCommand`](test_command::TestCommand).
//! 3. Feed its standard output to the [streaming parser](parser::ResultStreamParser), which
//!    builds a flat [`ResultTable`](results::ResultTable).
//! 4. [Reconcile](reconcile::Reconciliation) the results against the fail list to get a verdict.

pub mod baseline;
pub mod config;
pub mod errors;
mod exit_codes;
pub mod parser;
pub mod reconcile;
pub mod results;
pub mod test_command;

pub use exit_codes::GateExitCode;
