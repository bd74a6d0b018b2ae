// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `xfail-gate`.
///
/// The gate is consumed by CI systems that only distinguish success from failure, so every
/// failure (a malformed result stream, skipped tests, unexpected results, or a setup problem such
/// as a missing fail list) maps to the same non-zero code. The reason is always printed to
/// standard error.
pub enum GateExitCode {}

impl GateExitCode {
    /// Every test matched its expectation and no tests were skipped.
    ///
    /// `--dump` runs also exit with this code.
    pub const OK: i32 = 0;

    /// The gate failed.
    pub const GATE_FAILED: i32 = 1;
}
