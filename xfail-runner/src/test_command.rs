// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Launching the test binary and streaming its output.

use crate::{config::GateConfig, errors::TestCommandError};
use camino::{Utf8Path, Utf8PathBuf};
use duct::ReaderHandle;
use std::{
    io::{self, BufReader},
    process::ExitStatus,
};
use tracing::{debug, trace};

/// How the test binary should order its tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedMode {
    /// Use the test binary's default order.
    #[default]
    Default,

    /// Ask the test binary to pick a random seed.
    Randomize,

    /// Run with a specific seed.
    Fixed(u64),
}

impl SeedMode {
    /// Computes the seed mode from command-line options. An explicit seed takes precedence over
    /// `randomize`.
    pub fn new(randomize: bool, random_seed: Option<u64>) -> Self {
        match (random_seed, randomize) {
            (Some(seed), _) => Self::Fixed(seed),
            (None, true) => Self::Randomize,
            (None, false) => Self::Default,
        }
    }

    fn to_arg(self) -> Option<String> {
        match self {
            Self::Default => None,
            Self::Randomize => Some("--randomize".to_owned()),
            Self::Fixed(seed) => Some(format!("--random-seed={seed}")),
        }
    }
}

/// A test binary invocation: `<program> <reporter-args...> [--fflags=...] [seed]`.
#[derive(Clone, Debug)]
pub struct TestCommand {
    program: Utf8PathBuf,
    args: Vec<String>,
}

impl TestCommand {
    /// Creates the invocation for `program`.
    pub fn new(program: impl Into<Utf8PathBuf>, config: &GateConfig, seed_mode: SeedMode) -> Self {
        let mut args = config.reporter_args().to_vec();
        args.extend(config.fflags_arg());
        args.extend(seed_mode.to_arg());
        Self {
            program: program.into(),
            args,
        }
    }

    /// Returns the path to the test binary.
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Returns the arguments passed to the test binary.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the command line, quoted so it can be pasted into a shell.
    pub fn display(&self) -> String {
        let args = self.args.iter().map(|arg| &**arg);
        shell_words::join(std::iter::once(self.program.as_str()).chain(args))
    }

    /// Convert the command to a [`duct::Expression`].
    ///
    /// The exit status is not checked: only the result stream decides the verdict.
    pub fn to_expression(&self) -> duct::Expression {
        duct::cmd(self.program.as_str(), self.args.iter().map(|arg| &**arg)).unchecked()
    }

    /// Launches the test binary with its standard output piped back to this process.
    ///
    /// Standard error and standard input are inherited.
    pub fn spawn(&self) -> Result<TestProcess, TestCommandError> {
        let expression = self.to_expression();
        trace!("executing command: {:?}", expression);
        let handle = expression
            .reader()
            .map_err(|error| TestCommandError::new(self.display(), error))?;
        Ok(TestProcess { handle })
    }
}

/// A running test binary.
///
/// Dropping a `TestProcess` before calling [`finish`](Self::finish) kills the child.
#[derive(Debug)]
pub struct TestProcess {
    handle: ReaderHandle,
}

impl TestProcess {
    /// Returns a buffered reader over the child's standard output.
    ///
    /// Reads block until the child produces more output or exits.
    pub fn stdout(&self) -> BufReader<&ReaderHandle> {
        BufReader::new(&self.handle)
    }

    /// Reads any remaining output, then waits for the child to exit.
    ///
    /// Returns the exit status, or `None` if it could not be determined.
    pub fn finish(self) -> io::Result<Option<ExitStatus>> {
        let mut reader = &self.handle;
        let remaining = io::copy(&mut reader, &mut io::sink())?;
        if remaining > 0 {
            debug!("discarded {remaining} trailing bytes of test output");
        }
        let status = self.handle.try_wait()?.map(|output| output.status);
        match status {
            Some(status) => debug!("test binary exited with {status}"),
            None => debug!("test binary exit status is unavailable"),
        }
        Ok(status)
    }
}
