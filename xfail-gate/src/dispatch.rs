// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use owo_colors::OwoColorize;
use std::{
    io::{self, Write},
    process::ExitStatus,
};
use tracing::{debug, info, warn};
use xfail_runner::{
    GateExitCode,
    baseline::BaselineStore,
    config::GateConfig,
    parser::parse_result_stream,
    reconcile::Reconciliation,
    results::RunResults,
    test_command::{SeedMode, TestCommand},
};

/// Runs a unit-test binary and checks its results against a list of expected failures.
///
/// Exits with 0 if every test that ran failed exactly when it is in the fail list, and with 1
/// otherwise.
#[derive(Debug, Parser)]
#[command(version, bin_name = "xfail-gate", styles = clap_styles())]
pub struct XfailGateApp {
    /// Path to the unit-test binary
    #[arg(value_name = "PATH")]
    path: Utf8PathBuf,

    /// Print the raw result stream to stdout instead of checking it
    #[arg(long)]
    dump: bool,

    /// Replace the fail list with the tests that failed in this run
    #[arg(long)]
    write: bool,

    /// Ask the test binary to run tests in a random order
    #[arg(long)]
    randomize: bool,

    /// Ask the test binary to run tests in the order given by this seed [overrides --randomize]
    #[arg(long, value_name = "SEED")]
    random_seed: Option<u64>,

    /// Fail list to check against [default: from config, or faillist.txt]
    #[arg(long, value_name = "PATH", env = "XFAIL_GATE_FAIL_LIST")]
    fail_list: Option<Utf8PathBuf>,

    /// Config file [default: .config/xfail-gate.toml]
    #[arg(long, value_name = "PATH", env = "XFAIL_GATE_CONFIG_FILE")]
    config_file: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output: OutputOpts,
}

impl XfailGateApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, resolving paths against the current directory.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let current_dir =
            std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
        let current_dir = Utf8PathBuf::try_from(current_dir)
            .map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })?;
        self.exec_in(&current_dir, output, output_writer)
    }

    fn exec_in(
        self,
        root: &Utf8Path,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let mut config = GateConfig::from_sources(root, self.config_file.as_deref())?;
        if let Some(fail_list) = &self.fail_list {
            config.set_fail_list(fail_list);
        }

        // A missing fail list is reported before anything is launched.
        let store = BaselineStore::new(config.fail_list());
        let baseline = store.load()?;
        debug!(
            "loaded {} fail list entries from `{}`",
            baseline.len(),
            store.path()
        );

        let seed_mode = SeedMode::new(self.randomize, self.random_seed);
        let command = TestCommand::new(&self.path, &config, seed_mode);
        {
            let styles = output.stderr_styles();
            let mut stderr = output_writer.stderr_writer();
            writeln!(stderr, "> {}", command.display().style(styles.bold))
                .and_then(|()| stderr.flush())
                .map_err(ExpectedError::write_output_error)?;
        }

        let process = command.spawn()?;

        if self.dump {
            let mut stdout = output_writer.stdout_writer();
            io::copy(&mut process.stdout(), &mut stdout)
                .and_then(|_| stdout.flush())
                .map_err(ExpectedError::write_output_error)?;
            return Ok(dump_exit_code(process.finish()));
        }

        // On a corrupted stream, `process` is dropped here and the test binary is killed.
        let mut results = RunResults::new();
        parse_result_stream(process.stdout(), &mut results)?;
        process
            .finish()
            .map_err(|err| ExpectedError::test_process_wait_failed(command.display(), err))?;

        let reconciliation = Reconciliation::new(results.table(), &baseline);
        debug!("results: {}", reconciliation.counts());

        let not_reported = reconciliation.not_reported();
        if !not_reported.is_empty() {
            warn!(
                "{} fail list entries were not reported by this run",
                not_reported.len()
            );
            for name in not_reported {
                debug!("not reported: {name}");
            }
        }

        {
            let mut stderr = output_writer.stderr_writer();
            reconciliation
                .write_diagnostics(&mut stderr, &output.diagnostic_styles())
                .and_then(|()| stderr.flush())
                .map_err(ExpectedError::write_output_error)?;
        }

        if self.write {
            store.save(&reconciliation.replacement_baseline())?;
            info!("updated `{}`", store.path());
        }

        let skipped = results.skipped_count();
        if skipped > 0 {
            return Err(ExpectedError::SkippedTests { count: skipped });
        }

        if !reconciliation.is_ok() {
            return Err(ExpectedError::UnexpectedResults {
                count: reconciliation.counts().unexpected(),
            });
        }

        info!("everything in order!");
        Ok(GateExitCode::OK)
    }
}

/// `--dump` exits 0 even if the test binary's exit status can't be collected.
fn dump_exit_code(finished: io::Result<Option<ExitStatus>>) -> i32 {
    if let Err(error) = finished {
        debug!("failed to wait for test binary after dump: {error}");
    }
    GateExitCode::OK
}
