// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use std::{
    borrow::Cow,
    fmt,
    os::unix::fs::PermissionsExt,
    process::{Command, ExitStatus},
};

/// A temporary directory holding a fake test binary, the XML report it prints, and a fail list.
pub struct FakeRunner {
    dir: Utf8TempDir,
}

impl FakeRunner {
    /// Creates a fake test binary that prints `report` to stdout, then exits with `exit_code`.
    ///
    /// The arguments it was called with are recorded in `args.txt`, one per line.
    pub fn new(report: &str, exit_code: i32) -> Self {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let report_path = dir.path().join("report.xml");
        std::fs::write(&report_path, report).expect("wrote report");

        let script = format!(
            "#!/bin/sh\n\
             for arg in \"$@\"; do echo \"$arg\"; done > '{args}'\n\
             cat '{report_path}'\n\
             exit {exit_code}\n",
            args = dir.path().join("args.txt"),
        );
        let bin = dir.path().join("Luau.UnitTest");
        std::fs::write(&bin, script).expect("wrote fake test binary");
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755))
            .expect("made fake test binary executable");

        Self { dir }
    }

    pub fn root(&self) -> &Utf8Path {
        self.dir.path()
    }

    pub fn bin(&self) -> Utf8PathBuf {
        self.root().join("Luau.UnitTest")
    }

    pub fn fail_list(&self) -> Utf8PathBuf {
        self.root().join("faillist.txt")
    }

    pub fn write_fail_list(&self, contents: &str) -> &Self {
        std::fs::write(self.fail_list(), contents).expect("wrote fail list");
        self
    }

    pub fn read_fail_list(&self) -> String {
        std::fs::read_to_string(self.fail_list()).expect("read fail list")
    }

    /// Returns the arguments the fake test binary was last called with.
    pub fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.root().join("args.txt"))
            .expect("fake test binary recorded its arguments")
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Runs xfail-gate against this fake test binary, from the temporary directory.
    pub fn gate(&self, args: &[&str]) -> GateOutput {
        let mut command = Command::new(env!("CARGO_BIN_EXE_xfail-gate"));
        command
            .arg(self.bin())
            .args(args)
            .current_dir(self.root())
            .env("CARGO_TERM_COLOR", "never")
            .env_remove("XFAIL_GATE_LOG")
            .env_remove("XFAIL_GATE_VERBOSE")
            .env_remove("XFAIL_GATE_FAIL_LIST")
            .env_remove("XFAIL_GATE_CONFIG_FILE");
        let output = command.output().expect("failed to execute xfail-gate");

        GateOutput {
            command,
            exit_status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

pub struct GateOutput {
    pub command: Command,
    pub exit_status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl GateOutput {
    pub fn stdout_as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

impl fmt::Display for GateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command: {:?}\nexit code: {:?}\n\
                   --- stdout ---\n{}\n\n--- stderr ---\n{}\n\n",
            self.command,
            self.exit_status.code(),
            self.stdout_as_str(),
            self.stderr_as_str(),
        )
    }
}

// Make Debug output the same as Display output, so `.unwrap()` and `.expect()` are nicer.
impl fmt::Debug for GateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
