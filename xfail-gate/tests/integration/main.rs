// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! These tests run the built `xfail-gate` binary against fake test binaries: shell scripts that
//! print a canned XML report. They're Unix-only for that reason.

#![cfg(unix)]

use indoc::indoc;
use pretty_assertions::assert_eq;

mod fixtures;

use fixtures::FakeRunner;

/// `Suite.A` fails, `Suite.B` passes.
const A_FAILS_B_PASSES: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <doctest binary="Luau.UnitTest">
      <Options order_by="file" rand_seed="0" first="0" last="4294967295" abort_after="0" subcase_filter_levels="2147483647" case_sensitive="false" no_throw="false" no_skip="false"/>
      <TestSuite name="Suite">
        <TestCase name="A" filename="tests/Suite.test.cpp" line="10">
          <Expression success="false" type="CHECK" filename="tests/Suite.test.cpp" line="12">
            <Original>1 == 2</Original>
          </Expression>
          <OverallResultsAsserts successes="0" failures="1" test_case_success="false"/>
        </TestCase>
        <TestCase name="B" filename="tests/Suite.test.cpp" line="20">
          <OverallResultsAsserts successes="3" failures="0" test_case_success="true"/>
        </TestCase>
      </TestSuite>
      <OverallResultsAsserts successes="3" failures="1"/>
      <OverallResultsTestCases unskipped="2" skipped="0"/>
    </doctest>
"#};

/// Every test passes.
const ALL_PASS: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <doctest binary="Luau.UnitTest">
      <TestSuite name="Suite">
        <TestCase name="A">
          <OverallResultsAsserts successes="1" failures="0" test_case_success="true"/>
        </TestCase>
      </TestSuite>
      <OverallResultsTestCases unskipped="1" skipped="0"/>
    </doctest>
"#};

/// Every test reconciles against an empty fail list, but one test was skipped.
const SKIPPED: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <doctest binary="Luau.UnitTest">
      <TestSuite name="Suite">
        <TestCase name="A">
          <OverallResultsAsserts successes="1" failures="0" test_case_success="true"/>
        </TestCase>
      </TestSuite>
      <OverallResultsTestCases unskipped="1" skipped="1"/>
    </doctest>
"#};

/// The runner died partway through `Crashy.segfaults`.
const TRUNCATED: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <doctest binary="Luau.UnitTest">
      <TestSuite name="Suite">
        <TestCase name="A">
          <OverallResultsAsserts successes="0" failures="1" test_case_success="false"/>
        </TestCase>
      </TestSuite>
      <TestSuite name="Crashy">
        <TestCase name="segfaults">
          <Expression success="false"
"#};

/// Tests named so that byte order and case-insensitive order differ.
const MIXED_CASE: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <doctest binary="Luau.UnitTest">
      <TestSuite name="beta">
        <TestCase name="x">
          <OverallResultsAsserts successes="0" failures="1" test_case_success="false"/>
        </TestCase>
      </TestSuite>
      <TestSuite name="Alpha">
        <TestCase name="y">
          <OverallResultsAsserts successes="0" failures="1" test_case_success="false"/>
        </TestCase>
        <TestCase name="passes">
          <OverallResultsAsserts successes="1" failures="0" test_case_success="true"/>
        </TestCase>
      </TestSuite>
      <TestSuite name="Gamma">
        <TestCase name="z">
          <OverallResultsAsserts successes="0" failures="1" test_case_success="false"/>
        </TestCase>
      </TestSuite>
      <OverallResultsTestCases unskipped="4" skipped="0"/>
    </doctest>
"#};

const DEFAULT_FFLAGS: &str = "--fflags=true,DebugLuauDeferredConstraintResolution=true";

#[test]
fn known_failure_passes_gate() {
    let runner = FakeRunner::new(A_FAILS_B_PASSES, 1);
    runner.write_fail_list("Suite.A\n");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
    assert_eq!(output.stdout_as_str(), "", "stdout is reserved for --dump");
    let stderr = output.stderr_as_str();
    assert!(!stderr.contains("UNEXPECTED"), "{output}");
    assert!(stderr.contains("everything in order!"), "{output}");
}

#[test]
fn new_failure_fails_gate() {
    let runner = FakeRunner::new(A_FAILS_B_PASSES, 1);
    runner.write_fail_list("");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(1), "{output}");
    let stderr = output.stderr_as_str();
    assert!(
        stderr.contains("UNEXPECTED: Suite.A should have passed\n"),
        "{output}"
    );
    assert!(!stderr.contains("Suite.B"), "{output}");
}

#[test]
fn fixed_test_fails_gate() {
    let runner = FakeRunner::new(ALL_PASS, 0);
    runner.write_fail_list("Suite.A\n");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(1), "{output}");
    assert!(
        output
            .stderr_as_str()
            .contains("UNEXPECTED: Suite.A should have failed\n"),
        "{output}"
    );
}

#[test]
fn skipped_tests_fail_gate() {
    let runner = FakeRunner::new(SKIPPED, 0);
    runner.write_fail_list("");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(1), "{output}");
    let stderr = output.stderr_as_str();
    assert!(!stderr.contains("UNEXPECTED"), "{output}");
    assert!(stderr.contains("1 test(s) were skipped!"), "{output}");
}

#[test]
fn truncated_stream_fails_gate_without_writing() {
    let runner = FakeRunner::new(TRUNCATED, 139);
    runner.write_fail_list("Old.entry\n");

    let output = runner.gate(&["--write"]);
    assert_eq!(output.exit_status.code(), Some(1), "{output}");
    assert!(
        output
            .stderr_as_str()
            .contains("during test `Crashy.segfaults`"),
        "{output}"
    );
    assert_eq!(runner.read_fail_list(), "Old.entry\n");
}

#[test]
fn write_replaces_fail_list_sorted() {
    let runner = FakeRunner::new(MIXED_CASE, 1);
    runner.write_fail_list("Alpha.passes\nRemoved.test\n");

    let output = runner.gate(&["--write"]);
    assert_eq!(output.exit_status.code(), Some(1), "{output}");
    let stderr = output.stderr_as_str();
    assert!(
        stderr.contains("info: updated `") && stderr.contains("faillist.txt`"),
        "{output}"
    );
    assert_eq!(runner.read_fail_list(), "Alpha.y\nbeta.x\nGamma.z\n");

    // The rewritten fail list matches the run.
    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
}

#[test]
fn dump_passes_stream_through() {
    let runner = FakeRunner::new(A_FAILS_B_PASSES, 1);
    runner.write_fail_list("");

    let output = runner.gate(&["--dump"]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
    assert_eq!(output.stdout_as_str(), A_FAILS_B_PASSES);
    assert!(!output.stderr_as_str().contains("UNEXPECTED"), "{output}");
}

#[test]
fn missing_fail_list_fails_before_launch() {
    let runner = FakeRunner::new(ALL_PASS, 0);

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(1), "{output}");
    assert!(
        output.stderr_as_str().contains("does not exist"),
        "{output}"
    );
    assert!(
        !runner.root().join("args.txt").exists(),
        "fake test binary was not launched"
    );
}

#[test]
fn test_binary_arguments() {
    let runner = FakeRunner::new(ALL_PASS, 0);
    runner.write_fail_list("");

    runner.gate(&[]);
    assert_eq!(
        runner.recorded_args(),
        ["--reporters=xml", DEFAULT_FFLAGS]
    );

    runner.gate(&["--randomize"]);
    assert_eq!(
        runner.recorded_args(),
        ["--reporters=xml", DEFAULT_FFLAGS, "--randomize"]
    );

    runner.gate(&["--randomize", "--random-seed", "0"]);
    assert_eq!(
        runner.recorded_args(),
        ["--reporters=xml", DEFAULT_FFLAGS, "--random-seed=0"]
    );
}

#[test]
fn config_file_overrides_defaults() {
    let runner = FakeRunner::new(ALL_PASS, 0);
    std::fs::create_dir_all(runner.root().join(".config")).expect("created .config");
    std::fs::write(
        runner.root().join(".config/xfail-gate.toml"),
        indoc! {r#"
            fail-list = "tests/known-failures.txt"
            fflags = []
        "#},
    )
    .expect("wrote config");
    std::fs::create_dir_all(runner.root().join("tests")).expect("created tests dir");
    std::fs::write(runner.root().join("tests/known-failures.txt"), "").expect("wrote fail list");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
    assert_eq!(runner.recorded_args(), ["--reporters=xml"]);
}

#[test]
fn fail_list_option_overrides_config() {
    let runner = FakeRunner::new(A_FAILS_B_PASSES, 1);
    runner.write_fail_list("");
    std::fs::write(runner.root().join("other.txt"), "Suite.A\n").expect("wrote fail list");

    let output = runner.gate(&["--fail-list", "other.txt"]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
}

#[test]
fn test_binary_exit_code_is_ignored() {
    let runner = FakeRunner::new(ALL_PASS, 3);
    runner.write_fail_list("");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
}

#[test]
fn unreported_fail_list_entries_warn() {
    let runner = FakeRunner::new(A_FAILS_B_PASSES, 1);
    runner.write_fail_list("Suite.A\nSuite.Removed\n");

    let output = runner.gate(&[]);
    assert_eq!(output.exit_status.code(), Some(0), "{output}");
    assert!(
        output
            .stderr_as_str()
            .contains("warning: 1 fail list entries were not reported by this run"),
        "{output}"
    );
}
