//! Integration tests for kernel builds and configuration, driven through a
//! `make` stand-in

#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use common::{path_str, stderr, stdout, TestProject};

/// Config whose deployment architecture never matches the test host
const MIPS_CONFIG: &str = r#"
[build]
deployment_arch = "mips"
cross_compile = "mips-linux-gnu-"
jobs = 3
"#;

#[test]
fn test_build_is_out_of_tree() {
    let project = TestProject::kernel();
    project.install_make();
    project.write_config(MIPS_CONFIG);

    let output = project.run_op("kernel", "build");

    assert!(output.status.success(), "{}", stderr(&output));
    let calls = project.tool_calls();
    assert_eq!(calls.len(), 1);
    let out_dir = project.path().join("out");
    assert!(calls[0].contains(&format!("O={}", out_dir.display())), "{calls:?}");
    assert!(calls[0].contains("-j3"));
    assert!(stdout(&output).contains("==> build finished in"));
}

#[test]
fn test_cross_build_exports_supplied_toolchain() {
    let project = TestProject::kernel();
    project.install_make();
    project.write_config(MIPS_CONFIG);
    let root = project.path();

    let output = project.run(&[
        "kernel",
        "-p",
        path_str(&root),
        "-t",
        "/opt/mips/bin/mipsel-linux-gnu-",
        "-c",
        "build",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let calls = project.tool_calls();
    assert!(
        calls[0].ends_with("ARCH=mips CROSS_COMPILE=/opt/mips/bin/mipsel-linux-gnu-"),
        "{calls:?}"
    );
}

#[test]
fn test_cross_build_falls_back_to_configured_prefix() {
    let project = TestProject::kernel();
    project.install_make();
    project.write_config(MIPS_CONFIG);

    let output = project.run_op("kernel", "build");

    assert!(output.status.success());
    assert!(project.tool_calls()[0].ends_with("CROSS_COMPILE=mips-linux-gnu-"));
}

#[test]
fn test_build_failure_passes_exit_code_through() {
    let project = TestProject::kernel();
    project.install_make();
    project.write_config(MIPS_CONFIG);

    let output = project
        .command()
        .env("FAKE_MAKE_EXIT", "7")
        .args(["kernel", "-p", path_str(&project.path()), "-c", "build"])
        .output()
        .expect("Failed to execute kbox");

    assert_eq!(output.status.code(), Some(7));
    assert!(stdout(&output).contains("(exit 7)"));
}

#[test]
fn test_missing_make_fails_without_masking() {
    let project = TestProject::kernel();

    let output = project.run_op("kernel", "build");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to run 'make'"));
}

#[test]
fn test_config_relocates_into_output() {
    let project = TestProject::kernel();
    project.install_make();
    project.write_config(MIPS_CONFIG);

    let output = project.run_op("kernel", "config");

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(project.tool_calls()[0].starts_with("make menuconfig"));
    assert!(!project.file_exists(".config"));
    assert_eq!(project.read_file("out/.config"), "CONFIG_TEST=y\n");
    assert!(stdout(&output).contains("==> config finished in"));
}

#[test]
fn test_config_after_cleanall_recreates_output() {
    let project = TestProject::kernel();
    project.install_make();
    project.write_config(MIPS_CONFIG);
    project.create_file("out/vmlinux", "elf");

    assert!(project.run_op("kernel", "cleanall").status.success());
    assert!(!project.file_exists("out"));

    assert!(project.run_op("kernel", "config").status.success());
    assert!(project.file_exists("out/.config"));
}

/// `make` stand-in that records its PID in the source root and blocks
const BLOCKING_MAKE: &str = r#"#!/bin/sh
echo $$ > make.pid
exec /bin/sleep 30
"#;

fn process_alive(pid: &str) -> bool {
    std::process::Command::new("kill")
        .args(["-0", pid])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[test]
fn test_interrupt_kills_child_and_exits_130() {
    let project = TestProject::kernel();
    project.install_tool("make", BLOCKING_MAKE);
    project.write_config(MIPS_CONFIG);

    let mut kbox = project
        .command()
        .args(["kernel", "-p", path_str(&project.path()), "-c", "build"])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("Failed to execute kbox");

    let deadline = Instant::now() + Duration::from_secs(10);
    let make_pid = loop {
        let pid = std::fs::read_to_string(project.path().join("make.pid")).unwrap_or_default();
        if !pid.trim().is_empty() {
            break pid.trim().to_string();
        }
        assert!(Instant::now() < deadline, "make never started");
        std::thread::sleep(Duration::from_millis(20));
    };
    // Let kbox reach its interrupt handler
    std::thread::sleep(Duration::from_millis(200));

    let sent = std::process::Command::new("kill")
        .args(["-INT", &kbox.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(sent.success());

    let output = kbox.wait_with_output().expect("Failed to wait for kbox");

    assert_eq!(output.status.code(), Some(130), "{}", stderr(&output));
    assert!(stderr(&output).contains("Interrupted while running 'make'"));
    assert!(!process_alive(&make_pid), "make ({make_pid}) survived the interrupt");
}
