//! Common test utilities and helpers
//!
//! Scratch source trees, a private config directory and a `PATH` holding
//! stand-in tools, so the `kbox` binary can be driven end to end.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Log file the stand-in tools append to, relative to the tools directory
pub const TOOL_LOG: &str = "calls.log";

/// `make` stand-in: logs its arguments and cross variables, writes `.config`
/// for menuconfig and exits with `$FAKE_MAKE_EXIT` (default 0)
const FAKE_MAKE: &str = r#"#!/bin/sh
echo "make $* ARCH=${ARCH:-} CROSS_COMPILE=${CROSS_COMPILE:-}" >> "$KBOX_TOOL_LOG"
case " $* " in
  *" menuconfig "*) echo "CONFIG_TEST=y" > .config ;;
esac
exit "${FAKE_MAKE_EXIT:-0}"
"#;

/// Generic stand-in: logs its name and arguments
const FAKE_TOOL: &str = r#"#!/bin/sh
echo "${0##*/} $*" >> "$KBOX_TOOL_LOG"
exit 0
"#;

/// Test project context
///
/// Holds a source tree, an isolated config directory and a tools directory
/// that becomes the child's whole `PATH`.
pub struct TestProject {
    /// Source tree root
    pub dir: TempDir,
    config: TempDir,
    tools: TempDir,
}

impl TestProject {
    /// Empty project with no tools on `PATH`
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config: TempDir::new().expect("Failed to create temp directory"),
            tools: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Project holding a minimal kernel tree
    pub fn kernel() -> Self {
        let project = Self::new();
        project.create_file("Makefile", "");
        project.create_file("arch/arm64/Kconfig", "");
        project.create_file("kernel/fork.c", "int fork;\n");
        project.create_file("init/main.c", "int main;\n");
        project
    }

    /// Project holding a minimal busybox tree
    pub fn busybox() -> Self {
        let project = Self::new();
        project.create_file("Makefile", "");
        project.create_file("Config.in", "");
        project.create_file("applets/applets.c", "");
        project
    }

    /// Get the path to the source tree
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the source tree
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the source tree
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the source tree
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write `config.toml` into the private config directory
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config.path().join("config.toml"), content)
            .expect("Failed to write config");
    }

    /// Put the `make` stand-in on `PATH`
    pub fn install_make(&self) {
        self.install_tool("make", FAKE_MAKE);
    }

    /// Put logging stand-ins for the named tools on `PATH`
    pub fn install_tools(&self, names: &[&str]) {
        for name in names {
            self.install_tool(name, FAKE_TOOL);
        }
    }

    /// Put a tool with a custom script on `PATH`
    pub fn install_tool(&self, name: &str, script: &str) {
        let path = self.tools.path().join(name);
        std::fs::write(&path, script).expect("Failed to write tool");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("Failed to make tool executable");
        }
    }

    /// Lines logged by the stand-in tools
    pub fn tool_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.tools.path().join(TOOL_LOG))
            .map(|log| log.lines().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// `kbox` command with an isolated config directory and tool `PATH`
    ///
    /// The stand-ins only use shell builtins, so the tools directory is the
    /// whole `PATH`.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kbox"));
        cmd.current_dir(self.dir.path());
        cmd.env("KBOX_CONFIG_DIR", self.config.path());
        cmd.env("KBOX_TOOL_LOG", self.tools.path().join(TOOL_LOG));
        cmd.env("PATH", self.tools.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run `kbox` with the given arguments
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute kbox")
    }

    /// Run `kbox <kind> -p <tree> -c <operation>`
    pub fn run_op(&self, kind: &str, operation: &str) -> Output {
        let root = self.path();
        self.run(&[kind, "-p", path_str(&root), "-c", operation])
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
