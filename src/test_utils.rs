//! Test utilities
//!
//! Fake source trees, a recording [`CommandRunner`] and a recording
//! [`Reporter`] so orchestration can be tested without make, mkfs or mount.

use std::cell::RefCell;
use std::path::Path;

use tempfile::TempDir;

use crate::core::phase::{PhaseResult, Reporter};
use crate::error::KboxError;
use crate::infra::process::{CommandRunner, ExitStatus, Invocation};

type Predicate = Box<dyn Fn(&Invocation) -> bool>;
type Hook = Box<dyn Fn(&Invocation)>;

/// Command runner that records invocations instead of running them
///
/// Every invocation succeeds unless a `fail_when` predicate matches it.
#[derive(Default)]
pub struct SpyRunner {
    calls: RefCell<Vec<Invocation>>,
    failures: Vec<(Predicate, ExitStatus)>,
    hooks: Vec<Hook>,
}

impl SpyRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `status` for invocations matching `predicate`
    #[must_use]
    pub fn fail_when(
        mut self,
        predicate: impl Fn(&Invocation) -> bool + 'static,
        status: ExitStatus,
    ) -> Self {
        self.failures.push((Box::new(predicate), status));
        self
    }

    /// Run `hook` for every invocation, to simulate side effects
    #[must_use]
    pub fn on_run(mut self, hook: impl Fn(&Invocation) + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Everything run so far, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for SpyRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExitStatus, KboxError> {
        self.calls.borrow_mut().push(invocation.clone());
        for hook in &self.hooks {
            hook(invocation);
        }
        let status = self
            .failures
            .iter()
            .find(|(predicate, _)| predicate(invocation))
            .map_or(ExitStatus::SUCCESS, |(_, status)| *status);
        Ok(status)
    }
}

/// Whether `word` is the program or one of the arguments
pub fn mentions(invocation: &Invocation, word: &str) -> bool {
    invocation.program == word || invocation.args.iter().any(|a| a == word)
}

/// Reporter that keeps everything it is given
#[derive(Default)]
pub struct RecordingReporter {
    phases: RefCell<Vec<PhaseResult>>,
    advisories: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn phases(&self) -> Vec<PhaseResult> {
        self.phases.borrow().clone()
    }

    pub fn advisories(&self) -> Vec<String> {
        self.advisories.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn phase(&self, result: &PhaseResult) {
        self.phases.borrow_mut().push(result.clone());
    }

    fn advisory(&self, warning: &KboxError) {
        self.advisories.borrow_mut().push(warning.to_string());
    }
}

fn touch(root: &Path, file: &str) {
    let path = root.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, "").expect("Failed to write file");
}

/// Minimal kernel source root
pub fn kernel_tree() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    touch(dir.path(), "Makefile");
    touch(dir.path(), "arch/arm64/Kconfig");
    touch(dir.path(), "kernel/fork.c");
    touch(dir.path(), "init/main.c");
    dir
}

/// Minimal busybox source root
pub fn busybox_tree() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    touch(dir.path(), "Makefile");
    touch(dir.path(), "Config.in");
    touch(dir.path(), "applets/applets.c");
    dir
}

/// Directory holding executable stand-ins for the named tools
pub fn fake_tool_dir(tools: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for tool in tools {
        let path = dir.path().join(tool);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").expect("Failed to write tool");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("Failed to make tool executable");
        }
    }
    dir
}

pub mod generators {
    use proptest::prelude::*;

    /// Machine names as reported by `uname -m`
    pub fn host_machine() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("x86_64".to_string()),
            Just("aarch64".to_string()),
            Just("armv7l".to_string()),
            Just("riscv64".to_string()),
        ]
    }

    /// Absolute cross-toolchain prefixes
    pub fn toolchain_prefix() -> impl Strategy<Value = String> {
        ("[a-z]{2,8}", "[a-z0-9]{2,10}")
            .prop_map(|(dir, triple)| format!("/opt/{dir}/bin/{triple}-linux-gnu-"))
    }
}
