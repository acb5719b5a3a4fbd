//! External process execution
//!
//! Every build, format, mount and indexing step is a child process described
//! by an [`Invocation`] and executed through a [`CommandRunner`]. The system
//! runner blocks on one child at a time and terminates it when the operator
//! interrupts the invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::KboxError;

/// A fully described child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments, not including the program
    pub args: Vec<String>,
    /// Working directory for the child
    pub cwd: Option<PathBuf>,
    /// Variables added to the inherited environment
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add environment variables
    #[must_use]
    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env.extend(vars);
        self
    }

    /// Run through a privilege wrapper such as `sudo`
    ///
    /// `None` or an empty wrapper leaves the invocation unchanged.
    #[must_use]
    pub fn privileged(self, wrapper: Option<&str>) -> Self {
        match wrapper.map(str::trim).filter(|w| !w.is_empty()) {
            Some(wrapper) => {
                let mut args = Vec::with_capacity(self.args.len() + 1);
                args.push(self.program);
                args.extend(self.args);
                Self {
                    program: wrapper.to_string(),
                    args,
                    cwd: self.cwd,
                    env: self.env,
                }
            }
            None => self,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitStatus {
    code: Option<i32>,
    signal: Option<i32>,
}

impl ExitStatus {
    /// Successful exit
    pub const SUCCESS: Self = Self {
        code: Some(0),
        signal: None,
    };

    /// Exit with the given code
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Termination by the given signal
    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn signal(&self) -> Option<i32> {
        self.signal
    }

    /// Shell-style exit code: the code itself, or 128 + signal
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => write!(f, "unknown status"),
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

/// Executes invocations
///
/// Implementations block (asynchronously) until the child has exited.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run the invocation to completion and return its exit status
    async fn run(&self, invocation: &Invocation) -> Result<ExitStatus, KboxError>;
}

/// Runs invocations as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExitStatus, KboxError> {
        tracing::debug!("Running: {invocation}");

        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(&invocation.env)
            .kill_on_drop(true);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let spawn_error = |e: std::io::Error| KboxError::Spawn {
            program: invocation.program.clone(),
            error: e.to_string(),
        };

        let mut child = command.spawn().map_err(spawn_error)?;

        tokio::select! {
            status = child.wait() => Ok(status.map_err(spawn_error)?.into()),
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupt received, terminating '{}'", invocation.program);
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to terminate '{}': {e}", invocation.program);
                }
                Err(KboxError::Interrupted {
                    program: invocation.program.clone(),
                })
            }
        }
    }
}

/// Run an invocation and turn a non-zero exit into [`KboxError::ExternalPhaseFailure`]
pub async fn run_checked<R: CommandRunner>(
    runner: &R,
    phase: &str,
    step: &str,
    invocation: &Invocation,
) -> Result<(), KboxError> {
    let status = runner.run(invocation).await?;
    if status.success() {
        Ok(())
    } else {
        tracing::error!("Step '{step}' of phase '{phase}' failed ({status}): {invocation}");
        Err(KboxError::ExternalPhaseFailure {
            phase: phase.to_string(),
            step: step.to_string(),
            status,
        })
    }
}
