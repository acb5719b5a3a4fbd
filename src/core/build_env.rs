//! Build environment resolution
//!
//! Decides whether a build is native or cross and produces the
//! [`EnvironmentProfile`] handed to every make invocation.
//!
//! Cross variables (`CROSS_COMPILE`, `ARCH`) are exported only when the host
//! architecture differs from the deployment architecture. On a matching host
//! the profile is empty and the build system falls back to its native
//! defaults; exporting a prefix there would break the native build.

use std::collections::BTreeMap;

/// Variable holding the cross-toolchain prefix
pub const CROSS_COMPILE_VAR: &str = "CROSS_COMPILE";

/// Variable holding the kernel target architecture
pub const ARCH_VAR: &str = "ARCH";

/// Resolved build environment for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    host_arch: String,
    cross_toolchain_prefix: Option<String>,
    target_arch: Option<String>,
}

impl EnvironmentProfile {
    /// Profile for a build that runs on its own deployment architecture
    pub fn native(host_arch: &str) -> Self {
        Self {
            host_arch: host_arch.to_string(),
            cross_toolchain_prefix: None,
            target_arch: None,
        }
    }

    /// Profile for a cross build
    pub fn cross(host_arch: &str, prefix: &str, target_arch: &str) -> Self {
        Self {
            host_arch: host_arch.to_string(),
            cross_toolchain_prefix: Some(prefix.to_string()),
            target_arch: Some(target_arch.to_string()),
        }
    }

    pub fn host_arch(&self) -> &str {
        &self.host_arch
    }

    pub fn cross_toolchain_prefix(&self) -> Option<&str> {
        self.cross_toolchain_prefix.as_deref()
    }

    pub fn target_arch(&self) -> Option<&str> {
        self.target_arch.as_deref()
    }

    pub fn is_cross(&self) -> bool {
        self.cross_toolchain_prefix.is_some()
    }

    /// Variables to add to each child's environment
    ///
    /// Empty for native builds.
    pub fn to_env_map(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        if let Some(prefix) = &self.cross_toolchain_prefix {
            env.insert(CROSS_COMPILE_VAR.to_string(), prefix.clone());
        }
        if let Some(arch) = &self.target_arch {
            env.insert(ARCH_VAR.to_string(), arch.clone());
        }
        env
    }
}

/// Host machine name of the running binary (`uname -m` style)
pub fn detect_host_arch() -> String {
    std::env::consts::ARCH.to_string()
}

/// Map a machine name to the kernel's `ARCH` naming
pub fn kernel_arch(machine: &str) -> &str {
    match machine {
        "aarch64" | "arm64" => "arm64",
        m if m.starts_with("arm") => "arm",
        "x86_64" | "amd64" | "x86" | "i386" | "i486" | "i586" | "i686" => "x86",
        "riscv64" | "riscv32" | "riscv" => "riscv",
        "powerpc" | "powerpc64" | "ppc64le" => "powerpc",
        "mips" | "mipsel" | "mips64" => "mips",
        other => other,
    }
}

/// Resolves an [`EnvironmentProfile`] from host and toolchain information
#[derive(Debug, Clone)]
pub struct EnvironmentResolver {
    deployment_arch: String,
    default_prefix: String,
}

impl EnvironmentResolver {
    /// Create a resolver for the given deployment architecture
    ///
    /// `default_prefix` is used on cross hosts when no toolchain is supplied.
    pub fn new(deployment_arch: &str, default_prefix: &str) -> Self {
        Self {
            deployment_arch: deployment_arch.to_string(),
            default_prefix: default_prefix.to_string(),
        }
    }

    /// Whether a host can build for the deployment architecture natively
    pub fn is_native(&self, host_arch: &str) -> bool {
        kernel_arch(host_arch) == kernel_arch(&self.deployment_arch)
    }

    /// Resolve the profile for `host_arch`
    pub fn resolve(&self, host_arch: &str, toolchain: Option<&str>) -> EnvironmentProfile {
        if self.is_native(host_arch) {
            if toolchain.is_some() {
                tracing::info!(
                    "Host {host_arch} matches deployment arch {}, ignoring toolchain prefix",
                    self.deployment_arch
                );
            }
            return EnvironmentProfile::native(host_arch);
        }

        let prefix = toolchain.unwrap_or(&self.default_prefix);
        tracing::info!(
            "Cross build from {host_arch} to {} with {prefix}",
            self.deployment_arch
        );
        EnvironmentProfile::cross(host_arch, prefix, &self.deployment_arch)
    }
}
