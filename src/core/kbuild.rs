//! Kbuild make invocations
//!
//! The kernel and busybox share the Kbuild make interface, so one generator
//! produces the invocations for both: out-of-tree builds with `O=<out>`,
//! `clean`, `menuconfig` and the busybox `install` target.
//!
//! Every invocation runs in the source root and carries the cross variables
//! from the [`EnvironmentProfile`]; nothing is set on the orchestrator's own
//! environment.

use std::path::{Path, PathBuf};

use crate::core::build_env::EnvironmentProfile;
use crate::infra::process::Invocation;

/// Program used for all Kbuild targets
pub const MAKE: &str = "make";

/// Kbuild invocation generator for one source root
#[derive(Debug, Clone)]
pub struct Kbuild<'a> {
    root: &'a Path,
    out_dir: PathBuf,
    profile: &'a EnvironmentProfile,
    jobs: usize,
}

impl<'a> Kbuild<'a> {
    /// Create a generator for `root` writing to `root/<output_dir>`
    pub fn new(root: &'a Path, output_dir: &str, profile: &'a EnvironmentProfile, jobs: usize) -> Self {
        Self {
            root,
            out_dir: root.join(output_dir),
            profile,
            jobs: jobs.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    fn make(&self) -> Invocation {
        Invocation::new(MAKE)
            .current_dir(self.root)
            .envs(self.profile.to_env_map())
    }

    fn out_arg(&self) -> String {
        format!("O={}", self.out_dir.display())
    }

    /// `make O=<out> -jN`
    pub fn build(&self) -> Invocation {
        self.make()
            .arg(self.out_arg())
            .arg(format!("-j{}", self.jobs))
    }

    /// `make O=<out> clean`: removes objects, keeps `.config`
    pub fn clean(&self) -> Invocation {
        self.make().arg(self.out_arg()).arg("clean")
    }

    /// `make menuconfig` in the source root
    ///
    /// Writes `<root>/.config`, which the caller relocates into the output
    /// directory.
    pub fn menuconfig(&self) -> Invocation {
        self.make().arg("menuconfig")
    }

    /// `make O=<out> CONFIG_PREFIX=<staging> install`
    pub fn install(&self, staging_dir: &Path) -> Invocation {
        self.make()
            .arg(self.out_arg())
            .arg(format!("CONFIG_PREFIX={}", staging_dir.display()))
            .arg("install")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross() -> EnvironmentProfile {
        EnvironmentProfile::cross("x86_64", "aarch64-linux-gnu-", "arm64")
    }

    #[test]
    fn test_build_is_out_of_tree_and_parallel() {
        let profile = cross();
        let kbuild = Kbuild::new(Path::new("/src/linux"), "out", &profile, 8);
        let inv = kbuild.build();

        assert_eq!(inv.program, "make");
        assert_eq!(inv.args, vec!["O=/src/linux/out", "-j8"]);
        assert_eq!(inv.cwd.as_deref(), Some(Path::new("/src/linux")));
        assert_eq!(inv.env.get("ARCH").unwrap(), "arm64");
        assert_eq!(inv.env.get("CROSS_COMPILE").unwrap(), "aarch64-linux-gnu-");
    }

    #[test]
    fn test_native_build_exports_nothing() {
        let profile = EnvironmentProfile::native("aarch64");
        let kbuild = Kbuild::new(Path::new("/src/linux"), "out", &profile, 4);
        assert!(kbuild.build().env.is_empty());
        assert!(kbuild.menuconfig().env.is_empty());
    }

    #[test]
    fn test_clean_keeps_output_dir_argument() {
        let profile = cross();
        let kbuild = Kbuild::new(Path::new("/src/linux"), "out", &profile, 4);
        assert_eq!(kbuild.clean().args, vec!["O=/src/linux/out", "clean"]);
    }

    #[test]
    fn test_menuconfig_runs_in_source_root() {
        let profile = cross();
        let kbuild = Kbuild::new(Path::new("/src/linux"), "out", &profile, 4);
        let inv = kbuild.menuconfig();
        assert_eq!(inv.args, vec!["menuconfig"]);
        assert_eq!(inv.cwd.as_deref(), Some(Path::new("/src/linux")));
    }

    #[test]
    fn test_install_targets_staging_dir() {
        let profile = EnvironmentProfile::native("aarch64");
        let kbuild = Kbuild::new(Path::new("/src/busybox"), "out", &profile, 2);
        let inv = kbuild.install(Path::new("/src/busybox/out/_install"));
        assert_eq!(
            inv.args,
            vec![
                "O=/src/busybox/out",
                "CONFIG_PREFIX=/src/busybox/out/_install",
                "install"
            ]
        );
    }

    #[test]
    fn test_zero_jobs_is_clamped() {
        let profile = EnvironmentProfile::native("aarch64");
        let kbuild = Kbuild::new(Path::new("/src"), "out", &profile, 0);
        assert_eq!(kbuild.jobs(), 1);
    }
}
