//! Root filesystem image packaging
//!
//! Turns the busybox install staging tree into a loop-mountable image:
//! allocate, format, mount, copy, unmount. A failed allocation, format or
//! mount stops everything after it, and the copy only ever runs against a
//! successful mount. Once the mount succeeds the unmount always runs.

use std::path::{Path, PathBuf};

use crate::core::config::PackageConfig;
use crate::error::KboxError;
use crate::infra::filesystem;
use crate::infra::mounts::{self, PROC_MOUNTS};
use crate::infra::process::{run_checked, CommandRunner, Invocation};

/// Phase name used for packaging failures
pub const PACKAGE_PHASE: &str = "package";

/// What to package and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingSpec {
    /// Populated install tree
    pub staging_dir: PathBuf,
    /// Backing image file to create
    pub image_path: PathBuf,
    /// Image size in MiB
    pub size_mb: u64,
    /// Scratch mount point
    pub mount_point: PathBuf,
    /// Filesystem type (`mkfs.<fs_type>`)
    pub fs_type: String,
}

impl PackagingSpec {
    /// Build a spec from configuration, with paths under `out_dir`
    pub fn from_config(out_dir: &Path, config: &PackageConfig) -> Self {
        Self {
            staging_dir: out_dir.join(&config.staging_dir),
            image_path: out_dir.join(&config.image),
            size_mb: config.size_mb,
            mount_point: config.mount_point.clone(),
            fs_type: config.fs_type.clone(),
        }
    }
}

/// Runs the packaging steps through a [`CommandRunner`]
pub struct Packager<'a, R> {
    runner: &'a R,
    privilege: Option<String>,
    mount_table: PathBuf,
}

impl<'a, R: CommandRunner> Packager<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self {
            runner,
            privilege: None,
            mount_table: PathBuf::from(PROC_MOUNTS),
        }
    }

    /// Wrap mount, copy and unmount with a privilege command such as `sudo`
    #[must_use]
    pub fn with_privilege(mut self, privilege: Option<&str>) -> Self {
        self.privilege = privilege.map(ToString::to_string);
        self
    }

    /// Read attached mounts from another table than `/proc/self/mounts`
    #[must_use]
    pub fn with_mount_table(mut self, mount_table: PathBuf) -> Self {
        self.mount_table = mount_table;
        self
    }

    fn privileged(&self, invocation: Invocation) -> Invocation {
        invocation.privileged(self.privilege.as_deref())
    }

    pub fn allocate(&self, spec: &PackagingSpec) -> Invocation {
        Invocation::new("dd").args([
            "if=/dev/zero".to_string(),
            format!("of={}", spec.image_path.display()),
            "bs=1M".to_string(),
            format!("count={}", spec.size_mb),
        ])
    }

    pub fn format(&self, spec: &PackagingSpec) -> Invocation {
        Invocation::new(format!("mkfs.{}", spec.fs_type))
            .arg("-F")
            .arg(spec.image_path.display().to_string())
    }

    pub fn mount(&self, spec: &PackagingSpec) -> Invocation {
        self.privileged(Invocation::new("mount").args([
            "-o".to_string(),
            "loop".to_string(),
            spec.image_path.display().to_string(),
            spec.mount_point.display().to_string(),
        ]))
    }

    pub fn copy(&self, spec: &PackagingSpec) -> Invocation {
        self.privileged(Invocation::new("cp").args([
            "-a".to_string(),
            format!("{}/.", spec.staging_dir.display()),
            spec.mount_point.display().to_string(),
        ]))
    }

    pub fn unmount(&self, spec: &PackagingSpec) -> Invocation {
        self.privileged(Invocation::new("umount").arg(spec.mount_point.display().to_string()))
    }

    async fn step(&self, step: &str, invocation: Invocation) -> Result<(), KboxError> {
        tracing::info!("Packaging: {step}");
        run_checked(self.runner, PACKAGE_PHASE, step, &invocation).await
    }

    /// Detach a mount left behind by an earlier failed run
    async fn release_stale_mount(&self, spec: &PackagingSpec) -> Result<(), KboxError> {
        if mounts::is_mounted(&self.mount_table, &spec.mount_point) {
            tracing::warn!(
                "{} is still mounted from a previous run, unmounting",
                spec.mount_point.display()
            );
            self.step("release stale mount", self.unmount(spec)).await?;
        }
        Ok(())
    }

    /// Package the staging tree into the image
    pub async fn package(&self, spec: &PackagingSpec) -> Result<(), KboxError> {
        if !spec.staging_dir.is_dir() {
            return Err(KboxError::MissingStaging {
                path: spec.staging_dir.clone(),
            });
        }

        filesystem::create_dir_all(&spec.mount_point)?;
        self.release_stale_mount(spec).await?;

        self.step("allocate", self.allocate(spec)).await?;
        self.step("format", self.format(spec)).await?;
        self.step("mount", self.mount(spec)).await?;

        let copied = self.step("copy", self.copy(spec)).await;
        let unmounted = self.step("unmount", self.unmount(spec)).await;

        match (copied, unmounted) {
            (Err(copy_err), Err(unmount_err)) => {
                tracing::error!("Unmount after failed copy also failed: {unmount_err}");
                Err(copy_err)
            }
            (Err(copy_err), Ok(())) => Err(copy_err),
            (Ok(()), unmounted) => unmounted,
        }?;

        tracing::info!(
            "Created {} ({} MiB)",
            spec.image_path.display(),
            spec.size_mb
        );
        Ok(())
    }
}
