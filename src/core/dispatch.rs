//! Command dispatch
//!
//! Runs one request through validate → resolve → execute. Each operation
//! maps to one or more timed phases; a failed phase stops the ones after it.
//!
//! | operation      | phases                                   |
//! |----------------|------------------------------------------|
//! | `build`        | build (+ install, package for busybox)   |
//! | `clean`        | clean (`make clean`, keeps `out/`)       |
//! | `cleanall`     | clean-all (removes `out/`)               |
//! | `config`       | config (`menuconfig`, then relocation)   |
//! | `resetconfig`  | reset-config (removes `.config` files)   |
//! | `tags`         | generate-index                           |

use std::path::{Path, PathBuf};

use crate::core::build_env::{detect_host_arch, EnvironmentProfile, EnvironmentResolver};
use crate::core::capabilities::CapabilityProber;
use crate::core::clean;
use crate::core::config::KboxConfig;
use crate::core::image::{Packager, PackagingSpec};
use crate::core::index;
use crate::core::kbuild::Kbuild;
use crate::core::phase::{run_phase, Reporter};
use crate::core::request::{BuildRequest, Operation, TargetKind};
use crate::core::target::{validate_source_root, validate_target};
use crate::error::KboxError;
use crate::infra::mounts::PROC_MOUNTS;
use crate::infra::process::{run_checked, CommandRunner};

/// Executes build requests
pub struct Dispatcher<'a, R> {
    runner: &'a R,
    reporter: &'a dyn Reporter,
    config: &'a KboxConfig,
    prober: CapabilityProber,
    host_arch: Box<dyn Fn() -> String + 'a>,
    mount_table: PathBuf,
}

impl<'a, R: CommandRunner> Dispatcher<'a, R> {
    /// Create a dispatcher for the running host
    pub fn new(runner: &'a R, reporter: &'a dyn Reporter, config: &'a KboxConfig) -> Self {
        Self {
            runner,
            reporter,
            config,
            prober: CapabilityProber::new().with_depgraph(config.index.depgraph_enabled),
            host_arch: Box::new(detect_host_arch),
            mount_table: PathBuf::from(PROC_MOUNTS),
        }
    }

    /// Replace host architecture detection
    #[must_use]
    pub fn with_host_arch(mut self, detect: impl Fn() -> String + 'a) -> Self {
        self.host_arch = Box::new(detect);
        self
    }

    /// Replace the optional tool prober
    #[must_use]
    pub fn with_prober(mut self, prober: CapabilityProber) -> Self {
        self.prober = prober;
        self
    }

    /// Read attached mounts from another table
    #[must_use]
    pub fn with_mount_table(mut self, mount_table: PathBuf) -> Self {
        self.mount_table = mount_table;
        self
    }

    /// Build a request from raw arguments and execute it
    pub async fn run_args(
        &self,
        kind: TargetKind,
        target_path: Option<PathBuf>,
        toolchain_path: Option<String>,
        operation: Option<&str>,
    ) -> Result<(), KboxError> {
        let request = BuildRequest::from_args(kind, target_path, toolchain_path, operation)?;
        self.execute(request).await
    }

    /// Execute exactly one operation
    pub async fn execute(&self, request: BuildRequest) -> Result<(), KboxError> {
        validate_target(request.target_path(), request.target_kind())?;
        let profile = self.resolve(&request);

        tracing::info!(
            "{} {} in {}",
            request.target_kind(),
            request.operation(),
            request.target_path().display()
        );

        let kbuild = Kbuild::new(
            request.target_path(),
            &self.config.build.output_dir,
            &profile,
            self.config.build.jobs(),
        );
        let phase = request.operation().phase_name();

        match request.operation() {
            Operation::Build => self.build(request.target_kind(), &kbuild).await,
            Operation::Clean => self.timed(phase, self.clean(&kbuild)).await,
            Operation::CleanAll => self.timed(phase, self.clean_all(&kbuild)).await,
            Operation::Config => self.timed(phase, self.configure(&kbuild)).await,
            Operation::ResetConfig => self.timed(phase, self.reset_config(&kbuild)).await,
            Operation::GenerateIndex => self.index_phase(request.target_path()).await,
        }
    }

    /// Validate and index an arbitrary source root
    pub async fn run_index(&self, target_path: Option<PathBuf>) -> Result<(), KboxError> {
        let root = target_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(KboxError::MissingTargetPath)?;
        validate_source_root(&root)?;
        self.index_phase(&root).await
    }

    fn resolve(&self, request: &BuildRequest) -> EnvironmentProfile {
        let host = (self.host_arch)();
        let resolver = EnvironmentResolver::new(
            &self.config.build.deployment_arch,
            &self.config.build.cross_compile,
        );
        resolver.resolve(&host, request.toolchain_path())
    }

    async fn timed<T>(
        &self,
        name: &str,
        phase: impl std::future::Future<Output = Result<T, KboxError>>,
    ) -> Result<T, KboxError> {
        run_phase(name, self.reporter, phase).await
    }

    async fn build(&self, kind: TargetKind, kbuild: &Kbuild<'_>) -> Result<(), KboxError> {
        self.timed(
            "build",
            run_checked(self.runner, "build", "make", &kbuild.build()),
        )
        .await?;

        if kind == TargetKind::Busybox {
            let spec = PackagingSpec::from_config(kbuild.out_dir(), &self.config.package);
            self.timed(
                "install",
                run_checked(self.runner, "install", "make install", &kbuild.install(&spec.staging_dir)),
            )
            .await?;

            let packager = Packager::new(self.runner)
                .with_privilege(self.config.package.privilege())
                .with_mount_table(self.mount_table.clone());
            self.timed("package", packager.package(&spec)).await?;
        }
        Ok(())
    }

    async fn clean(&self, kbuild: &Kbuild<'_>) -> Result<(), KboxError> {
        if !clean::has_build_output(kbuild.out_dir()) {
            tracing::info!("Nothing to clean in {}", kbuild.out_dir().display());
            return Ok(());
        }
        run_checked(self.runner, "clean", "make clean", &kbuild.clean()).await
    }

    async fn clean_all(&self, kbuild: &Kbuild<'_>) -> Result<(), KboxError> {
        let result = clean::clean_all(kbuild.out_dir())?;
        for path in &result.removed {
            tracing::info!("Removed {}", path.display());
        }
        Ok(())
    }

    async fn configure(&self, kbuild: &Kbuild<'_>) -> Result<(), KboxError> {
        run_checked(self.runner, "config", "menuconfig", &kbuild.menuconfig()).await?;
        let dest = clean::relocate_config(kbuild.root(), kbuild.out_dir())?;
        tracing::info!("Configuration saved to {}", dest.display());
        Ok(())
    }

    async fn reset_config(&self, kbuild: &Kbuild<'_>) -> Result<(), KboxError> {
        let result = clean::reset_config(kbuild.root(), kbuild.out_dir())?;
        for path in &result.removed {
            tracing::info!("Removed {}", path.display());
        }
        Ok(())
    }

    async fn index_phase(&self, root: &Path) -> Result<(), KboxError> {
        let report = self.prober.probe();
        for advisory in report.advisories() {
            self.reporter.advisory(&advisory);
        }
        let capabilities = report.capabilities;
        if capabilities.is_empty() {
            tracing::warn!("No indexers available, generating the file list only");
        }

        self.timed(Operation::GenerateIndex.phase_name(), async {
            let files = index::collect_sources(
                root,
                &self.config.index.extensions,
                &self.config.build.output_dir,
            );
            let list = index::write_file_list(root, &files)?;
            tracing::info!("Indexed {} files into {}", files.len(), list.display());

            for (tool, invocation) in index::index_invocations(root, &capabilities) {
                run_checked(self.runner, "generate-index", tool, &invocation).await?;
            }
            Ok(())
        })
        .await
    }
}
