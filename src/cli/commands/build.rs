//! CLI implementation for `kbox kernel` and `kbox busybox`

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::commands::print_usage;
use crate::cli::output::ConsoleReporter;
use crate::cli::Context;
use crate::core::dispatch::Dispatcher;
use crate::core::request::TargetKind;
use crate::infra::process::SystemRunner;

/// Execute one operation on a kernel or busybox tree
pub async fn execute(
    ctx: &Context,
    kind: TargetKind,
    path: Option<PathBuf>,
    toolchain: Option<String>,
    operation: Option<&str>,
) -> Result<()> {
    let runner = SystemRunner;
    let reporter = ConsoleReporter::new(ctx.output);
    let dispatcher = Dispatcher::new(&runner, &reporter, &ctx.config);

    match dispatcher.run_args(kind, path, toolchain, operation).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if e.is_usage() {
                print_usage(kind.name());
            }
            Err(e.into())
        }
    }
}
