//! CLI implementation for `kbox tags`

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::commands::print_usage;
use crate::cli::output::ConsoleReporter;
use crate::cli::Context;
use crate::core::dispatch::Dispatcher;
use crate::infra::process::SystemRunner;

/// Generate source indexes for the tree at `path`
pub async fn execute(ctx: &Context, path: Option<PathBuf>) -> Result<()> {
    let runner = SystemRunner;
    let reporter = ConsoleReporter::new(ctx.output);
    let dispatcher = Dispatcher::new(&runner, &reporter, &ctx.config);

    dispatcher.run_index(path).await.map_err(|e| {
        if e.is_usage() {
            print_usage("tags");
        }
        e.into()
    })
}
