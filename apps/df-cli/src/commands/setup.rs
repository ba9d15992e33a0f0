// setup.rs - `dorgflow setup`: create the feature branch, then update it.

use anyhow::Context as _;
use df_workflow::SetupRunner;

use super::{check_success, print_json, print_summary, Context};

pub fn execute(ctx: &Context, issue: u64) -> anyhow::Result<()> {
    let vcs = ctx.git();
    let tracker = ctx.tracker()?;

    let outcome = SetupRunner::new(&vcs, &tracker, &ctx.config)
        .run(issue)
        .with_context(|| format!("setup for issue {} failed", issue))?;

    if ctx.json {
        print_json(&outcome)?;
    } else {
        println!(
            "Created branch '{}' from '{}'.",
            outcome.branch, outcome.created_from
        );
        print_summary(&outcome.update);
    }
    check_success(&outcome.update)
}
