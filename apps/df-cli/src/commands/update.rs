// update.rs - `dorgflow update`: apply patches posted since the last run.

use anyhow::Context as _;
use df_workflow::{UpdateOptions, UpdateRunner};

use super::{check_success, print_json, print_summary, Context};

pub fn execute(ctx: &Context, issue: Option<u64>, dry_run: bool) -> anyhow::Result<()> {
    let vcs = ctx.git();
    let tracker = ctx.tracker()?;

    let summary = UpdateRunner::new(&vcs, &tracker, &ctx.config)
        .run(&UpdateOptions { issue, dry_run })
        .context("update failed")?;

    if ctx.json {
        print_json(&summary)?;
    } else {
        print_summary(&summary);
    }
    check_success(&summary)
}
