// patch.rs - `dorgflow patch`: write local work to a patch file for upload.

use anyhow::Context as _;
use df_workflow::PatchRunner;

use super::{print_json, Context};

pub fn execute(ctx: &Context) -> anyhow::Result<()> {
    let vcs = ctx.git();
    let tracker = ctx.tracker()?;

    let outcome = PatchRunner::new(&vcs, &tracker, &ctx.config, ctx.root())
        .run()
        .context("patch failed")?;

    if ctx.json {
        print_json(&outcome)?;
    } else {
        println!("Wrote {}", outcome.path.display());
        println!(
            "Upload it to issue {} as comment #{}; the next `dorgflow update` will pick it up.",
            outcome.issue, outcome.expected_comment_id
        );
    }
    Ok(())
}
