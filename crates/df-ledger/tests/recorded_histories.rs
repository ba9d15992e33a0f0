//! Reconciliation against commit messages exactly as they appear on real
//! feature branches, rather than messages produced by the encoder.

use df_ledger::{
    is_recognized_patch, reconcile, CommitRecord, PatchCandidate, PatchLedger,
    DEFAULT_PATCH_SUFFIX,
};

/// `(file_id, comment_id, comment_number, filename)`, one file per comment,
/// so the comment number doubles as the order index.
fn candidates(files: &[(u64, u64, u64, &str)]) -> Vec<PatchCandidate> {
    files
        .iter()
        .map(|&(file_id, comment_id, comment_number, filename)| PatchCandidate {
            order_index: comment_number,
            file_id,
            comment_id,
            comment_number,
            filename: filename.to_string(),
            file_url: format!("https://www.drupal.org/files/issues/{}", filename),
            comment_url: None,
            is_displayable: true,
            is_recognized_patch: is_recognized_patch(filename, DEFAULT_PATCH_SUFFIX),
        })
        .collect()
}

fn history(commits: &[(&str, &str)]) -> PatchLedger {
    PatchLedger::from_records(
        commits
            .iter()
            .map(|(sha, message)| CommitRecord::new(*sha, *message))
            .collect(),
    )
}

fn pending(ledger: &PatchLedger, candidates: &[PatchCandidate]) -> Vec<u64> {
    reconcile(ledger, candidates)
        .pending
        .iter()
        .map(|c| c.order_index)
        .collect()
}

#[test]
fn two_applied_patches_leave_the_third() {
    let ledger = history(&[
        (
            "sha-patch-1",
            "Patch from Drupal.org. Comment: 1; URL: http://url.com/1234; file: applied.patch; fid: 11. Automatic commit by dorgflow.",
        ),
        (
            "sha-feature",
            "Patch from Drupal.org. Comment: 2; URL: http://url.com/1234; file: applied.patch; fid: 12. Automatic commit by dorgflow.",
        ),
    ]);
    let files = candidates(&[
        (11, 21, 1, "patch-1.patch"),
        (12, 22, 2, "patch-2.patch"),
        (13, 23, 3, "new.patch"),
    ]);

    let plan = reconcile(&ledger, &files);

    assert_eq!(plan.matched.len(), 2);
    assert_eq!(plan.high_water_index, 2);
    assert_eq!(pending(&ledger, &files), vec![3]);
}

#[test]
fn failed_patch_before_an_applied_one_is_not_retried() {
    let ledger = history(&[(
        "sha-feature",
        "Patch from Drupal.org. Comment: 10; URL: http://url.com/1234; file: applied.patch; fid: 210. Automatic commit by dorgflow.",
    )]);
    let files = candidates(&[
        (200, 400, 1, "failing.patch"),
        (210, 410, 10, "applied.patch"),
        (220, 420, 20, "new.patch"),
    ]);

    let plan = reconcile(&ledger, &files);

    assert_eq!(plan.high_water_index, 10);
    assert_eq!(plan.matched[0].file_id, 210);
    assert_eq!(pending(&ledger, &files), vec![20]);
}

#[test]
fn local_work_and_posted_patch_are_accounted_for() {
    let ledger = history(&[
        (
            "sha-patch-1",
            "Patch from Drupal.org. Comment: 21; URL: http://url.com/1234; file: patch-1.patch; fid: 11. Automatic commit by dorgflow.",
        ),
        ("sha-work", "Fixing the bug."),
        (
            "sha-feature",
            "Patch for Drupal.org. Comment (expected): 22; file: 123456-22.project.bug-description.patch. Automatic commit by dorgflow.",
        ),
    ]);
    let files = candidates(&[
        (11, 21, 1, "patch-1.patch"),
        (12, 22, 2, "123456-22.project.bug-description.patch"),
        (13, 23, 3, "patch-23.patch"),
    ]);

    let plan = reconcile(&ledger, &files);

    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.tagged().count(), 2);
    let shas: Vec<&str> = plan.matched.iter().map(|m| m.sha.as_str()).collect();
    assert_eq!(shas, vec!["sha-patch-1", "sha-feature"]);
    assert_eq!(plan.high_water_index, 2);
    assert_eq!(pending(&ledger, &files), vec![3]);
}

#[test]
fn history_without_tags_applies_everything() {
    let ledger = history(&[
        ("sha-work", "Fixing the bug."),
        ("sha-more", "Patch from Drupal.org, by hand."),
    ]);
    let files = candidates(&[(200, 400, 1, "fix-1.patch"), (210, 410, 10, "fix-10.patch")]);

    assert_eq!(pending(&ledger, &files), vec![1, 10]);
}
