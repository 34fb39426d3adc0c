use crate::history::CommitInfo;

/// Keep commits dated within `[after, before]` (both `YYMMDD`, inclusive).
///
/// `None` for either bound means "no constraint" on that side. Fixed-width
/// `YYMMDD` strings compare correctly as text.
pub fn filter_commits_by_date(
    commits: Vec<CommitInfo>,
    after: Option<&str>,
    before: Option<&str>,
) -> Vec<CommitInfo> {
    commits
        .into_iter()
        .filter(|c| {
            let date = c.date.as_str();
            let after_ok = after.map_or(true, |a| date >= a);
            let before_ok = before.map_or(true, |b| date <= b);
            after_ok && before_ok
        })
        .collect()
}
