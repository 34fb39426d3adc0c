pub mod keywords;

pub use keywords::{KeywordClassifier, STRUCTURAL_KEYWORDS};

/// Decides whether a single changed line is cosmetic.
///
/// `line` is the diff line with its `+`/`-` prefix removed and whitespace trimmed.
/// Swapping the implementation retunes what counts as a logic change without
/// touching the reconciliation engine.
pub trait NoiseClassifier {
    fn is_noise_line(&self, line: &str) -> bool;
}

/// Returns `true` when the diff adds or removes at least one line of real logic,
/// using the default structural-keyword heuristic.
pub fn has_logic_changes(diff: &str) -> bool {
    has_logic_changes_with(diff, KeywordClassifier::default_ref())
}

/// Like [`has_logic_changes`], with a caller-provided classifier.
///
/// Diff metadata (`---`, `+++`, `index`, `@@`) and context lines are ignored.
/// Returns at the first added/removed line the classifier does not call noise.
pub fn has_logic_changes_with<C: NoiseClassifier + ?Sized>(diff: &str, classifier: &C) -> bool {
    for line in diff.lines() {
        if is_diff_metadata(line) {
            continue;
        }

        let body = match line.strip_prefix('+').or_else(|| line.strip_prefix('-')) {
            Some(b) => b,
            None => continue,
        };

        if !classifier.is_noise_line(body.trim()) {
            return true;
        }
    }
    false
}

fn is_diff_metadata(line: &str) -> bool {
    line.starts_with("---")
        || line.starts_with("+++")
        || line.starts_with("index")
        || line.starts_with("@@")
}
