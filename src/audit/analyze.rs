use tracing::{debug, warn};

use crate::classify::has_logic_changes;
use crate::header::header_date;
use crate::vcs::{DiffTarget, LogQuery, VersionControl};

use super::types::{AuditCache, AuditResult, DocStatus};

/// Decide whether the documentation header of one file is current.
///
/// Working-tree edits win over history: a dirty file is `DirtyCode` when the
/// edit touches logic. Clean files compare the header date with the date of
/// their last commit. Commits whose subject carries a skip keyword, or whose
/// diff is cosmetic, do not make a file outdated. Results derived from history
/// are cached against the last commit hash.
pub async fn analyze_file<V>(
    vcs: &V,
    path: &str,
    content: &str,
    skip_keywords: &[String],
    cache: &AuditCache,
) -> AuditResult
where
    V: VersionControl + ?Sized,
{
    let dirty = vcs.is_dirty(path).await.unwrap_or_else(|e| {
        warn!(path, error = %e, "dirty check failed");
        false
    });

    if dirty {
        let logic = match vcs.diff(path, &DiffTarget::WorkingTree).await {
            Ok(diff) => has_logic_changes(&diff),
            Err(e) => {
                warn!(path, error = %e, "working diff unavailable");
                true
            }
        };
        return if logic {
            AuditResult::new(DocStatus::DirtyCode, "Unsaved logic changes")
        } else {
            AuditResult::new(DocStatus::Success, "Writing docs (dirty)")
        };
    }

    let last = match vcs.log(path, &LogQuery::latest(1)).await {
        Ok(mut commits) if !commits.is_empty() => commits.swap_remove(0),
        Ok(_) => return AuditResult::new(DocStatus::Unknown, "Untracked file"),
        Err(e) => {
            warn!(path, error = %e, "history unavailable");
            return AuditResult::new(DocStatus::Unknown, "Untracked file");
        }
    };

    if let Some(cached) = cache.lookup(path, &last.hash) {
        debug!(path, hash = %last.hash, "audit cache hit");
        return cached;
    }

    let header = match header_date(content) {
        Some(d) => d,
        None => return AuditResult::new(DocStatus::NoHeader, "Header missing"),
    };

    let header_num: u32 = header.parse().unwrap_or(0);
    let commit_num: u32 = last.date.parse().unwrap_or(0);

    let result = if header_num >= commit_num {
        AuditResult::new(DocStatus::Success, "Up to date")
    } else if skip_keywords.iter().any(|k| last.subject_mentions(k.trim())) {
        debug!(path, subject = %last.subject, "last commit skipped by keyword");
        AuditResult::new(DocStatus::Success, "Skipped: ignored keyword")
    } else {
        let logic = match vcs.diff(path, &DiffTarget::Commit(last.hash.clone())).await {
            Ok(diff) => has_logic_changes(&diff),
            Err(e) => {
                warn!(path, error = %e, "commit diff unavailable");
                true
            }
        };
        if logic {
            AuditResult::new(
                DocStatus::Outdated,
                format!("Outdated (header {} < commit {})", header, last.date),
            )
        } else {
            AuditResult::new(DocStatus::Success, "Skipped: docs-only update")
        }
    };

    cache.store(path, &last.hash, result.clone());
    result
}
