use super::types::{CommitInfo, CommitType};

/// `git log` arguments whose output [`parse_commit_log`] understands.
///
/// Each record starts with a record separator (0x1e) and carries NUL-separated
/// fields; `--name-status` appends the file status lines after the record header.
pub const LOG_FORMAT: &[&str] = &[
    "--format=%x1e%H%x00%ad%x00%an%x00%s",
    "--date=format:%y%m%d",
    "--name-status",
];

/// Parse history output produced with [`LOG_FORMAT`] into commits, newest first
/// (the order git prints them).
///
/// A commit whose status line for the file starts with `A` is the file-creation
/// commit ([`CommitType::Add`]); every other commit is a modification. Records
/// with a missing hash or an unparseable date are skipped.
pub fn parse_commit_log(raw: &[u8]) -> Vec<CommitInfo> {
    let input = match std::str::from_utf8(raw) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut commits = Vec::new();

    for record in input.split('\x1e') {
        let record = record.trim_matches(|c: char| c == '\n' || c == '\r');
        if record.is_empty() {
            continue;
        }

        let mut lines = record.lines();
        let header = match lines.next() {
            Some(h) => h,
            None => continue,
        };

        let fields: Vec<&str> = header.split('\0').collect();
        let hash = fields.first().map(|s| s.trim()).unwrap_or("");
        if hash.is_empty() {
            continue;
        }

        let date = match fields.get(1).and_then(|d| normalize_date(d)) {
            Some(d) => d,
            None => continue,
        };

        let added = lines.any(|l| {
            let status = l.trim_start();
            status.starts_with('A') && status[1..].starts_with(|c: char| c.is_whitespace())
        });

        commits.push(CommitInfo {
            hash: hash.to_string(),
            date,
            author: fields.get(2).unwrap_or(&"").trim().to_string(),
            subject: fields.get(3).unwrap_or(&"").trim().to_string(),
            kind: if added { CommitType::Add } else { CommitType::Mod },
        });
    }

    commits
}

/// Normalize a commit date to `YYMMDD`.
///
/// Accepts `YYMMDD`, `YYYYMMDD`, and ISO forms such as `2024-06-15` or
/// `2024-06-15T10:00:00+02:00` (only the date part is used).
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date_part = raw.split(|c: char| c == 'T' || c == ' ').next().unwrap_or("");
    let digits: String = date_part.chars().filter(|c| *c != '-').collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    match digits.len() {
        6 => Some(digits),
        8 => Some(digits[2..].to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_with_status() {
        let raw = b"\x1eccc\x00240615\x00Alice\x00SC-7 Fix totals\n\nM\tsrc/pkg.plsql\n\
                    \x1ebbb\x00240615\x00Bob\x00Refactor\n\nM\tsrc/pkg.plsql\n\
                    \x1eaaa\x00240101\x00Carol\x00Initial import\n\nA\tsrc/pkg.plsql\n";
        let commits = parse_commit_log(raw);
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].hash, "ccc");
        assert_eq!(commits[0].subject, "SC-7 Fix totals");
        assert_eq!(commits[0].kind, CommitType::Mod);
        assert_eq!(commits[2].author, "Carol");
        assert_eq!(commits[2].kind, CommitType::Add);
    }

    #[test]
    fn test_parse_log_without_status_lines() {
        let raw = b"\x1eabc\x002024-06-15\x00Alice\x00Subject with | pipe";
        let commits = parse_commit_log(raw);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].date, "240615");
        assert_eq!(commits[0].subject, "Subject with | pipe");
        assert_eq!(commits[0].kind, CommitType::Mod);
    }

    #[test]
    fn test_bad_records_skipped() {
        let raw = b"\x1e\x00240101\x00NoHash\x00x\n\x1eabc\x00yesterday\x00A\x00y\n\x1e\n";
        assert!(parse_commit_log(raw).is_empty());
        assert!(parse_commit_log(b"").is_empty());
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("240615").as_deref(), Some("240615"));
        assert_eq!(normalize_date("20240615").as_deref(), Some("240615"));
        assert_eq!(normalize_date("2024-06-15").as_deref(), Some("240615"));
        assert_eq!(normalize_date("2024-06-15T08:00:00+07:00").as_deref(), Some("240615"));
        assert_eq!(normalize_date("2024-06-15 08:00:00").as_deref(), Some("240615"));
        assert_eq!(normalize_date("June"), None);
        assert_eq!(normalize_date("2406"), None);
    }

    #[test]
    fn test_subject_mentions() {
        let c = CommitInfo {
            hash: "h".into(),
            date: "240101".into(),
            author: "a".into(),
            subject: "Docs: update header".into(),
            kind: CommitType::Mod,
        };
        assert!(c.subject_mentions("DOCS"));
        assert!(!c.subject_mentions("merge"));
        assert!(!c.subject_mentions(""));
    }
}
