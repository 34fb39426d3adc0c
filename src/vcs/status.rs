/// Paths with uncommitted changes from `git status --porcelain` (v1) output.
///
/// Renames report the new path. Untracked (`??`) and ignored (`!!`) entries are
/// skipped: they have no history to compare against.
pub fn parse_status_porcelain(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            if line.len() < 4 || line.starts_with("??") || line.starts_with("!!") {
                return None;
            }
            let path = line.get(3..)?;
            let path = match path.rsplit_once(" -> ") {
                Some((_, to)) => to,
                None => path,
            };
            Some(path.trim().trim_matches('"').to_string())
        })
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let raw = " M src/a.plsql\nM  src/b.plsvc\nR  old.plsql -> new.plsql\n?? scratch.sql\n";
        assert_eq!(parse_status_porcelain(raw), vec!["src/a.plsql", "src/b.plsvc", "new.plsql"]);
    }

    #[test]
    fn test_empty_status() {
        assert!(parse_status_porcelain("").is_empty());
    }
}
