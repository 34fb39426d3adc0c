use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::types::HistoryEntry;

fn history_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(--\s+Date\s+Sign\s+History\r?\n--\s+-{2,}\s+-{2,}\s+-{5,}.*\r?\n)([\s\S]*?)(-{60,})",
        )
        .expect("static history block regex")
    })
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(--\s+-{2,}\s+-{2,}\s+-{5,}.*)(\r?\n)").expect("static separator regex")
    })
}

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--\s+(\d{6})\s+(\w+)\s+(.*)").expect("static entry regex"))
}

fn bracket_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\]]+)\]\s*(.*)").expect("static id regex"))
}

fn bare_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z0-9\-]+)\s+(.*)").expect("static id regex"))
}

/// Merge `entries` into the header's change-log block.
///
/// With a full `Date Sign History` block, existing and new entries are
/// deduplicated by `(date, id)` (the longer description wins), sorted newest
/// first, and the block is rewritten in the fixed-width format. Without one,
/// the new entries are inserted under the first history separator line.
/// Content comes back unchanged when nothing is net-new or no anchor exists.
pub fn apply_header_patch(content: &str, entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return content.to_string();
    }

    let (caps, whole) = match history_block_regex().captures(content).and_then(|c| c.get(0).map(|m| (c, m))) {
        Some(found) => found,
        None => return inject_under_separator(content, entries),
    };

    let prefix = &caps[1];
    let existing = parse_history_entries(&caps[2]);

    if !has_net_new(&existing, entries) {
        debug!("history block already holds every entry");
        return content.to_string();
    }

    let merged = merge_entries(existing.into_iter().chain(entries.iter().cloned()));
    let body = merged
        .iter()
        .map(HistoryEntry::format_line)
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::with_capacity(content.len() + body.len());
    out.push_str(&content[..whole.start()]);
    out.push_str(prefix);
    out.push_str(&body);
    out.push('\n');
    out.push_str(&caps[3]);
    out.push_str(&content[whole.end()..]);
    out
}

/// Parse `--  YYMMDD  SIGN  [ID] Description` lines; other lines are ignored.
///
/// The id is taken from a bracketed prefix, else from a leading upper-case
/// token followed by a space, else it defaults to `Patch`.
pub fn parse_history_entries(text: &str) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with("--") {
            continue;
        }
        let caps = match entry_regex().captures(line) {
            Some(c) => c,
            None => continue,
        };

        let rest = caps[3].trim();
        let (id, desc) = if let Some(b) = bracket_id_regex().captures(rest) {
            (b[1].to_string(), b[2].to_string())
        } else if let Some(b) = bare_id_regex().captures(rest) {
            (b[1].to_string(), b[2].to_string())
        } else {
            ("Patch".to_string(), rest.to_string())
        };

        entries.push(HistoryEntry {
            date: caps[1].to_string(),
            sign: caps[2].to_string(),
            id,
            desc: desc.trim().to_string(),
        });
    }

    entries
}

/// Deduplicate by `(date, id)` keeping the longer description, then sort
/// newest first. Ties keep their first-seen order.
fn merge_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Vec<HistoryEntry> {
    let mut merged: Vec<HistoryEntry> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for entry in entries {
        let key = entry.key();
        let entry = HistoryEntry {
            id: entry.clean_id(),
            ..entry
        };
        match positions.get(&key) {
            Some(&i) => {
                if entry.desc.chars().count() > merged[i].desc.chars().count() {
                    merged[i] = entry;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(entry);
            }
        }
    }

    // YYMMDD is fixed width, so string order is date order.
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

/// Whether any entry would add a key or lengthen a description.
fn has_net_new(existing: &[HistoryEntry], entries: &[HistoryEntry]) -> bool {
    entries.iter().any(|e| {
        let key = e.key();
        !existing
            .iter()
            .any(|x| x.key() == key && x.desc.chars().count() >= e.desc.chars().count())
    })
}

fn inject_under_separator(content: &str, entries: &[HistoryEntry]) -> String {
    let (caps, whole) = match separator_regex().captures(content).and_then(|c| c.get(0).map(|m| (c, m))) {
        Some(found) => found,
        None => {
            debug!("no history anchor found; header left untouched");
            return content.to_string();
        }
    };

    let existing = parse_history_entries(content);
    let fresh: Vec<HistoryEntry> = entries
        .iter()
        .filter(|e| has_net_new(&existing, std::slice::from_ref(*e)))
        .cloned()
        .collect();
    if fresh.is_empty() {
        return content.to_string();
    }

    let newline = &caps[2];
    let lines = merge_entries(fresh)
        .iter()
        .map(HistoryEntry::format_line)
        .collect::<Vec<_>>()
        .join(newline);

    let mut out = String::with_capacity(content.len() + lines.len() + 2);
    out.push_str(&content[..whole.end()]);
    out.push_str(&lines);
    out.push_str(newline);
    out.push_str(&content[whole.end()..]);
    out
}
