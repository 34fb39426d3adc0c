use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::blame::BlameLine;
use crate::config::ScanMode;

use super::label::Attribution;

fn generated_block_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*--\s+(?:Start|End)\s+\[(?:ADD|MOD)-\d{6}-\d+\]").expect("static marker regex")
    })
}

fn inline_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--\s*\[(?:ADD|MOD)-\d{6}-\d+\].*$").expect("static label regex"))
}

fn preserved_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[((?:ADD|MOD)-\d{6}-\d+)\]\s*(\w+)").expect("static label regex"))
}

/// Inputs for [`regenerate_markers`] that come from the file's marker rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotateOptions<'a> {
    /// Lines up to and including the first match pass through verbatim.
    pub header_boundary: Option<&'a Regex>,
    /// Lines containing any of these are never attributed.
    pub inline_skip_keywords: &'a [String],
    /// In incremental mode a line whose commit has no label keeps the label it
    /// already carries.
    pub scan_mode: ScanMode,
}

/// A run of consecutive lines sharing one attribution (or none).
#[derive(Default)]
struct Run {
    info: Option<Attribution>,
    lines: Vec<String>,
}

impl Run {
    fn flush_into(&mut self, out: &mut Vec<String>) {
        if self.lines.is_empty() {
            self.info = None;
            return;
        }

        match self.info.take() {
            Some(info) if self.lines.len() == 1 => {
                out.push(format!("{} -- [{}] {}", self.lines[0], info.label, info.author));
                self.lines.clear();
            }
            Some(info) => {
                out.push(format!("-- Start [{}] {}", info.label, info.author));
                out.append(&mut self.lines);
                out.push(format!("-- End [{}] {}", info.label, info.author));
            }
            None => out.append(&mut self.lines),
        }
    }
}

/// Rebuild the whole marker layer of a file from its blame.
///
/// Previously generated markers are stripped first, then every run of lines
/// attributed to the same `(label, author)` is wrapped again. Blank lines,
/// separator lines (`----`), lines with a skip keyword, and lines without a
/// labelled commit end the current run and pass through unmarked.
pub fn regenerate_markers(
    blame: &[BlameLine],
    labels: &HashMap<String, Attribution>,
    options: &AnnotateOptions<'_>,
) -> String {
    let mut out: Vec<String> = Vec::with_capacity(blame.len());
    let mut header_passed = options.header_boundary.is_none();
    let mut run = Run::default();

    for line in blame {
        let original = line.content.as_str();

        if !header_passed {
            out.push(original.to_string());
            if options.header_boundary.is_some_and(|re| re.is_match(original)) {
                header_passed = true;
            }
            continue;
        }

        if generated_block_marker_regex().is_match(original) {
            continue;
        }

        let content = if original.contains("-- [") {
            inline_label_regex().replace(original, "").trim_end().to_string()
        } else {
            original.to_string()
        };

        if content.trim().is_empty() {
            run.flush_into(&mut out);
            out.push(String::new());
            continue;
        }

        if content.contains("----")
            || options
                .inline_skip_keywords
                .iter()
                .any(|k| !k.is_empty() && content.contains(k.as_str()))
        {
            run.flush_into(&mut out);
            out.push(content);
            continue;
        }

        let info = resolve(line, original, labels, options.scan_mode);
        if info != run.info || run.lines.is_empty() {
            run.flush_into(&mut out);
            run.info = info;
        }
        run.lines.push(content);
    }
    run.flush_into(&mut out);

    debug!(lines = out.len(), "regenerated marker layer");
    out.join("\n")
}

fn resolve(
    line: &BlameLine,
    original: &str,
    labels: &HashMap<String, Attribution>,
    scan_mode: ScanMode,
) -> Option<Attribution> {
    if let Some(info) = line.hash.as_ref().and_then(|h| labels.get(h)) {
        return Some(info.clone());
    }

    if scan_mode != ScanMode::Incremental {
        return None;
    }

    preserved_label_regex().captures(original).map(|caps| Attribution {
        label: caps[1].to_string(),
        author: caps[2].to_string(),
    })
}
