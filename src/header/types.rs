use serde::{Deserialize, Serialize};

/// One line of the header change log:
/// `--  YYMMDD  SIGN    [ID] Description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub sign: String,
    pub id: String,
    pub desc: String,
}

impl HistoryEntry {
    pub fn new(date: &str, sign: &str, id: &str, desc: &str) -> Self {
        HistoryEntry {
            date: date.to_string(),
            sign: sign.to_string(),
            id: id.to_string(),
            desc: desc.to_string(),
        }
    }

    /// Id without surrounding brackets or whitespace.
    pub fn clean_id(&self) -> String {
        self.id.replace(|c: char| c == '[' || c == ']', "").trim().to_string()
    }

    /// Deduplication key: normalized `(date, id)`.
    pub fn key(&self) -> (String, String) {
        (self.date.trim().to_string(), self.clean_id())
    }

    /// The fixed-width header line for this entry.
    pub fn format_line(&self) -> String {
        format!("--  {}  {:<6}  [{}] {}", self.date, self.sign, self.clean_id(), self.desc)
    }
}
