use serde::{Deserialize, Serialize};

/// One stored line of ingested text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub source: String,
    pub text: String,
}

/// Splits raw text on `\n`, `\r\n` or a lone `\r`, trims each line and drops
/// the ones left empty. Line order is preserved.
pub fn normalize_lines(raw: &str) -> Vec<String> {
    raw.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
