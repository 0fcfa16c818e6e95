use crate::error::Result;
use std::path::Path;

/// Read a file holding one GitHub login per line.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
/// The remaining logins keep their file order.
pub fn read_line_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_line_list(&content))
}

/// Like [`read_line_list`], but a missing path means an empty list.
pub fn read_optional_line_list(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(p) => read_line_list(p),
        None => Ok(Vec::new()),
    }
}

pub fn parse_line_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
