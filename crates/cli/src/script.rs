//! Line protocol read from stdin
//!
//! ```text
//! add <key> <value...>
//! remove <key>
//! flush
//! # comment
//! ```

use anyhow::{bail, Result};

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Add { key: String, value: String },
    Remove(String),
    Flush,
    /// Blank line or comment
    Skip,
}

pub fn parse_line(line: &str) -> Result<Line> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Line::Skip);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "add" => {
            let Some((key, value)) = rest.split_once(char::is_whitespace) else {
                bail!("usage: add <key> <value>");
            };
            Ok(Line::Add {
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        }
        "remove" => {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                bail!("usage: remove <key>");
            }
            Ok(Line::Remove(rest.to_string()))
        }
        "flush" => {
            if !rest.is_empty() {
                bail!("flush takes no arguments");
            }
            Ok(Line::Flush)
        }
        other => bail!("unknown command '{}'", other),
    }
}
