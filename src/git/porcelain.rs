// repo-backup: Directory-to-Git Backup Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsing of `git status --porcelain` (v1) output.
//!
//! Paths with special characters arrive C-quoted (`"caf\303\251.txt"`);
//! they are decoded back to the on-disk name.

/// Two-letter codes git uses for unmerged paths.
pub const UNMERGED_CODES: [&str; 7] = ["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

/// Codes whose working-tree file still holds conflict content worth keeping.
const PRESERVABLE_CODES: [&str; 4] = ["UU", "AA", "AU", "UA"];

/// One line of porcelain status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub code: String,
    pub path: String,
}

impl StatusEntry {
    /// Parse a single `XY path` line. Renames keep the destination path.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        if line.len() < 4 || !line.is_char_boundary(2) || !line.is_char_boundary(3) {
            return None;
        }
        let (code, rest) = line.split_at(2);
        let path = rest[1..]
            .rsplit_once(" -> ")
            .map_or(&rest[1..], |(_, to)| to);
        let path = unquote(path)?;
        if path.is_empty() {
            return None;
        }
        Some(Self {
            code: code.to_string(),
            path,
        })
    }

    #[must_use]
    pub fn is_unmerged(&self) -> bool {
        UNMERGED_CODES.contains(&self.code.as_str())
    }

    /// Both sides (or one side) still have content in the working tree.
    #[must_use]
    pub fn is_preservable(&self) -> bool {
        PRESERVABLE_CODES.contains(&self.code.as_str())
    }
}

/// Decode git's C-style path quoting. Unquoted paths are returned as is.
///
/// Returns `None` for a quoted path that ends mid-escape.
#[must_use]
pub fn unquote(path: &str) -> Option<String> {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Some(path.to_string());
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let escaped = match chars.next()? {
            'a' => 0x07,
            'b' => 0x08,
            't' => b'\t',
            'n' => b'\n',
            'v' => 0x0b,
            'f' => 0x0c,
            'r' => b'\r',
            digit @ '0'..='3' => {
                let mut value = digit.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                u8::try_from(value).ok()?
            }
            other => u8::try_from(other).ok()?,
        };
        bytes.push(escaped);
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse full porcelain output, skipping malformed lines.
#[must_use]
pub fn parse(output: &str) -> Vec<StatusEntry> {
    output.lines().filter_map(StatusEntry::parse).collect()
}

/// Unmerged entries in `output`.
#[must_use]
pub fn conflicts(output: &str) -> Vec<StatusEntry> {
    parse(output)
        .into_iter()
        .filter(StatusEntry::is_unmerged)
        .collect()
}
