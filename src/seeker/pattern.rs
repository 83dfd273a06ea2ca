use regex::{Regex, RegexBuilder};

use crate::seeker::SeekerError;

/// Normalize a member or relative path for matching.
///
/// Backslashes become `/`, and leading `./` or `/` segments are removed so
/// that directory entries, tar members and zip members all compare in the
/// same form.
pub fn normalize_member_path(name: &str) -> String {
    let unified = name.replace('\\', "/");
    let mut trimmed = unified.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Compile a glob-style search pattern into an anchored, case-insensitive regex.
///
/// `*` and `**` match any run of characters including `/`. A `**/` segment
/// additionally matches zero directories, so `**/logs/*.csv` also finds
/// `logs/a.csv` at the container root.
pub fn compile_pattern(pattern: &str) -> Result<Regex, SeekerError> {
    let normalized = normalize_member_path(pattern);
    let chars: Vec<char> = normalized.chars().collect();
    let mut re = String::with_capacity(normalized.len() * 2 + 8);
    re.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                let start = i;
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                let at_segment_start = start == 0 || chars[start - 1] == '/';
                let double = i - start >= 2;
                if double && at_segment_start && i < chars.len() && chars[i] == '/' {
                    re.push_str("(?:.*/)?");
                    i += 1;
                } else {
                    re.push_str(".*");
                }
                continue;
            }
            '?' => re.push('.'),
            '[' => {
                i = push_class(&chars, i, &mut re).ok_or_else(|| SeekerError::Pattern {
                    pattern: pattern.to_string(),
                    reason: "unterminated character class".to_string(),
                })?;
                continue;
            }
            c => {
                let mut buf = [0u8; 4];
                re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
        i += 1;
    }
    re.push('$');

    RegexBuilder::new(&re)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| SeekerError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Translate a `[...]` class starting at `start`. Returns the index after `]`.
fn push_class(chars: &[char], start: usize, re: &mut String) -> Option<usize> {
    let mut i = start + 1;
    let mut class = String::from("[");
    if i < chars.len() && (chars[i] == '!' || chars[i] == '^') {
        class.push('^');
        i += 1;
    }
    // A leading ']' is a literal member of the class.
    if i < chars.len() && chars[i] == ']' {
        class.push_str("\\]");
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            ']' => {
                class.push(']');
                re.push_str(&class);
                return Some(i + 1);
            }
            c @ ('\\' | '[' | '^' | '&' | '~') => {
                class.push('\\');
                class.push(c);
            }
            c => class.push(c),
        }
        i += 1;
    }
    None
}
