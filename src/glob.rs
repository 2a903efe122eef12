//! Shell-style glob matching.
//!
//! Supports `*`, `?` and `[...]` character classes. Used for release asset
//! patterns and component file lookup.

use std::path::Path;

use regex::Regex;

/// Compile a glob pattern into an anchored regular expression.
pub fn to_regex(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' || c == '^' || c == '[' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if closed {
                    re.push('[');
                    re.push_str(&class);
                    re.push(']');
                } else {
                    re.push_str(&regex::escape("["));
                    re.push_str(&regex::escape(&class));
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }

    re.push('$');
    Regex::new(&re).ok()
}

/// Whether `name` matches the glob `pattern`.
pub fn matches(pattern: &str, name: &str) -> bool {
    to_regex(pattern).is_some_and(|re| re.is_match(name))
}

/// Whether `path` matches `pattern`, comparing from the right.
///
/// A relative pattern with `n` components is matched against the last `n`
/// components of the path, so `*.yml` matches `/a/b/config.yml` and
/// `b/*.yml` matches it too.
pub fn path_matches(path: &Path, pattern: &str) -> bool {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|p| !p.is_empty()).collect();
    let path_parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    if pattern_parts.is_empty() || pattern_parts.len() > path_parts.len() {
        return false;
    }

    let offset = path_parts.len() - pattern_parts.len();
    pattern_parts
        .iter()
        .zip(&path_parts[offset..])
        .all(|(pattern, part)| matches(pattern, part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_run() {
        assert!(matches("gh_*_linux_amd64.tar.gz", "gh_2.40.1_linux_amd64.tar.gz"));
        assert!(!matches("gh_*_linux_amd64.tar.gz", "gh_2.40.1_macOS_amd64.zip"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(matches("v?.0", "v1.0"));
        assert!(!matches("v?.0", "v10.0"));
    }

    #[test]
    fn character_classes() {
        assert!(matches("file[0-9].txt", "file7.txt"));
        assert!(!matches("file[!0-9].txt", "file7.txt"));
        assert!(matches("file[!0-9].txt", "fileA.txt"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(matches("a+b(c).yml", "a+b(c).yml"));
        assert!(!matches("a.b", "axb"));
    }

    #[test]
    fn unclosed_class_is_literal() {
        assert!(matches("a[b", "a[b"));
    }

    #[test]
    fn path_matching_from_the_right() {
        let path = Path::new("/opt/components/git/config.yml");
        assert!(path_matches(path, "*.yml"));
        assert!(path_matches(path, "git/config.yml"));
        assert!(path_matches(path, "config.*"));
        assert!(!path_matches(path, "sdkman/config.yml"));
        assert!(!path_matches(path, "*.yaml"));
    }
}
