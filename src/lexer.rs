//! Splitting of raw input lines into argument tokens.
//!
//! There is no quoting, escaping or expansion: a line is cut on a single
//! delimiter character and that is all.

/// Delimiter used by the interactive shell.
pub const DELIMITER: char = ' ';

/// Split `line` into tokens on every occurrence of `delimiter`.
///
/// Runs of delimiters are collapsed and leading or trailing delimiters never
/// produce empty tokens, so `"ls  -la "` gives `["ls", "-la"]`. A line made
/// only of delimiters yields an empty vector.
pub fn split_into_tokens(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces() {
        assert_eq!(
            split_into_tokens("ls -la /tmp", ' '),
            vec!["ls", "-la", "/tmp"]
        );
    }

    #[test]
    fn single_token() {
        assert_eq!(split_into_tokens("pwd", ' '), vec!["pwd"]);
    }

    #[test]
    fn consecutive_delimiters_are_collapsed() {
        assert_eq!(split_into_tokens("ls  -la", ' '), vec!["ls", "-la"]);
        assert_eq!(split_into_tokens("  echo hi  ", ' '), vec!["echo", "hi"]);
    }

    #[test]
    fn only_delimiters_yield_nothing() {
        assert!(split_into_tokens("   ", ' ').is_empty());
    }

    #[test]
    fn other_delimiter() {
        assert_eq!(
            split_into_tokens("/usr/bin:/bin::/sbin", ':'),
            vec!["/usr/bin", "/bin", "/sbin"]
        );
    }

    #[test]
    fn tabs_are_not_delimiters() {
        assert_eq!(split_into_tokens("echo\ta b", ' '), vec!["echo\ta", "b"]);
    }
}
