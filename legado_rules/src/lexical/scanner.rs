//! Bracket-depth scanning over a character buffer
//!
//! Both scanners are best effort: an unterminated block runs to the end of the
//! input and is reported with `terminated == false`, never as an error.

/// Shape of a block to consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpec {
    pub open: char,
    pub close: char,
    /// Depth already opened by the marker in front of the cursor
    pub initial_depth: usize,
    /// Closing sequence recognized only while no inner `open` is pending
    pub sentinel: Option<&'static str>,
}

impl BlockSpec {
    /// Ends when the depth returns to zero
    pub const fn balanced(open: char, close: char, initial_depth: usize) -> Self {
        Self {
            open,
            close,
            initial_depth,
            sentinel: None,
        }
    }

    /// Ends at `sentinel`; closers that match an inner opener only pop it
    pub const fn sentinel(open: char, close: char, sentinel: &'static str) -> Self {
        Self {
            open,
            close,
            initial_depth: 0,
            sentinel: Some(sentinel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockScan {
    /// One past the last consumed character
    pub end: usize,
    pub terminated: bool,
    pub max_depth: usize,
}

/// Case-insensitive test for `marker` at `position`
///
/// Markers are spelled in lower case; only ASCII letters fold.
pub fn matches_at(chars: &[char], position: usize, marker: &str) -> bool {
    let mut index = position;
    for expected in marker.chars() {
        match chars.get(index) {
            Some(actual) if actual.to_ascii_lowercase() == expected => index += 1,
            _ => return false,
        }
    }
    true
}

/// Advance from `from` through one block described by `spec`
pub fn scan_block(chars: &[char], from: usize, spec: &BlockSpec) -> BlockScan {
    let mut depth = spec.initial_depth;
    let mut max_depth = depth;
    let mut index = from;

    while index < chars.len() {
        if depth == 0 {
            if let Some(sentinel) = spec.sentinel {
                if matches_at(chars, index, sentinel) {
                    return BlockScan {
                        end: index + sentinel.chars().count(),
                        terminated: true,
                        max_depth,
                    };
                }
            }
        }

        let current = chars[index];
        index += 1;

        if current == spec.open {
            depth += 1;
            max_depth = max_depth.max(depth);
        } else if current == spec.close && depth > 0 {
            depth -= 1;
            if depth == 0 && spec.sentinel.is_none() {
                return BlockScan {
                    end: index,
                    terminated: true,
                    max_depth,
                };
            }
        }
    }

    BlockScan {
        end: chars.len(),
        terminated: false,
        max_depth,
    }
}

/// First position at or after `from` where one of `sentinels` starts
///
/// Earlier entries win when several sentinels start at the same position.
pub fn find_sentinel(
    chars: &[char],
    from: usize,
    sentinels: &[&'static str],
) -> Option<(usize, &'static str)> {
    (from..chars.len()).find_map(|index| {
        sentinels
            .iter()
            .find(|sentinel| matches_at(chars, index, sentinel))
            .map(|sentinel| (index, *sentinel))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_matches_at_folds_ascii_case() {
        let text = chars("x@CSS:div");
        assert!(matches_at(&text, 1, "@css:"));
        assert!(!matches_at(&text, 0, "@css:"));
        assert!(!matches_at(&text, 6, "divx"));
        assert!(matches_at(&text, 9, ""));
    }

    #[test]
    fn test_balanced_block_with_nested_braces() {
        // "{{a{b}c}}" with the cursor just past the opening marker
        let text = chars("{{a{b}c}}tail");
        let scan = scan_block(&text, 2, &BlockSpec::balanced('{', '}', 2));

        assert!(scan.terminated);
        assert_eq!(scan.end, 9);
        assert_eq!(scan.max_depth, 3);
    }

    #[test]
    fn test_balanced_block_unterminated_runs_to_end() {
        let text = chars("{{a{b}");
        let scan = scan_block(&text, 2, &BlockSpec::balanced('{', '}', 2));

        assert!(!scan.terminated);
        assert_eq!(scan.end, text.len());
    }

    #[test]
    fn test_sentinel_block_skips_inner_pairs() {
        let text = chars("{{a{b}}}x");
        let scan = scan_block(&text, 2, &BlockSpec::sentinel('{', '}', "}}"));

        assert!(scan.terminated);
        assert_eq!(scan.end, 8);
        assert_eq!(scan.max_depth, 1);
    }

    #[test]
    fn test_sentinel_block_ignores_lone_closer() {
        let text = chars("{{a}b}}");
        let scan = scan_block(&text, 2, &BlockSpec::sentinel('{', '}', "}}"));

        assert!(scan.terminated);
        assert_eq!(scan.end, 7);
    }

    #[test]
    fn test_find_sentinel_priority() {
        let text = chars("ab###c");
        assert_eq!(find_sentinel(&text, 0, &["###", "##"]), Some((2, "###")));
        assert_eq!(find_sentinel(&text, 0, &["##", "###"]), Some((2, "##")));
        assert_eq!(find_sentinel(&text, 5, &["##"]), None);
        assert_eq!(find_sentinel(&text, 40, &["##"]), None);
    }
}
