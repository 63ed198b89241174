//! Scanner for `@`-delimited spans already present in a rendered line.
//!
//! Both the highlighter's structural markers and the links inserted by the
//! annotation engine are wrapped in sentinel pairs. Spans are assumed never
//! to nest, so sentinels alternate open/close from the start of the line.

use std::ops::Range;

use crate::payload::SENTINEL;

/// Byte spans strictly between each sentinel pair, in line order.
///
/// A trailing sentinel without a partner opens nothing.
pub fn barriers(line: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (i, c) in line.char_indices() {
        if c != SENTINEL {
            continue;
        }
        match open.take() {
            Some(start) => spans.push(start + 1..i),
            None => open = Some(i),
        }
    }

    spans
}

/// True if `index` lies inside one of `spans`.
pub fn is_protected(spans: &[Range<usize>], index: usize) -> bool {
    spans.iter().any(|span| span.contains(&index))
}

/// True if `marker` sits at `index`, possibly behind other complete spans.
///
/// On a line that is both a usage and a declaration site, a token carries one
/// marker of each kind back to back, so both orders are recognised.
pub fn carries_marker(line: &str, index: usize, marker: &str) -> bool {
    let mut rest = &line[index..];
    loop {
        if rest.starts_with(marker) {
            return true;
        }
        let Some(after_open) = rest.strip_prefix(SENTINEL) else {
            return false;
        };
        let Some(close) = after_open.find(SENTINEL) else {
            return false;
        };
        rest = &after_open[close + SENTINEL.len_utf8()..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sentinels() {
        assert!(barriers("int x = 3;").is_empty());
    }

    #[test]
    fn spans_exclude_sentinels() {
        let line = "ab@cd@ef@g@";
        assert_eq!(barriers(line), vec![3..5, 9..10]);
        assert_eq!(&line[3..5], "cd");
    }

    #[test]
    fn unclosed_sentinel_is_ignored() {
        assert_eq!(barriers("@x@ y @z"), vec![1..2]);
    }

    #[test]
    fn protection() {
        let line = r"run@\hyperlink{defpagerun}{$^D$}@;";
        let spans = barriers(line);
        let inside = line.find("defpagerun").unwrap() + "defpage".len();
        assert!(is_protected(&spans, inside));
        assert!(!is_protected(&spans, 0));
    }

    #[test]
    fn marker_lookup() {
        let line = "fact@R@@D@(n)";
        assert!(carries_marker(line, 4, "@R@"));
        assert!(carries_marker(line, 4, "@D@"));
        assert!(!carries_marker(line, 4, "@X@"));
        assert!(!carries_marker(line, 0, "@R@"));
    }

    #[test]
    fn foreign_span_is_not_a_marker() {
        let line = "x = a@b@c";
        assert!(!carries_marker(line, 5, "@L@"));
        assert!(!carries_marker("a@unclosed", 1, "@L@"));
    }
}
