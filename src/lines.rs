//! Decoder for the indexer's compressed line lists.
//!
//! Reference rows store their usage lines as comma-separated tokens that are
//! delta-encoded against a running base:
//!
//! | Token | Emits | Next base |
//! |-------|-------|-----------|
//! | `N` | `base + N` | `base + N` |
//! | `N-M` | `base+N ..= base+N+M` | `base + N + M` |
//!
//! The run length `M` is inclusive, so `"10,11-3"` decodes to
//! `10, 21, 22, 23, 24`.

use crate::error::{XrefError, XrefResult};

/// Running state of one line-list decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineCursor {
    base: u32,
}

impl LineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one token, appending its lines to `out`.
    pub fn step(&mut self, token: &str, list: &str, out: &mut Vec<u32>) -> XrefResult<()> {
        let malformed = || XrefError::MalformedLineToken {
            token: token.to_string(),
            list: list.to_string(),
        };

        match token.split_once('-') {
            Some((offset, run)) => {
                let offset = parse_part(offset).ok_or_else(malformed)?;
                let run = parse_part(run).ok_or_else(malformed)?;
                let start = self.base.checked_add(offset).ok_or_else(malformed)?;
                let end = start.checked_add(run).ok_or_else(malformed)?;
                out.extend(start..=end);
                self.base = end;
            }
            None => {
                let delta = parse_part(token).ok_or_else(malformed)?;
                let line = self.base.checked_add(delta).ok_or_else(malformed)?;
                out.push(line);
                self.base = line;
            }
        }
        Ok(())
    }
}

fn parse_part(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Decode a full compressed line list into explicit line numbers.
pub fn decode_line_list(list: &str) -> XrefResult<Vec<u32>> {
    let mut cursor = LineCursor::new();
    let mut lines = Vec::new();
    for token in list.trim().split(',') {
        cursor.step(token, list, &mut lines)?;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_zero() {
        assert_eq!(decode_line_list("0").unwrap(), vec![0]);
    }

    #[test]
    fn inclusive_run() {
        assert_eq!(decode_line_list("5-2").unwrap(), vec![5, 6, 7]);
    }

    #[test]
    fn base_carries_after_run() {
        assert_eq!(decode_line_list("5-2,1").unwrap(), vec![5, 6, 7, 8]);
    }

    #[test]
    fn base_carries_into_run() {
        assert_eq!(
            decode_line_list("10,11-3").unwrap(),
            vec![10, 21, 22, 23, 24]
        );
    }

    #[test]
    fn deltas_accumulate() {
        assert_eq!(decode_line_list("3,4,10").unwrap(), vec![3, 7, 17]);
    }

    #[test]
    fn output_is_strictly_ascending() {
        let lines = decode_line_list("2,1-4,3,1,7-0,1-1").unwrap();
        assert!(lines.windows(2).all(|w| w[0] < w[1]), "{:?}", lines);
    }

    #[test]
    fn cursor_tracks_base() {
        let mut cursor = LineCursor::new();
        let mut out = Vec::new();
        cursor.step("4", "4,2-1", &mut out).unwrap();
        cursor.step("2-1", "4,2-1", &mut out).unwrap();
        assert_eq!(out, vec![4, 6, 7]);
        cursor.step("3", "4,2-1,3", &mut out).unwrap();
        assert_eq!(out, vec![4, 6, 7, 10]);
    }

    #[test]
    fn malformed_tokens_are_fatal() {
        for bad in ["", "a", "3,x", "1-", "-2", "1-2-3", "4,,5", "+3"] {
            let err = decode_line_list(bad).unwrap_err();
            assert!(
                matches!(err, XrefError::MalformedLineToken { .. }),
                "{:?} -> {:?}",
                bad,
                err
            );
        }
    }
}
