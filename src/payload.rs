//! Decoder for compressed tag payloads.
//!
//! The indexer shortens each stored row with a small substitution grammar
//! introduced by the `@` sentinel:
//!
//! | Sequence | Expands to |
//! |----------|------------|
//! | `@n` | the row's symbol name |
//! | `@d` | `define` |
//! | `@t` | `typedef` |
//! | `@k` (one digit) | `k` spaces |
//! | `@{digits}` | a run of spaces (see [`expand`]) |
//! | `@` + anything else | a literal `@` |
//!
//! Expanded rows are then split into fields. Definition rows carry
//! `file symbol line-number text`, reference rows carry
//! `file symbol line-list`. Rows that do not have that shape are bookkeeping
//! rows and decode to [`Payload::Malformed`].

use crate::error::{XrefError, XrefResult};
use crate::lines::decode_line_list;
use crate::models::{DefinitionRecord, FileId, ReferenceRecord};

pub const SENTINEL: char = '@';

/// Which store a row came from, and so which shape to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Definition,
    Reference,
}

impl PayloadKind {
    fn field_count(self) -> usize {
        match self {
            PayloadKind::Definition => 4,
            PayloadKind::Reference => 3,
        }
    }
}

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// The row ends with an unpaired `@`.
    DanglingSentinel,
    /// A `@{...}` run was unterminated or did not hold a number.
    BadSpaceRun(String),
    /// The expanded row does not split into the expected number of fields.
    FieldCount { expected: usize },
    /// The leading field is not a file number.
    NonNumericFile(String),
}

/// Result of decoding one tag row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Definition(DefinitionRecord),
    Reference(ReferenceRecord),
    Malformed(Malformed),
}

/// Expand the substitution grammar of a stored row.
///
/// For a brace run, the characters up to and including the closing `}` are
/// collected and the last two of them are dropped before parsing, so
/// `@{123}` yields 12 spaces.
pub fn expand(text: &str, symbol: &str) -> Result<String, Malformed> {
    let mut out = String::with_capacity(text.len() + symbol.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != SENTINEL {
            out.push(c);
            continue;
        }
        let code = chars.next().ok_or(Malformed::DanglingSentinel)?;
        match code {
            'n' => out.push_str(symbol),
            'd' => out.push_str("define"),
            't' => out.push_str("typedef"),
            '{' => {
                let mut run = String::new();
                loop {
                    match chars.next() {
                        Some(ch) => {
                            run.push(ch);
                            if ch == '}' {
                                break;
                            }
                        }
                        None => return Err(Malformed::BadSpaceRun(run)),
                    }
                }
                let keep = run.chars().count().saturating_sub(2);
                let digits: String = run.chars().take(keep).collect();
                let count: usize = digits
                    .parse()
                    .map_err(|_| Malformed::BadSpaceRun(run.clone()))?;
                push_spaces(&mut out, count);
            }
            d if d.is_ascii_digit() => {
                push_spaces(&mut out, (d as u8 - b'0') as usize);
            }
            _ => out.push(SENTINEL),
        }
    }

    Ok(out)
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}

/// Split `text` into exactly `count` fields.
///
/// Every field but the last is delimited by whitespace runs. The last field
/// is everything after the single whitespace character closing the field
/// before it, so stored source text keeps its indentation.
fn split_fields(text: &str, count: usize) -> Option<Vec<&str>> {
    let mut fields = Vec::with_capacity(count);
    let mut rest = text.trim_start();

    while fields.len() + 1 < count {
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = &rest[end..];
        if fields.len() + 1 < count {
            rest = rest.trim_start();
        }
    }

    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => fields.push(chars.as_str()),
        _ => return None,
    }
    Some(fields)
}

fn parse_file(field: &str) -> Option<FileId> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok().map(FileId)
}

/// Decode one row of the definition or reference store.
///
/// `key` is the row's symbol name; it is substituted for `@n` and checked
/// against the decoded symbol field.
pub fn decode(kind: PayloadKind, key: &str, dat: &str) -> XrefResult<Payload> {
    let expanded = match expand(dat, key) {
        Ok(text) => text,
        Err(reason) => return Ok(Payload::Malformed(reason)),
    };

    let expected = kind.field_count();
    let fields = match split_fields(&expanded, expected) {
        Some(fields) => fields,
        None => return Ok(Payload::Malformed(Malformed::FieldCount { expected })),
    };

    let file = match parse_file(fields[0]) {
        Some(file) => file,
        None => {
            return Ok(Payload::Malformed(Malformed::NonNumericFile(
                fields[0].to_string(),
            )))
        }
    };

    let symbol = fields[1].trim();
    if symbol != key.trim() {
        return Err(XrefError::SymbolMismatch {
            key: key.trim().to_string(),
            decoded: symbol.to_string(),
        });
    }

    match kind {
        PayloadKind::Definition => {
            let line = fields[2]
                .parse::<u32>()
                .map_err(|_| XrefError::BadLineNumber {
                    symbol: symbol.to_string(),
                    value: fields[2].to_string(),
                })?;
            Ok(Payload::Definition(DefinitionRecord {
                file,
                symbol: symbol.to_string(),
                line,
                payload: fields[3].to_string(),
            }))
        }
        PayloadKind::Reference => {
            let list = fields[2].trim();
            if list.is_empty() || list.contains(char::is_whitespace) {
                return Ok(Payload::Malformed(Malformed::FieldCount { expected }));
            }
            Ok(Payload::Reference(ReferenceRecord {
                file,
                symbol: symbol.to_string(),
                lines: decode_line_list(list)?,
            }))
        }
    }
}
