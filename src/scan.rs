//! Bracket-depth scanning over JavaScript-like source text
//!
//! The legacy exports are never parsed as a whole. Instead the migration finds
//! recognisable anchors with patterns and uses this scanner to locate the
//! bracket that closes a block, skipping anything inside string literals,
//! template literals and comments. The scanner works on bytes: every delimiter
//! it cares about is ASCII, and UTF-8 continuation bytes never collide with them.

use std::ops::Range;

/// Kind of a region produced by [`segments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    /// String or template literal, quotes included.
    Literal,
    Comment,
}

/// A contiguous region of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range<usize>,
}

/// Find the bracket closing the one at `open`.
///
/// `open` must index a `(`, `[` or `{`. Brackets of every kind are tracked on a
/// stack, so `{ ( } )` is rejected rather than matched. Returns `None` when the
/// byte at `open` is not an opening bracket or the block never closes.
pub fn find_closing(src: &str, open: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    closer_for(*bytes.get(open)?)?;

    let mut stack: Vec<u8> = Vec::new();
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => stack.push(bytes[i]),
            b @ (b')' | b']' | b'}') => {
                let opener = stack.pop()?;
                if closer_for(opener) != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i)?;
                continue;
            }
            b'`' => {
                i = skip_template(bytes, i)?;
                continue;
            }
            b'/' if matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) => {
                i = skip_comment(bytes, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `src` into code, literal and comment regions covering the whole text.
pub fn segments(src: &str) -> Vec<Segment> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let skipped = match bytes[i] {
            // An unterminated quote is left in the code region.
            b'"' | b'\'' => skip_string(bytes, i).map(|end| (SegmentKind::Literal, end)),
            b'`' => skip_template(bytes, i).map(|end| (SegmentKind::Literal, end)),
            b'/' if matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) => {
                Some((SegmentKind::Comment, skip_comment(bytes, i)))
            }
            _ => None,
        };

        match skipped {
            Some((kind, end)) => {
                if code_start < i {
                    out.push(Segment { kind: SegmentKind::Code, range: code_start..i });
                }
                out.push(Segment { kind, range: i..end });
                code_start = end;
                i = end;
            }
            None => i += 1,
        }
    }

    if code_start < bytes.len() {
        out.push(Segment { kind: SegmentKind::Code, range: code_start..bytes.len() });
    }
    out
}

/// Whether `offset` falls inside a code region of `segments`.
pub fn is_code(segments: &[Segment], offset: usize) -> bool {
    segments.iter().find(|segment| segment.range.contains(&offset)).is_some_and(|segment| segment.kind == SegmentKind::Code)
}

/// Apply `rewrite` to every code region, leaving literals and comments intact.
pub fn map_code<F>(src: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(src.len());
    for segment in segments(src) {
        let text = &src[segment.range];
        match segment.kind {
            SegmentKind::Code => out.push_str(&rewrite(text)),
            SegmentKind::Literal | SegmentKind::Comment => out.push_str(text),
        }
    }
    out
}

/// Split the inside of an object literal at top-level commas.
///
/// Entries are trimmed and empty entries (e.g. after a trailing comma) dropped.
pub fn split_top_level(src: &str) -> Vec<&str> {
    let bytes = src.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&src[start..i]);
                start = i + 1;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b'`' => {
                i = skip_template(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b'/' if matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) => {
                i = skip_comment(bytes, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&src[start..]);

    parts.into_iter().map(str::trim).filter(|part| !part.is_empty()).collect()
}

/// 1-based line number of a byte offset.
pub fn line_of(src: &str, offset: usize) -> usize {
    src.as_bytes()[..offset.min(src.len())].iter().filter(|&&b| b == b'\n').count() + 1
}

fn closer_for(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        _ => None,
    }
}

/// Returns the index just past the closing quote.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Returns the index just past the closing backtick, following `${ }` nesting.
fn skip_template(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                let src = std::str::from_utf8(bytes).ok()?;
                i = find_closing(src, i + 1)? + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Returns the index just past the comment. Line comments stop before the newline.
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    if bytes[start + 1] == b'/' {
        bytes[start..].iter().position(|&b| b == b'\n').map_or(bytes.len(), |n| start + n)
    } else {
        bytes[start + 2..]
            .windows(2)
            .position(|w| w == b"*/")
            .map_or(bytes.len(), |n| start + 2 + n + 2)
    }
}
