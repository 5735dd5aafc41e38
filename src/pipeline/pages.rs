//! Page selection: turn a user page spec into zero-based indices.
//!
//! Grammar (1-based, inclusive):
//!
//! ```text
//! spec  := "all" | token ("," token)*
//! token := n | start "-" end
//! ```
//!
//! The parser is all-or-nothing. One bad token anywhere discards every
//! partial result and the whole document is selected instead. It does not
//! sort, deduplicate or bounds-check: `"3,1,3"` on a 2-page document yields
//! `[2, 0, 2]`, and the pipeline skips the out-of-range `2`s page by page.

use crate::error::SelectionError;
use tracing::warn;

/// The spec that selects every page.
pub const ALL_PAGES: &str = "all";

/// Longest span a single range may expand to before its end is clamped.
///
/// `"5-999999999"` is a valid way to say "page 5 to the end", but expanding
/// it literally would allocate gigabytes that the downstream bounds check
/// throws away. Past this span the end is clamped to the last page.
pub const MAX_SELECTED_INDICES: usize = 1 << 16;

/// Parse `spec`, falling back to every page of a `page_count`-page document
/// when it cannot be parsed.
///
/// Indices may be negative or `>= page_count`; callers must bounds-check.
pub fn parse(spec: &str, page_count: usize) -> Vec<i64> {
    match try_parse(spec, page_count) {
        Ok(indices) => indices,
        Err(e) => {
            warn!("{}", e);
            all_pages(page_count)
        }
    }
}

/// Parse `spec` without the fallback.
pub fn try_parse(spec: &str, page_count: usize) -> Result<Vec<i64>, SelectionError> {
    if spec == ALL_PAGES {
        return Ok(all_pages(page_count));
    }

    let unparsable = |reason: String| SelectionError::RangeSpecUnparsable {
        spec: spec.to_string(),
        reason,
    };

    let mut indices = Vec::new();
    for token in spec.split(',') {
        if token.contains('-') {
            let (start, end) = match token.split('-').collect::<Vec<_>>().as_slice() {
                [start, end] => (
                    parse_page_number(start).map_err(&unparsable)?,
                    parse_page_number(end).map_err(&unparsable)?,
                ),
                _ => return Err(unparsable(format!("malformed range '{}'", token.trim()))),
            };

            // A reversed range selects nothing; it is not swapped.
            let end = clamp_range_end(start, end, page_count);
            indices.extend((start..=end).map(|n| n - 1));
        } else {
            indices.push(parse_page_number(token).map_err(&unparsable)? - 1);
        }
    }

    Ok(indices)
}

/// Cap an oversized range at the document end (or at `start`, when the
/// range begins past the end). Ranges within [`MAX_SELECTED_INDICES`] are
/// left alone, out-of-range tail included.
fn clamp_range_end(start: i64, end: i64, page_count: usize) -> i64 {
    let span = end.saturating_sub(start).saturating_add(1);
    if usize::try_from(span).is_ok_and(|span| span > MAX_SELECTED_INDICES) {
        end.min(start.max(page_count as i64))
    } else {
        end
    }
}

/// Map a parsed index onto the document, or `None` if it is out of range.
pub fn checked_index(index: i64, page_count: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < page_count)
}

/// `[0, 1, …, page_count - 1]`.
pub fn all_pages(page_count: usize) -> Vec<i64> {
    (0..page_count as i64).collect()
}

fn parse_page_number(token: &str) -> Result<i64, String> {
    let trimmed = token.trim();
    trimmed
        .parse::<i64>()
        .map_err(|e| format!("'{}' is not a page number ({})", trimmed, e))
}
