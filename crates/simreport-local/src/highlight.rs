//! Lexical overlap highlighting (fallback only).
//!
//! Used when the remote service does not supply pre-highlighted text. This is
//! a word-overlap heuristic, not an alignment algorithm: it ignores word
//! order, phrase boundaries and partial overlaps, and will both over- and
//! under-highlight on adversarial inputs. That is a documented limitation of
//! the fallback, not a bug to fix silently; a real aligner can replace this
//! module without touching callers.
//!
//! Tokens are whitespace-delimited with leading/trailing non-alphanumerics
//! trimmed, so `"quicksort,"` and `"quicksort"` match. Interior punctuation
//! is kept: hyphenated or dotted tokens only match themselves.

use std::collections::BTreeSet;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Minimum token length (in chars) for a token to count as shared vocabulary.
/// Short function words ("the", "and", "is") carry no signal.
const MIN_TOKEN_CHARS: usize = 4;

/// Byte range of a whitespace token with non-alphanumeric edges trimmed.
fn core_span(word: &str) -> Option<(usize, usize)> {
    let start = word.find(|c: char| c.is_alphanumeric())?;
    let last = word.rfind(|c: char| c.is_alphanumeric())?;
    let end = last + word[last..].chars().next().map_or(1, char::len_utf8);
    Some((start, end))
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .filter_map(|w| core_span(w).map(|(s, e)| w[s..e].to_lowercase()))
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

/// Lower-cased, edge-trimmed whitespace tokens (length > 3) present in both
/// inputs.
pub fn common_tokens(a: &str, b: &str) -> BTreeSet<String> {
    tokens(a).intersection(&tokens(b)).cloned().collect()
}

/// Wrap every whole-word occurrence of a shared token in `first` with
/// `<mark>` emphasis, comparing case-insensitively against `other`.
///
/// Deterministic: the same pair of inputs always yields the same output.
/// Applying this to text that already contains markers is a non-goal; strip
/// them first with [`strip_marks`] if re-highlighting is needed.
pub fn highlight(first: &str, other: &str) -> String {
    let common = common_tokens(first, other);
    if common.is_empty() {
        return first.to_string();
    }

    // Walk the string as alternating whitespace / word segments so the
    // original spacing survives untouched.
    let mut out = String::with_capacity(first.len() + 16);
    let mut rest = first;
    while !rest.is_empty() {
        let word_end = rest
            .find(char::is_whitespace)
            .unwrap_or(rest.len());
        if word_end > 0 {
            let word = &rest[..word_end];
            match core_span(word) {
                Some((s, e)) if common.contains(&word[s..e].to_lowercase()) => {
                    out.push_str(&word[..s]);
                    out.push_str(MARK_OPEN);
                    out.push_str(&word[s..e]);
                    out.push_str(MARK_CLOSE);
                    out.push_str(&word[e..]);
                }
                _ => out.push_str(word),
            }
            rest = &rest[word_end..];
        }
        let ws_end = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        out.push_str(&rest[..ws_end]);
        rest = &rest[ws_end..];
    }
    out
}

/// Remove all emphasis markers, recovering the unhighlighted text.
pub fn strip_marks(text: &str) -> String {
    text.replace(MARK_OPEN, "").replace(MARK_CLOSE, "")
}
