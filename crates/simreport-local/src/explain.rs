//! Threshold-band explanation synthesis.
//!
//! Pure and deterministic: the same scores and mode always produce the same
//! sentences, in the same order. One sentence per present scored dimension
//! plus one mode-specific closing line.

use simreport_core::{Mode, ScoreSet};

fn semantic_line(score: f64) -> &'static str {
    if score > 80.0 {
        "High semantic similarity indicates identical meaning and logic patterns"
    } else if score > 60.0 {
        "Moderate semantic similarity shows similar concepts and ideas"
    } else {
        "Low semantic similarity suggests different approaches and concepts"
    }
}

fn lexical_line(score: f64) -> &'static str {
    if score > 70.0 {
        "High lexical similarity reveals matching word patterns and structure"
    } else if score > 50.0 {
        "Moderate lexical similarity shows some shared vocabulary and phrasing"
    } else {
        "Low lexical similarity indicates different word choices and expressions"
    }
}

fn structural_line(score: f64) -> &'static str {
    if score > 75.0 {
        "High structural similarity shows nearly identical organization and formatting patterns"
    } else if score > 50.0 {
        "Moderate structural similarity indicates similar code/text organization approaches"
    } else {
        "Low structural similarity suggests different organizational strategies"
    }
}

fn closing_line(final_score: f64, mode: Mode) -> &'static str {
    match mode {
        Mode::Code => {
            if final_score > 75.0 {
                "Code structure, algorithms, and implementation patterns are nearly identical"
            } else if final_score > 50.0 {
                "Code shows similar algorithmic approaches with some variations"
            } else {
                "Code demonstrates different implementation strategies"
            }
        }
        Mode::Text => {
            if final_score > 75.0 {
                "Text content and argumentation follow very similar patterns"
            } else if final_score > 50.0 {
                "Text shows similar themes with some unique elements"
            } else {
                "Text demonstrates original thinking and unique perspectives"
            }
        }
    }
}

/// Turn a score set into ordered human-readable reasons.
///
/// When `structural` is absent its sentence is omitted entirely, so the
/// result has 3 entries instead of 4.
pub fn synthesize(scores: &ScoreSet, mode: Mode) -> Vec<String> {
    let mut out = Vec::with_capacity(4);
    out.push(semantic_line(scores.semantic).to_string());
    out.push(lexical_line(scores.lexical).to_string());
    if let Some(structural) = scores.structural {
        out.push(structural_line(structural).to_string());
    }
    out.push(closing_line(scores.final_score, mode).to_string());
    out
}
