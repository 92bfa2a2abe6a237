//! Report assembly and plain-text serialization.
//!
//! `build_report` combines scorer output with the explanation synthesizer and
//! the overlap-highlighting fallback into an immutable [`Report`].
//! `render_text` turns a report into the fixed-layout downloadable document.
//! The report identifier and timestamp are injected through [`ReportMeta`],
//! so serialization itself is a pure function of its arguments.

use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use simreport_core::{Mode, Provenance, Report, ScoreReply, Status};
use std::fmt::Write as _;

use crate::{explain, highlight};

/// MIME type for the downloadable report.
pub const REPORT_MIME: &str = "text/plain;charset=utf-8";

/// Compared contents are previewed up to this many characters in the report.
const CONTENT_PREVIEW_CHARS: usize = 2000;

/// Width of the visual score bars, in cells. One cell per 2.5 points.
const BAR_CELLS: usize = 40;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────";

/// Identity and timestamp of a rendered report, supplied by the caller.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportMeta {
    /// Meta for a fresh download: content-derived id, current time.
    pub fn for_report(report: &Report) -> Self {
        Self {
            report_id: report_id(&report.raw_a, &report.raw_b),
            generated_at: Utc::now(),
        }
    }
}

/// Short content-derived identifier: the first 9 hex digits of a SHA-256
/// digest over both inputs, upper-cased. Stable across re-downloads of the
/// same comparison.
pub fn report_id(raw_a: &str, raw_b: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_a.as_bytes());
    hasher.update([0u8]);
    hasher.update(raw_b.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..9].to_uppercase()
}

/// Assemble a finished report from scorer output.
///
/// Highlighted contents come from the remote service when supplied; otherwise
/// the lexical-overlap fallback fills them in locally.
pub fn build_report(
    raw_a: impl Into<String>,
    raw_b: impl Into<String>,
    mode: Mode,
    reply: ScoreReply,
) -> Report {
    let raw_a = raw_a.into();
    let raw_b = raw_b.into();
    let highlighted_a = reply
        .highlighted_a
        .unwrap_or_else(|| highlight::highlight(&raw_a, &raw_b));
    let highlighted_b = reply
        .highlighted_b
        .unwrap_or_else(|| highlight::highlight(&raw_b, &raw_a));
    let explanation = explain::synthesize(&reply.scores, mode);
    Report {
        scores: reply.scores,
        explanation,
        highlighted_a,
        highlighted_b,
        raw_a,
        raw_b,
        mode,
    }
}

/// `{Mode}-Plagiarism-Report-{ISO date}.txt`
pub fn download_filename(mode: Mode, date: NaiveDate) -> String {
    format!("{}-Plagiarism-Report-{}.txt", mode.label(), date.format("%Y-%m-%d"))
}

fn bar(score: f64) -> String {
    let filled = ((score / 2.5).floor() as usize).min(BAR_CELLS);
    let mut out = "█".repeat(filled);
    out.push_str(&"░".repeat(BAR_CELLS - filled));
    out
}

fn score_row(label: &str, score: f64) -> String {
    format!(
        "│ {:<23} │ {:<8} │ {} │",
        label,
        format!("{score}"),
        bar(score)
    )
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Original => "Original",
        Status::Plagiarised => "Plagiarised",
        Status::Unknown => "Unknown",
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= CONTENT_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(CONTENT_PREVIEW_CHARS).collect();
    format!("{cut}\n\n[Content truncated - full content available in the application]")
}

/// Serialize a report into the fixed-layout plain-text document.
///
/// Deterministic: the same report and meta always produce byte-identical
/// output.
pub fn render_text(report: &Report, meta: &ReportMeta) -> String {
    let s = &report.scores;
    let mode_upper = report.mode.label().to_uppercase();
    let mut out = String::new();

    let _ = writeln!(out, "{mode_upper} PLAGIARISM ANALYSIS REPORT");
    let _ = writeln!(out, "===============================");
    let _ = writeln!(
        out,
        "Generated on: {}",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Report ID: {}", meta.report_id);
    let _ = writeln!(
        out,
        "Analysis Type: {} Similarity Detection",
        report.mode.label()
    );
    let _ = writeln!(
        out,
        "Data Source: {}",
        match s.provenance {
            Provenance::Remote => "Remote analysis service",
            Provenance::Fallback => "Locally synthesized fallback (remote service unavailable)",
        }
    );

    let _ = writeln!(out, "\n{RULE}\nEXECUTIVE SUMMARY\n{RULE}\n");
    let _ = writeln!(out, "Final Plagiarism Score: {}%", s.final_score);
    let _ = writeln!(out, "Semantic Similarity: {}%", s.semantic);
    let _ = writeln!(out, "Lexical Similarity: {}%", s.lexical);
    if let Some(structural) = s.structural {
        let _ = writeln!(out, "Structural Similarity: {structural}%");
    }
    let _ = writeln!(out, "Status: {}", status_label(s.status));
    let _ = writeln!(
        out,
        "\nAssessment: {}",
        if s.final_score > 45.0 {
            "FLAGGED - High similarity detected"
        } else {
            "CLEAR - Low similarity detected"
        }
    );

    let _ = writeln!(out, "\nVISUAL SCORE BREAKDOWN:");
    let _ = writeln!(
        out,
        "┌─────────────────────────┬──────────┬──────────────────────────────────────────┐"
    );
    let _ = writeln!(
        out,
        "│ Analysis Type           │ Score    │ Visual Bar                               │"
    );
    let _ = writeln!(
        out,
        "├─────────────────────────┼──────────┼──────────────────────────────────────────┤"
    );
    let _ = writeln!(out, "{}", score_row("Semantic Similarity", s.semantic));
    let _ = writeln!(out, "{}", score_row("Lexical Similarity", s.lexical));
    if let Some(structural) = s.structural {
        let _ = writeln!(out, "{}", score_row("Structural Similarity", structural));
    }
    let _ = writeln!(out, "{}", score_row("Final Plagiarism Score", s.final_score));
    let _ = writeln!(
        out,
        "└─────────────────────────┴──────────┴──────────────────────────────────────────┘"
    );

    let _ = writeln!(out, "\n{RULE}\nPLAGIARISM DISTRIBUTION\n{RULE}\n");
    let plag_block = if s.final_score > 50.0 {
        "████████████████████"
    } else {
        "░░░░░░░░░░░░░░░░░░░░"
    };
    let unique_block = if s.final_score <= 50.0 {
        "████████████████████"
    } else {
        "░░░░░░░░░░░░░░░░░░░░"
    };
    let _ = writeln!(
        out,
        "Plagiarized: {}%  │  Unique: {:.1}%",
        s.final_score,
        100.0 - s.final_score
    );
    let _ = writeln!(out, "{plag_block}  │  {unique_block}");
    let _ = writeln!(out, "{plag_block}  │  {unique_block}");
    let _ = writeln!(out, "Plagiarized Content   │  Unique Content");

    let _ = writeln!(
        out,
        "\n{RULE}\nWHY THIS {mode_upper} GOT {}% PLAGIARISM RATE\n{RULE}\n",
        s.final_score
    );
    for (i, reason) in report.explanation.iter().enumerate() {
        let _ = writeln!(out, "{}. {reason}\n", i + 1);
    }

    let _ = writeln!(out, "{RULE}\n{mode_upper} COMPARISON ANALYSIS\n{RULE}\n");
    let _ = writeln!(out, "ORIGINAL {mode_upper} (SOURCE):\n{THIN_RULE}");
    let _ = writeln!(out, "{}\n", preview(&report.raw_a));
    let _ = writeln!(out, "SUBMITTED {mode_upper} (TARGET):\n{THIN_RULE}");
    let _ = writeln!(out, "{}\n", preview(&report.raw_b));

    let _ = writeln!(out, "{RULE}\nRECOMMENDATION\n{RULE}\n");
    let _ = writeln!(
        out,
        "{}",
        if s.final_score > 75.0 {
            "CRITICAL: Extensive similarities detected - requires immediate review"
        } else if s.final_score > 45.0 {
            "WARNING: Moderate similarities found - consider revision"
        } else {
            "ACCEPTABLE: Low similarity levels - content appears original"
        }
    );

    let _ = writeln!(out, "\nEnd of Report\n{RULE}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use simreport_core::ScoreSet;

    fn fixed_meta() -> ReportMeta {
        ReportMeta {
            report_id: "AB12CD34E".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    fn sample_report(structural: Option<f64>, final_score: f64, mode: Mode) -> Report {
        let scores = ScoreSet::clamped(
            85.4,
            72.8,
            structural,
            final_score,
            Status::Plagiarised,
            Provenance::Remote,
        );
        build_report(
            "fn add(a: i32, b: i32) -> i32 { a + b }",
            "fn sum(x: i32, y: i32) -> i32 { x + y }",
            mode,
            ScoreReply {
                scores,
                highlighted_a: None,
                highlighted_b: None,
            },
        )
    }

    #[test]
    fn rendering_is_deterministic_given_fixed_meta() {
        let report = sample_report(Some(78.2), 79.6, Mode::Code);
        let meta = fixed_meta();
        assert_eq!(render_text(&report, &meta), render_text(&report, &meta));
    }

    #[test]
    fn reference_scenario_renders_high_band_report() {
        let report = sample_report(Some(78.2), 79.6, Mode::Code);
        let text = render_text(&report, &fixed_meta());
        assert!(text.contains("CODE PLAGIARISM ANALYSIS REPORT"));
        assert!(text.contains("Final Plagiarism Score: 79.6%"));
        assert!(text.contains("Structural Similarity: 78.2%"));
        assert!(text.contains("WHY THIS CODE GOT 79.6% PLAGIARISM RATE"));
        assert!(text.contains("1. High semantic similarity"));
        assert!(text.contains("4. Code structure, algorithms, and implementation patterns"));
        assert!(text.contains("CRITICAL: Extensive similarities detected"));
        assert!(text.contains("Report ID: AB12CD34E"));
        assert!(text.contains("Generated on: 2026-03-14 09:26:53 UTC"));
    }

    #[test]
    fn missing_structural_score_omits_its_lines() {
        let text = render_text(&sample_report(None, 60.0, Mode::Text), &fixed_meta());
        assert!(!text.contains("Structural Similarity"));
        // 3 explanation entries, not 4.
        assert!(text.contains("3. Text"));
        assert!(!text.contains("\n4. "));
    }

    #[test]
    fn recommendation_banner_follows_the_75_45_thresholds() {
        let critical = render_text(&sample_report(None, 75.1, Mode::Text), &fixed_meta());
        assert!(critical.contains("CRITICAL:"));
        let warning = render_text(&sample_report(None, 75.0, Mode::Text), &fixed_meta());
        assert!(warning.contains("WARNING:"));
        let acceptable = render_text(&sample_report(None, 45.0, Mode::Text), &fixed_meta());
        assert!(acceptable.contains("ACCEPTABLE:"));
    }

    #[test]
    fn long_contents_are_truncated_with_a_notice() {
        let long = "word ".repeat(600); // 3000 chars
        let scores = ScoreSet::clamped(10.0, 10.0, None, 10.0, Status::Original, Provenance::Remote);
        let report = build_report(
            long.clone(),
            "short text",
            Mode::Text,
            ScoreReply {
                scores,
                highlighted_a: None,
                highlighted_b: None,
            },
        );
        let text = render_text(&report, &fixed_meta());
        assert!(text.contains("[Content truncated"));
        // The full 3000-char content never appears.
        assert!(!text.contains(&long));
    }

    #[test]
    fn fallback_provenance_is_visible_in_the_header() {
        let scores = ScoreSet::clamped(
            72.0,
            77.0,
            Some(74.0),
            75.0,
            Status::Plagiarised,
            Provenance::Fallback,
        );
        let report = build_report(
            "alpha beta",
            "beta gamma",
            Mode::Text,
            ScoreReply {
                scores,
                highlighted_a: None,
                highlighted_b: None,
            },
        );
        let text = render_text(&report, &fixed_meta());
        assert!(text.contains("Locally synthesized fallback"));
    }

    #[test]
    fn remote_highlights_win_over_the_local_fallback() {
        let scores = ScoreSet::clamped(50.0, 50.0, None, 50.0, Status::Unknown, Provenance::Remote);
        let report = build_report(
            "shared words here",
            "shared words there",
            Mode::Text,
            ScoreReply {
                scores,
                highlighted_a: Some("<mark>from the service</mark>".to_string()),
                highlighted_b: None,
            },
        );
        assert_eq!(report.highlighted_a, "<mark>from the service</mark>");
        // Side B had no remote highlight, so the local fallback filled it in.
        assert!(report.highlighted_b.contains("<mark>shared</mark>"));
    }

    #[test]
    fn report_id_is_stable_and_content_derived() {
        let a = report_id("left", "right");
        assert_eq!(a, report_id("left", "right"));
        assert_eq!(a.len(), 9);
        assert!(a.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_ne!(a, report_id("left", "other"));
        // The separator keeps ("ab","c") and ("a","bc") distinct.
        assert_ne!(report_id("ab", "c"), report_id("a", "bc"));
    }

    #[test]
    fn filename_embeds_mode_and_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            download_filename(Mode::Code, date),
            "Code-Plagiarism-Report-2026-03-14.txt"
        );
        assert_eq!(
            download_filename(Mode::Text, date),
            "Text-Plagiarism-Report-2026-03-14.txt"
        );
    }

    proptest! {
        #[test]
        fn bars_are_always_forty_cells(score in 0.0f64..=100.0) {
            let b = bar(score);
            prop_assert_eq!(b.chars().count(), 40);
            let filled = b.chars().filter(|c| *c == '█').count();
            prop_assert_eq!(filled, (score / 2.5).floor() as usize);
        }
    }
}
