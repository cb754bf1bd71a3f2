use crate::diagnostics::{DiagnosticKind, Diagnostics};
use isin::ISIN;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

/// How far above the `ISIN:` line a wrapped scheme name may start.
const MAX_LOOKBACK: usize = 5;
/// How far below the `ISIN:` line registrar/advisor text may run.
const MAX_LOOKAHEAD: usize = 10;

static PAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"PAN:\s*([A-Z0-9]+)").unwrap());
static KYC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"KYC:\s*([A-Z]+)").unwrap());
static SCHEME_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+\d+[A-Z]*-").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ISIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"ISIN:\s*([A-Z0-9]+)").unwrap());
static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s*-\s*ISIN:").unwrap());
static ADVISOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?Advisor[:\s]+([A-Z0-9]+-?[A-Z0-9]*)\)?").unwrap());
static REGISTRAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Registrar\s*:\s*(.+?)(?:\s+Folio|\s*$)").unwrap());

/// Scheme identity reconstructed from the (possibly wrapped) ISIN block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityBlock {
    /// The captured lines joined and whitespace-normalised.
    pub isin_line: Option<String>,
    pub scheme_name: Option<String>,
    pub isin: Option<String>,
    pub registrar: Option<String>,
    pub advisor: Option<String>,
}

pub fn extract_pan_and_kyc(folio_text: &str) -> (Option<String>, Option<String>) {
    let pan = PAN_RE.captures(folio_text).map(|c| c[1].to_string());
    let kyc = KYC_RE.captures(folio_text).map(|c| c[1].to_string());
    (pan, kyc)
}

/// Collapses every whitespace run (spaces, tabs, newlines) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Rebuilds the scheme name / ISIN / advisor / registrar block of a folio.
///
/// - Finds the first `ISIN:` line
/// - Walks back up to five lines for the scheme code line (`G201-`, `B205RG-`, ...)
/// - Walks forward up to ten lines, stopping at `Folio No:`
///
/// Without an `ISIN:` marker every field is `None`.
pub fn extract_identity_block(folio_text: &str, diagnostics: &mut Diagnostics) -> IdentityBlock {
    let lines: Vec<&str> = folio_text.lines().collect();

    let Some(isin_index) = lines.iter().position(|line| line.contains("ISIN:")) else {
        diagnostics.push(
            DiagnosticKind::MissingIsin,
            None,
            lines.first().map(|l| l.trim()).unwrap_or_default(),
        );
        return IdentityBlock::default();
    };

    let scheme_start = (isin_index.saturating_sub(MAX_LOOKBACK)..=isin_index)
        .rev()
        .find(|&i| SCHEME_CODE_RE.is_match(lines[i].trim()))
        .unwrap_or(isin_index);

    let mut joined: Vec<&str> = lines[scheme_start..=isin_index]
        .iter()
        .map(|l| l.trim())
        .collect();

    let lookahead_end = (isin_index + MAX_LOOKAHEAD).min(lines.len());
    for line in &lines[isin_index + 1..lookahead_end] {
        if line.contains("Folio No:") {
            break;
        }
        if line.contains("Registrar") && joined.iter().any(|j| j.contains("Registrar")) {
            break;
        }
        joined.push(line.trim());
    }

    let isin_line = normalize_whitespace(&joined.join(" "));

    let isin = ISIN_RE.captures(&isin_line).map(|c| c[1].to_string());
    if let Some(code) = &isin {
        if ISIN::from_str(code).is_err() {
            diagnostics.push(
                DiagnosticKind::IsinChecksumMismatch,
                Some(isin_index + 1),
                code,
            );
        }
    }

    let scheme_name = isin.as_ref().map(|code| scheme_name_from(&isin_line, code));
    let advisor = ADVISOR_RE
        .captures(&isin_line)
        .map(|c| c[1].trim().to_string());
    let registrar = REGISTRAR_RE
        .captures(&isin_line)
        .map(|c| c[1].trim().to_string())
        .filter(|r| !r.is_empty());

    IdentityBlock {
        isin_line: Some(isin_line),
        scheme_name,
        isin,
        registrar,
        advisor,
    }
}

/// Text before ` - ISIN:` without the scheme code prefix.
///
/// Falls back to whatever precedes `ISIN:`, and to the ISIN itself when that
/// is empty, so a found ISIN always comes with a scheme name.
fn scheme_name_from(isin_line: &str, isin: &str) -> String {
    let raw = match SCHEME_RE.captures(isin_line) {
        Some(caps) => caps[1].trim().to_string(),
        None => isin_line
            .split("ISIN:")
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('-')
            .trim()
            .to_string(),
    };
    let name = SCHEME_CODE_RE.replace(&raw, "").trim().to_string();
    if name.is_empty() { isin.to_string() } else { name }
}
