use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::FundSection;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PAN_ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^PAN:\s*([A-Z]{5}\d{4}[A-Z])").unwrap());

/// A folio slice of a fund window, starting at its `PAN:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct FolioWindow<'a> {
    pub pan: String,
    /// 0-based line of the PAN anchor inside the fund window.
    pub start_line: usize,
    pub text: &'a str,
}

/// Byte offset of each line start, with the line itself (no line terminator).
fn line_starts(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|raw| {
            let start = offset;
            offset += raw.len();
            (start, raw.trim_end_matches(['\n', '\r']))
        })
        .collect()
}

fn line_of(text: &str, byte: usize) -> usize {
    text[..byte].matches('\n').count()
}

/// Cuts the statement into one window per fund house.
///
/// Each fund name must match a whole line (trailing whitespace ignored). A
/// window runs from the name's first occurrence to the nearest later
/// occurrence of any other fund name. Windows come back in document order;
/// names that never occur are reported and skipped.
pub fn locate_fund_sections<'a>(
    text: &'a str,
    fund_names: &[String],
    diagnostics: &mut Diagnostics,
) -> Vec<FundSection<'a>> {
    let lines = line_starts(text);
    let occurrences = |name: &str| -> Vec<usize> {
        lines
            .iter()
            .filter(|(_, line)| line.trim_end() == name)
            .map(|(start, _)| *start)
            .collect()
    };

    let mut seen = HashSet::new();
    let names: Vec<&str> = fund_names
        .iter()
        .map(|n| n.trim())
        .filter(|name| {
            if seen.insert(*name) {
                true
            } else {
                diagnostics.push(DiagnosticKind::DuplicateFundName, None, name);
                false
            }
        })
        .collect();

    let all: Vec<(&str, Vec<usize>)> = names.iter().map(|n| (*n, occurrences(n))).collect();

    let mut sections = Vec::new();
    for (name, hits) in &all {
        let Some(&start) = hits.first() else {
            diagnostics.push(DiagnosticKind::FundNotFound, None, name);
            continue;
        };
        let end = all
            .iter()
            .filter(|(other, _)| other != name)
            .flat_map(|(_, other_hits)| other_hits.iter().copied())
            .filter(|&hit| hit > start)
            .min()
            .unwrap_or(text.len());
        sections.push(FundSection {
            fund_name: name.to_string(),
            start_line: line_of(text, start),
            text_window: &text[start..end],
        });
    }

    sections.sort_by_key(|s| s.start_line);
    log::info!("located {} of {} fund sections", sections.len(), names.len());
    sections
}

/// Splits a fund window at every line starting with a well-formed `PAN:`.
/// Text before the first anchor belongs to no folio.
pub fn segment_folios(fund_window: &str) -> Vec<FolioWindow<'_>> {
    let anchors: Vec<(usize, String)> = PAN_ANCHOR_RE
        .captures_iter(fund_window)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str().to_string())))
        .collect();

    anchors
        .iter()
        .enumerate()
        .map(|(i, (start, pan))| {
            let end = anchors.get(i + 1).map(|(next, _)| *next).unwrap_or(fund_window.len());
            FolioWindow {
                pan: pan.clone(),
                start_line: line_of(fund_window, *start),
                text: &fund_window[*start..end],
            }
        })
        .collect()
}
