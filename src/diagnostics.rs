use serde::Serialize;
use std::fmt;

/// What was skipped or repaired while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    FundNotFound,
    DuplicateFundName,
    MissingIsin,
    IsinChecksumMismatch,
    MissingTransactionWindow,
    MissingAdminDate,
    EmptyAdminMarker,
    AdminAmountIgnored,
    MalformedNumber,
    EmptyDescription,
    DateRangeFooter,
    SkippedLine,
    InvalidTransactionType,
    InvalidRecord,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FundNotFound => "fund name not found in statement",
            Self::DuplicateFundName => "fund name listed more than once",
            Self::MissingIsin => "ISIN marker not found in folio",
            Self::IsinChecksumMismatch => "ISIN fails checksum validation",
            Self::MissingTransactionWindow => "opening/closing unit balance markers not found",
            Self::MissingAdminDate => "administrative entry without a date",
            Self::EmptyAdminMarker => "empty administrative marker",
            Self::AdminAmountIgnored => "amount on a non-fee administrative entry ignored",
            Self::MalformedNumber => "unparseable numeric field",
            Self::EmptyDescription => "transaction without description",
            Self::DateRangeFooter => "date range header skipped",
            Self::SkippedLine => "line is not a transaction",
            Self::InvalidTransactionType => "transaction type outside the known set",
            Self::InvalidRecord => "transaction record rejected",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line in the text handed to the parser that reported it.
    pub line_number: Option<usize>,
    pub raw_text: String,
}

/// Collector passed down the parsers. Every entry is also logged as a warning.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, line_number: Option<usize>, raw_text: &str) {
        match line_number {
            Some(line) => log::warn!("{kind} (line {line}): {raw_text:?}"),
            None => log::warn!("{kind}: {raw_text:?}"),
        }
        self.entries.push(Diagnostic {
            kind,
            line_number,
            raw_text: raw_text.to_string(),
        });
    }

    /// Moves `other` into `self`, shifting its line numbers by `line_offset`.
    pub fn absorb(&mut self, other: Diagnostics, line_offset: usize) {
        self.entries.extend(other.entries.into_iter().map(|mut d| {
            d.line_number = d.line_number.map(|n| n + line_offset);
            d
        }));
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
