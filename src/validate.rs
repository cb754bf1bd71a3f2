use crate::classify::TransactionKind;
use crate::date::DateToken;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::Transaction;

/// A transaction before validation: every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub nav: Option<f64>,
    pub units: Option<f64>,
    pub unit_balance: Option<f64>,
    pub transaction_type: Option<String>,
    pub description: Option<String>,
}

/// Maps a type label onto the closed set, defaulting to `Purchase`.
pub fn normalize_kind(
    label: &str,
    line: Option<usize>,
    diagnostics: &mut Diagnostics,
) -> TransactionKind {
    TransactionKind::from_label(label).unwrap_or_else(|| {
        diagnostics.push(DiagnosticKind::InvalidTransactionType, line, label);
        TransactionKind::PURCHASE
    })
}

/// Gate every record passes before it is appended to a folio.
///
/// - `date`, `transactionType` and `description` must be present, else the record is rejected
/// - an unknown type becomes `Purchase`
/// - administrative records lose any `nav`, `units` and `unitBalance`
/// - non-finite figures become `None`
pub fn validate_transaction(
    raw: RawTransaction,
    line: Option<usize>,
    diagnostics: &mut Diagnostics,
) -> Option<Transaction> {
    let mut missing = Vec::new();
    let date = raw
        .date
        .as_deref()
        .and_then(|d| DateToken::at_line_start(d).filter(|t| t.as_str() == d.trim()));
    if date.is_none() {
        missing.push("date");
    }
    if raw.transaction_type.is_none() {
        missing.push("transactionType");
    }
    let description = raw.description.as_deref().map(str::trim).filter(|d| !d.is_empty());
    if description.is_none() {
        missing.push("description");
    }
    let (Some(date), Some(label), Some(description)) =
        (date, raw.transaction_type.as_deref(), description)
    else {
        diagnostics.push(
            DiagnosticKind::InvalidRecord,
            line,
            &format!("missing {}", missing.join(", ")),
        );
        return None;
    };

    let kind = normalize_kind(label, line, diagnostics);
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    let mut tx = Transaction {
        date,
        amount: finite(raw.amount),
        nav: finite(raw.nav),
        units: finite(raw.units),
        unit_balance: finite(raw.unit_balance),
        kind,
        description: description.to_string(),
    };

    let has_units = tx.nav.is_some() || tx.units.is_some() || tx.unit_balance.is_some();
    if kind.is_administrative() && has_units {
        diagnostics.push(
            DiagnosticKind::InvalidRecord,
            line,
            "unit fields on administrative entry cleared",
        );
        tx.nav = None;
        tx.units = None;
        tx.unit_balance = None;
    }
    Some(tx)
}
