use serde::{Serialize, Serializer};
use std::fmt;

/// Marker that flags a non-financial folio event in the statement.
pub const ADMIN_MARKER: &str = "***";

/// Non-financial folio events, all marked with `***` in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminKind {
    General,
    StampDuty,
    SttPaid,
}

/// Events that move units or money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialKind {
    SystematicInvestment,
    SwitchOut,
    SwitchIn,
    Redemption,
    Dividend,
    Purchase,
}

/// Closed set of transaction types. Serializes as its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Administrative(AdminKind),
    Financial(FinancialKind),
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 9] = [
        TransactionKind::Administrative(AdminKind::General),
        TransactionKind::Administrative(AdminKind::StampDuty),
        TransactionKind::Administrative(AdminKind::SttPaid),
        TransactionKind::Financial(FinancialKind::SystematicInvestment),
        TransactionKind::Financial(FinancialKind::SwitchOut),
        TransactionKind::Financial(FinancialKind::SwitchIn),
        TransactionKind::Financial(FinancialKind::Redemption),
        TransactionKind::Financial(FinancialKind::Dividend),
        TransactionKind::Financial(FinancialKind::Purchase),
    ];

    pub const PURCHASE: TransactionKind = TransactionKind::Financial(FinancialKind::Purchase);

    pub fn label(&self) -> &'static str {
        match self {
            Self::Administrative(AdminKind::General) => "Administrative",
            Self::Administrative(AdminKind::StampDuty) => "Stamp Duty",
            Self::Administrative(AdminKind::SttPaid) => "STT Paid",
            Self::Financial(FinancialKind::SystematicInvestment) => "Systematic Investment",
            Self::Financial(FinancialKind::SwitchOut) => "Switch-Out",
            Self::Financial(FinancialKind::SwitchIn) => "Switch-In",
            Self::Financial(FinancialKind::Redemption) => "Redemption",
            Self::Financial(FinancialKind::Dividend) => "Dividend",
            Self::Financial(FinancialKind::Purchase) => "Purchase",
        }
    }

    /// Exact label lookup, `None` outside the closed set.
    pub fn from_label(label: &str) -> Option<TransactionKind> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    pub fn is_administrative(&self) -> bool {
        matches!(self, Self::Administrative(_))
    }

    /// Administrative entries that may carry a fee amount.
    pub fn carries_fee(&self) -> bool {
        matches!(
            self,
            Self::Administrative(AdminKind::StampDuty) | Self::Administrative(AdminKind::SttPaid)
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Keyword table for unmarked descriptions; first hit wins.
const FINANCIAL_KEYWORDS: [(&[&str], FinancialKind); 6] = [
    (&["systematic investment", "sip"], FinancialKind::SystematicInvestment),
    (&["switch-out", "switchout"], FinancialKind::SwitchOut),
    (&["switch-in", "switchin"], FinancialKind::SwitchIn),
    (&["redemption", "redeem"], FinancialKind::Redemption),
    (&["dividend"], FinancialKind::Dividend),
    (&["purchase"], FinancialKind::Purchase),
];

/// Classifies a transaction description.
///
/// - `***` marked text is always administrative: `stamp duty`, then `stt`, then general
/// - Otherwise the first matching financial keyword decides
/// - Anything else (including empty text) is a purchase
pub fn classify(description: &str) -> TransactionKind {
    let desc = description.to_lowercase();

    if description.contains(ADMIN_MARKER) {
        let admin = if desc.contains("stamp duty") {
            AdminKind::StampDuty
        } else if desc.contains("stt") {
            AdminKind::SttPaid
        } else {
            AdminKind::General
        };
        return TransactionKind::Administrative(admin);
    }

    for (needles, kind) in &FINANCIAL_KEYWORDS {
        if needles.iter().any(|needle| desc.contains(needle)) {
            return TransactionKind::Financial(*kind);
        }
    }
    TransactionKind::PURCHASE
}

/// Statement wording with the `***` markers and any leading `*` removed.
pub fn clean_label(description: &str) -> String {
    description
        .replace(ADMIN_MARKER, "")
        .trim()
        .trim_start_matches('*')
        .trim()
        .to_string()
}
