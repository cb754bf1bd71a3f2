use crate::classify::{TransactionKind, clean_label};
use crate::date::DateToken;
use crate::diagnostics::Diagnostic;
use crate::summary::{FundSummary, InvestorContact, PortfolioTotal, StatementPeriod};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// One row of a folio's transaction history.
///
/// Administrative kinds never carry `nav`, `units` or `unit_balance`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: DateToken,
    pub amount: Option<f64>,
    pub nav: Option<f64>,
    pub units: Option<f64>,
    pub unit_balance: Option<f64>,
    pub kind: TransactionKind,
    pub description: String,
}

impl Transaction {
    pub fn is_administrative(&self) -> bool {
        self.kind.is_administrative()
    }

    /// Statement wording without the `***` markers.
    pub fn label(&self) -> String {
        clean_label(&self.description)
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Transaction", 8)?;
        s.serialize_field("date", &self.date)?;
        s.serialize_field("amount", &self.amount)?;
        s.serialize_field("nav", &self.nav)?;
        s.serialize_field("units", &self.units)?;
        s.serialize_field("transactionType", &self.kind)?;
        s.serialize_field("unitBalance", &self.unit_balance)?;
        s.serialize_field("description", &self.description)?;
        s.serialize_field("isAdministrative", &self.is_administrative())?;
        s.end()
    }
}

/// A sub-account inside a fund house, anchored on its `PAN:` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folio {
    pub pan: String,
    pub kyc_status: Option<String>,
    pub isin_line: Option<String>,
    pub scheme_name: Option<String>,
    pub isin: Option<String>,
    pub registrar: Option<String>,
    pub advisor: Option<String>,
    pub folio_number: Option<String>,
    pub investor_name: Option<String>,
    pub nominees: Vec<String>,
    pub opening_unit_balance: Option<f64>,
    pub closing_unit_balance: Option<f64>,
    pub total_cost_value: Option<f64>,
    pub market_value: Option<f64>,
    pub nav_on_date: Option<f64>,
    pub transactions: Vec<Transaction>,
}

/// Slice of the statement belonging to one fund house.
#[derive(Debug, Clone, PartialEq)]
pub struct FundSection<'a> {
    pub fund_name: String,
    /// 0-based line of the fund name anchor in the full text.
    pub start_line: usize,
    pub text_window: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundReport {
    pub fund_name: String,
    pub folios: Vec<Folio>,
}

/// Result of [`crate::extract_fund_transactions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundTransactions {
    pub funds: Vec<FundReport>,
    pub total_folios: usize,
    pub total_funds: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of [`crate::parse_statement`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementReport {
    pub period: StatementPeriod,
    pub investor: InvestorContact,
    pub portfolio_summary: Vec<FundSummary>,
    pub portfolio_total: Option<PortfolioTotal>,
    #[serde(flatten)]
    pub transactions: FundTransactions,
}
