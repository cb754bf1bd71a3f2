//! Consolidated Account Statement (CAS) text parsing.
//!
//! Turns the pre-extracted text of a CAS into fund houses, folios and
//! their transaction histories. Parsing never fails: anything skipped or
//! repaired is reported as a [`Diagnostic`].

pub mod classify;
pub mod date;
pub mod diagnostics;
pub mod folio;
pub mod identity;
pub mod model;
pub mod numeric;
pub mod sections;
pub mod source;
pub mod summary;
pub mod transactions;
pub mod validate;

pub use classify::{AdminKind, FinancialKind, TransactionKind, classify};
pub use date::DateToken;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use model::{Folio, FundReport, FundSection, FundTransactions, StatementReport, Transaction};
pub use numeric::parse_numeric;
pub use source::{ExtractError, TextSource};

use folio::{extract_balances, extract_holder};
use identity::{extract_identity_block, extract_pan_and_kyc};
use sections::{FolioWindow, locate_fund_sections, segment_folios};
use summary::{extract_investor_contact, extract_portfolio_summary, extract_statement_period};
use transactions::parse_transactions;

/// Builds one folio from its window. Diagnostics carry window line numbers.
pub fn parse_folio(window: &FolioWindow<'_>, diagnostics: &mut Diagnostics) -> Folio {
    let text = window.text;
    let (_, kyc_status) = extract_pan_and_kyc(text);
    let identity = extract_identity_block(text, diagnostics);
    let holder = extract_holder(text);
    let balances = extract_balances(text);
    let transactions = parse_transactions(text, diagnostics);

    Folio {
        pan: window.pan.clone(),
        kyc_status,
        isin_line: identity.isin_line,
        scheme_name: identity.scheme_name,
        isin: identity.isin,
        registrar: identity.registrar,
        advisor: identity.advisor,
        folio_number: holder.folio_number,
        investor_name: holder.investor_name,
        nominees: holder.nominees,
        opening_unit_balance: balances.opening_unit_balance,
        closing_unit_balance: balances.closing_unit_balance,
        total_cost_value: balances.total_cost_value,
        market_value: balances.market_value,
        nav_on_date: balances.nav_on_date,
        transactions,
    }
}

/// Parses every fund section named in `fund_names`.
///
/// Diagnostic line numbers refer to lines of `text`.
pub fn extract_fund_transactions(text: &str, fund_names: &[String]) -> FundTransactions {
    let mut diagnostics = Diagnostics::new();
    let sections = locate_fund_sections(text, fund_names, &mut diagnostics);

    let mut funds = Vec::with_capacity(sections.len());
    let mut total_folios = 0;
    for section in sections {
        let folios: Vec<Folio> = segment_folios(section.text_window)
            .iter()
            .map(|window| {
                let mut local = Diagnostics::new();
                let folio = parse_folio(window, &mut local);
                diagnostics.absorb(local, section.start_line + window.start_line);
                folio
            })
            .collect();
        log::debug!("{}: {} folios", section.fund_name, folios.len());
        total_folios += folios.len();
        funds.push(FundReport {
            fund_name: section.fund_name,
            folios,
        });
    }

    log::info!("parsed {} folios across {} funds", total_folios, funds.len());
    FundTransactions {
        total_funds: funds.len(),
        total_folios,
        funds,
        diagnostics: diagnostics.into_vec(),
    }
}

/// Full statement: period, investor, portfolio summary, and the fund
/// sections named by that summary.
pub fn parse_statement(text: &str) -> StatementReport {
    let portfolio = extract_portfolio_summary(text);
    let transactions = extract_fund_transactions(text, &portfolio.fund_names());
    StatementReport {
        period: extract_statement_period(text),
        investor: extract_investor_contact(text),
        portfolio_summary: portfolio.funds,
        portfolio_total: portfolio.total,
        transactions,
    }
}
