//! Statement-level facts outside the fund sections: the portfolio summary
//! table (which names the fund houses), the statement period, and the
//! investor's contact block.

use crate::date::DateToken;
use crate::numeric::parse_numeric;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Contact details are only looked for in the statement header.
const HEADER_LINES: usize = 50;

static FUND_ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?Mutual Fund)\s+([\d,]+\.?\d*)\s+([\d,]+\.?\d*)$").unwrap());
static TOTAL_ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Total\s+([\d,]+\.\d{2})\s+([\d,]+\.\d{2})").unwrap());
static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)Consolidated Account Statement[",\s]+"#,
        r"(\d{2}-[A-Za-z]{3}-\d{4})\s+to\s+(\d{2}-[A-Za-z]{3}-\d{4})",
    ))
    .unwrap()
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Email\s*(?:Id)?:\s*(\S+@\S+)").unwrap());
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Mobile|Phone):\s*([+\d\s()-]+)").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSummary {
    pub fund_name: String,
    pub cost_value: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotal {
    pub cost_value: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub funds: Vec<FundSummary>,
    pub total: Option<PortfolioTotal>,
}

impl PortfolioSummary {
    pub fn fund_names(&self) -> Vec<String> {
        self.funds.iter().map(|f| f.fund_name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementPeriod {
    pub opening: Option<DateToken>,
    pub closing: Option<DateToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Reads the `PORTFOLIO SUMMARY` table up to the first `Date ... Transaction` header.
pub fn extract_portfolio_summary(text: &str) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();
    let mut in_summary = false;

    for line in text.lines().map(str::trim) {
        if line.contains("PORTFOLIO SUMMARY") {
            in_summary = true;
            continue;
        }
        if line.contains("Date") && line.contains("Transaction") {
            break;
        }
        if !in_summary {
            continue;
        }
        if line.starts_with("Total ") {
            if let Some(caps) = TOTAL_ROW_RE.captures(line) {
                if let (Some(cost_value), Some(market_value)) =
                    (parse_numeric(&caps[1]), parse_numeric(&caps[2]))
                {
                    summary.total = Some(PortfolioTotal { cost_value, market_value });
                }
            }
            continue;
        }
        if let Some(caps) = FUND_ROW_RE.captures(line) {
            if let (Some(cost_value), Some(market_value)) =
                (parse_numeric(&caps[2]), parse_numeric(&caps[3]))
            {
                summary.funds.push(FundSummary {
                    fund_name: caps[1].trim().to_string(),
                    cost_value,
                    market_value,
                });
            }
        }
    }

    log::info!("portfolio summary lists {} funds", summary.funds.len());
    summary
}

pub fn extract_statement_period(text: &str) -> StatementPeriod {
    let Some(caps) = PERIOD_RE.captures(text) else {
        log::warn!("statement period not found");
        return StatementPeriod::default();
    };
    StatementPeriod {
        opening: DateToken::at_line_start(&caps[1]),
        closing: DateToken::at_line_start(&caps[2]),
    }
}

/// Email and phone from the header; the name is the first plausible line
/// after `Email Id:`, the address the lines after it up to `Mobile:`.
pub fn extract_investor_contact(text: &str) -> InvestorContact {
    let lines: Vec<&str> = text.lines().take(HEADER_LINES).map(str::trim).collect();
    let mut contact = InvestorContact::default();

    for line in &lines {
        if line.contains("Email Id:") || line.contains("Email:") {
            if let Some(caps) = EMAIL_RE.captures(line) {
                contact.email = Some(caps[1].to_string());
            }
        }
        if line.contains("Mobile:") || line.contains("Phone:") {
            if let Some(caps) = PHONE_RE.captures(line) {
                contact.phone = Some(caps[1].trim().to_string());
            }
        }
    }

    let Some(email_at) = lines.iter().position(|l| l.contains("Email Id:")) else {
        return contact;
    };
    let name_at = (email_at + 1..(email_at + 5).min(lines.len())).find(|&j| is_name_line(lines[j]));
    if let Some(j) = name_at {
        contact.name = Some(lines[j].to_string());

        let mut address = Vec::new();
        for line in lines.iter().take((j + 10).min(lines.len())).skip(j + 1) {
            if line.contains("Mobile:") {
                break;
            }
            if line.len() > 2 && !line.contains("This Consolidated") && !line.contains("Page ") {
                address.push(*line);
            }
        }
        if !address.is_empty() {
            contact.address = Some(address.join(", "));
        }
    }
    contact
}

fn is_name_line(line: &str) -> bool {
    !line.is_empty()
        && !["Email", "Mobile", "Page", "Statement"].iter().any(|w| line.contains(w))
        && !line.starts_with(|c: char| c.is_ascii_digit())
        && line.len() > 3
        && line.len() < 100
}
