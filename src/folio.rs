use crate::numeric::parse_numeric;
use once_cell::sync::Lazy;
use regex::Regex;

static FOLIO_NO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Folio No:[ \t]*([\d/ \t]+)").unwrap());
static NOMINEE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Nominee\s+\d+:").unwrap());
static NOMINEE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s]+$").unwrap());
static OPENING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Opening Unit Balance:\s*([\d,]+\.?\d*)").unwrap());
static CLOSING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Closing Unit Balance:\s*([\d,]+\.?\d*)").unwrap());
static COST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Total Cost Value:\s*([\d,]+\.?\d*)").unwrap());
static MARKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Market Value on.*?INR\s*([\d,]+\.?\d*)").unwrap());
static NAV_ON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"NAV on.*?INR\s*([\d,]+\.?\d*)").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolioHolder {
    pub folio_number: Option<String>,
    pub investor_name: Option<String>,
    pub nominees: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolioBalances {
    pub opening_unit_balance: Option<f64>,
    pub closing_unit_balance: Option<f64>,
    pub total_cost_value: Option<f64>,
    pub market_value: Option<f64>,
    pub nav_on_date: Option<f64>,
}

/// Folio number, the holder printed on the line after it, and the nominees.
pub fn extract_holder(folio_text: &str) -> FolioHolder {
    let lines: Vec<&str> = folio_text.lines().collect();

    let folio_number = FOLIO_NO_RE
        .captures(folio_text)
        .map(|c| c[1].trim().to_string())
        .filter(|n| !n.is_empty());

    let investor_name = lines
        .iter()
        .position(|line| line.contains("Folio No:"))
        .and_then(|i| lines.get(i + 1))
        .map(|line| line.trim().to_string())
        .filter(|name| !name.is_empty());

    // Only the first nominee line counts.
    let nominees = lines
        .iter()
        .find(|line| line.contains("Nominee"))
        .map(|line| parse_nominees(line))
        .unwrap_or_default();

    FolioHolder {
        folio_number,
        investor_name,
        nominees,
    }
}

fn parse_nominees(line: &str) -> Vec<String> {
    NOMINEE_SPLIT_RE
        .split(line)
        .skip(1)
        .map(str::trim)
        .filter(|name| NOMINEE_NAME_RE.is_match(name))
        .map(str::to_string)
        .collect()
}

pub fn extract_balances(folio_text: &str) -> FolioBalances {
    let figure = |re: &Regex| re.captures(folio_text).and_then(|c| parse_numeric(&c[1]));
    FolioBalances {
        opening_unit_balance: figure(&OPENING_RE),
        closing_unit_balance: figure(&CLOSING_RE),
        total_cost_value: figure(&COST_RE),
        market_value: figure(&MARKET_RE),
        nav_on_date: figure(&NAV_ON_RE),
    }
}
