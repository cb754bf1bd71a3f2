use crate::classify::{ADMIN_MARKER, classify};
use crate::date::DateToken;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::Transaction;
use crate::numeric::{looks_signed, looks_unsigned, parse_numeric};
use crate::validate::{RawTransaction, validate_transaction};
use once_cell::sync::Lazy;
use regex::{Match, Regex};

/// Substitute text for a marker made only of asterisks.
pub const EMPTY_ADMIN_DESCRIPTION: &str = "***Administrative Entry***";

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());
static DATE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^To\s+\d{2}-[A-Za-z]{3}-\d{4}").unwrap());

/// A non-blank line of the transaction window.
#[derive(Debug, Clone, Copy)]
struct SourceLine<'a> {
    /// 1-based line in the folio text.
    number: usize,
    text: &'a str,
}

impl SourceLine<'_> {
    fn is_marker(&self) -> bool {
        self.text.contains(ADMIN_MARKER)
    }

    fn is_dated(&self) -> bool {
        DateToken::at_line_start(self.text).is_some()
    }
}

/// Financial row waiting for its description.
#[derive(Debug, Clone)]
struct PendingRow {
    date: DateToken,
    amount: Option<f64>,
    nav: Option<f64>,
    units: Option<f64>,
    unit_balance: Option<f64>,
    description: String,
    number: usize,
}

#[derive(Debug)]
enum State {
    ExpectRowStart,
    /// A date line was claimed by the `***` marker on the next line.
    ExpectAdminDescription {
        date: DateToken,
        fee: Option<f64>,
    },
    /// A row had no description; the next line supplies it.
    ExpectOverflowDescription(PendingRow),
}

/// Line-oriented parser over one folio's transaction window.
struct TransactionParser<'a, 'd> {
    lines: Vec<SourceLine<'a>>,
    cursor: usize,
    diagnostics: &'d mut Diagnostics,
    transactions: Vec<Transaction>,
}

/// Parses the rows between `Opening Unit Balance:` and `Closing Unit Balance:`
/// (or `NAV on`) of a folio. Rows come out in source order.
///
/// Missing markers give an empty list and a diagnostic, never an error.
pub fn parse_transactions(folio_text: &str, diagnostics: &mut Diagnostics) -> Vec<Transaction> {
    let all: Vec<&str> = folio_text.lines().collect();

    let mut start = None;
    let mut end = None;
    for (i, line) in all.iter().enumerate() {
        if line.contains("Opening Unit Balance:") {
            start = Some(i + 1);
        }
        if line.contains("Closing Unit Balance:") || line.contains("NAV on") {
            end = Some(i);
            break;
        }
    }
    let (Some(start), Some(end)) = (start, end) else {
        diagnostics.push(
            DiagnosticKind::MissingTransactionWindow,
            None,
            all.first().map(|l| l.trim()).unwrap_or_default(),
        );
        return Vec::new();
    };

    let lines = all
        .iter()
        .enumerate()
        .take(end)
        .skip(start)
        .map(|(i, text)| SourceLine { number: i + 1, text: text.trim() })
        .filter(|line| !line.text.is_empty())
        .collect();

    let mut parser = TransactionParser {
        lines,
        cursor: 0,
        diagnostics,
        transactions: Vec::new(),
    };
    parser.run();
    log::debug!("parsed {} transactions", parser.transactions.len());
    parser.transactions
}

impl TransactionParser<'_, '_> {
    fn run(&mut self) {
        let mut state = State::ExpectRowStart;
        while let Some(line) = self.lines.get(self.cursor).copied() {
            state = match state {
                State::ExpectRowStart => self.row_start(line),
                State::ExpectAdminDescription { date, fee } => {
                    self.emit_admin(date, fee, line.text, line.number);
                    State::ExpectRowStart
                }
                State::ExpectOverflowDescription(row) => {
                    self.finish_overflow(row, line);
                    State::ExpectRowStart
                }
            };
            self.cursor += 1;
        }
        // Lookahead only enters a waiting state when the next line exists.
        debug_assert!(matches!(state, State::ExpectRowStart));
    }

    fn next_line(&self) -> Option<SourceLine<'_>> {
        self.lines.get(self.cursor + 1).copied()
    }

    fn previous_line(&self) -> Option<SourceLine<'_>> {
        self.cursor.checked_sub(1).and_then(|i| self.lines.get(i).copied())
    }

    fn row_start(&mut self, line: SourceLine<'_>) -> State {
        if line.is_marker() {
            self.marker_line(line);
            return State::ExpectRowStart;
        }

        let Some((date, rest)) = DateToken::split_prefix(line.text) else {
            self.diagnostics.push(DiagnosticKind::SkippedLine, Some(line.number), line.text);
            return State::ExpectRowStart;
        };

        if DATE_RANGE_RE.is_match(rest) {
            self.diagnostics.push(DiagnosticKind::DateRangeFooter, Some(line.number), line.text);
            return State::ExpectRowStart;
        }

        let marker_follows = self
            .next_line()
            .is_some_and(|next| next.is_marker() && !next.is_dated());
        if marker_follows {
            let head = TOKEN_RE.find(rest).map_or("", |m| m.as_str());
            let Ok(fee) = self.leading_fee(head, line) else {
                // the marker line goes down with its header
                self.cursor += 1;
                return State::ExpectRowStart;
            };
            return State::ExpectAdminDescription { date, fee };
        }

        let Some(row) = self.parse_row(date, rest, line) else {
            return State::ExpectRowStart;
        };
        let overflow_follows = self
            .next_line()
            .is_some_and(|next| !next.is_marker() && !next.is_dated());
        if row.description.is_empty() && overflow_follows {
            return State::ExpectOverflowDescription(row);
        }
        self.finish_row(row);
        State::ExpectRowStart
    }

    /// A `***` line read outside a header: dated itself, or borrowing the
    /// date of the row just above it.
    fn marker_line(&mut self, line: SourceLine<'_>) {
        if let Some((date, rest)) = DateToken::split_prefix(line.text) {
            let marker_at = rest.find('*').unwrap_or(0);
            let head = rest[..marker_at].trim();
            let description = if head.is_empty() || looks_signed(head) {
                &rest[marker_at..]
            } else {
                rest
            };
            if let Ok(fee) = self.leading_fee(head, line) {
                self.emit_admin(date, fee, description, line.number);
            }
            return;
        }

        match self.previous_line().and_then(|prev| DateToken::at_line_start(prev.text)) {
            Some(date) => self.emit_admin(date, None, line.text, line.number),
            None => self
                .diagnostics
                .push(DiagnosticKind::MissingAdminDate, Some(line.number), line.text),
        }
    }

    /// Fee carried by the token in front of an administrative marker.
    ///
    /// Text that is not shaped like a figure means no fee. A figure that does
    /// not parse is reported and the entry is dropped.
    fn leading_fee(&mut self, head: &str, line: SourceLine<'_>) -> Result<Option<f64>, ()> {
        if head.is_empty() || !looks_signed(head) {
            return Ok(None);
        }
        match parse_numeric(head) {
            Some(fee) => Ok(Some(fee)),
            None => {
                self.diagnostics
                    .push(DiagnosticKind::MalformedNumber, Some(line.number), line.text);
                Err(())
            }
        }
    }

    fn emit_admin(&mut self, date: DateToken, fee: Option<f64>, description: &str, number: usize) {
        let mut description = description.trim();
        if description.chars().all(|c| c == '*') {
            self.diagnostics.push(DiagnosticKind::EmptyAdminMarker, Some(number), description);
            description = EMPTY_ADMIN_DESCRIPTION;
        }

        let kind = classify(description);
        let amount = if kind.carries_fee() {
            fee
        } else {
            if fee.is_some() {
                self.diagnostics
                    .push(DiagnosticKind::AdminAmountIgnored, Some(number), description);
            }
            None
        };

        self.push(
            RawTransaction {
                date: Some(date.as_str().to_string()),
                amount,
                transaction_type: Some(kind.label().to_string()),
                description: Some(description.to_string()),
                ..RawTransaction::default()
            },
            number,
        );
    }

    /// Splits `AMOUNT NAV UNITS DESCRIPTION [BALANCE]` after the date.
    ///
    /// Each numeric slot is only tried when the previous one was filled.
    fn parse_row(
        &mut self,
        date: DateToken,
        rest: &str,
        line: SourceLine<'_>,
    ) -> Option<PendingRow> {
        let tokens: Vec<Match<'_>> = TOKEN_RE.find_iter(rest).collect();
        let mut row = PendingRow {
            date,
            amount: None,
            nav: None,
            units: None,
            unit_balance: None,
            description: String::new(),
            number: line.number,
        };

        let slots: [(fn(&str) -> bool, &mut Option<f64>); 3] = [
            (looks_signed, &mut row.amount),
            (looks_unsigned, &mut row.nav),
            (looks_signed, &mut row.units),
        ];
        let mut idx = 0;
        for (shape, slot) in slots {
            let Some(token) = tokens.get(idx) else { break };
            if !shape(token.as_str()) {
                break;
            }
            match parse_numeric(token.as_str()) {
                Some(value) => *slot = Some(value),
                None => {
                    self.diagnostics
                        .push(DiagnosticKind::MalformedNumber, Some(line.number), line.text);
                    return None;
                }
            }
            idx += 1;
        }

        let mut described = &tokens[idx..];
        if row.units.is_some() {
            if let Some((last, init)) = described.split_last() {
                if looks_unsigned(last.as_str()) {
                    if let Some(balance) = parse_numeric(last.as_str()) {
                        row.unit_balance = Some(balance);
                        described = init;
                    }
                }
            }
        }
        if let (Some(first), Some(last)) = (described.first(), described.last()) {
            row.description = rest[first.start()..last.end()].to_string();
        }
        Some(row)
    }

    /// Takes the next line as description; a trailing figure on it is the
    /// unit balance when the line has more than one token.
    fn finish_overflow(&mut self, mut row: PendingRow, line: SourceLine<'_>) {
        let tokens: Vec<Match<'_>> = TOKEN_RE.find_iter(line.text).collect();
        let mut end = line.text.len();
        if let [.., penultimate, last] = tokens.as_slice() {
            if looks_unsigned(last.as_str()) {
                if let Some(balance) = parse_numeric(last.as_str()) {
                    row.unit_balance = row.unit_balance.or(Some(balance));
                    end = penultimate.end();
                }
            }
        }
        row.description = line.text[..end].trim().to_string();
        self.finish_row(row);
    }

    fn finish_row(&mut self, row: PendingRow) {
        let kind = classify(&row.description);
        let description = if row.description.trim().is_empty() {
            self.diagnostics
                .push(DiagnosticKind::EmptyDescription, Some(row.number), row.date.as_str());
            kind.label().to_string()
        } else {
            row.description
        };
        self.push(
            RawTransaction {
                date: Some(row.date.as_str().to_string()),
                amount: row.amount,
                nav: row.nav,
                units: row.units,
                unit_balance: row.unit_balance,
                transaction_type: Some(kind.label().to_string()),
                description: Some(description),
            },
            row.number,
        );
    }

    fn push(&mut self, raw: RawTransaction, number: usize) {
        if let Some(tx) = validate_transaction(raw, Some(number), self.diagnostics) {
            self.transactions.push(tx);
        }
    }
}
