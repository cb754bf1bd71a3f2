//! Generated-input checks over the classifier, the identity block and the
//! transaction parser. Seeds are fixed so failures reproduce.

use cas_extract::identity::extract_identity_block;
use cas_extract::transactions::parse_transactions;
use cas_extract::{AdminKind, Diagnostics, TransactionKind, classify};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const ROUNDS: usize = 200;

const ADMIN_WORDS: &[&str] = &[
    "Registration", "of", "Nominee", "Address", "Updated", "from", "KRA", "Data", "CAN", "Updation",
    "Bank", "Mandate", "Change", "Purchase", "Redemption", "Dividend", "Switch-In", "Switch-Out",
    "Systematic", "Investment",
];

const DESCRIPTION_WORDS: &[&str] = &[
    "Purchase", "Systematic", "Investment", "Instalment", "Switch-In", "Switch-Out", "From", "To",
    "Liquid", "Fund", "Redemption", "less", "TDS,", "STT", "Dividend", "Payout", "(1)",
];

const SCHEME_WORDS: &[&str] = &[
    "Bandhan", "Large", "&", "Mid", "Cap", "Fund-Regular", "Plan-Growth", "(Non-Demat)", "Formerly",
    "Known", "as", "Core", "Equity", "Arbitrage", "Growth",
];

const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn admin(kind: AdminKind) -> TransactionKind {
    TransactionKind::Administrative(kind)
}

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn pick<'a>(rng: &mut StdRng, words: &[&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}

fn phrase(rng: &mut StdRng, words: &[&str], max: usize) -> Vec<String> {
    (0..rng.gen_range(1..=max)).map(|_| pick(rng, words).to_string()).collect()
}

fn random_case(rng: &mut StdRng, text: &str) -> String {
    text.chars()
        .map(|c| {
            if rng.gen_bool(0.5) {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

fn date(rng: &mut StdRng) -> String {
    format!(
        "{:02}-{}-{}",
        rng.gen_range(1..=28),
        pick(rng, MONTHS),
        rng.gen_range(2000..=2025)
    )
}

fn figure(rng: &mut StdRng) -> String {
    format!("{}.{:02}", rng.gen_range(1..10_000), rng.gen_range(0..100))
}

fn gap(rng: &mut StdRng) -> &'static str {
    [" ", "  ", "\t", " \t "][rng.gen_range(0..4)]
}

fn window(body: &str) -> String {
    format!("Opening Unit Balance: 0.000\n{body}\nClosing Unit Balance: 0.000")
}

#[test]
fn test_marker_always_wins() {
    let mut rng = rng(1);
    for _ in 0..ROUNDS {
        let words = phrase(&mut rng, ADMIN_WORDS, 6).join(" ");
        let text = format!("***{words}***");
        assert_eq!(
            classify(&text),
            TransactionKind::Administrative(AdminKind::General),
            "{text}"
        );
    }
}

#[test]
fn test_fee_kinds_are_specific() {
    let mut rng = rng(2);
    for _ in 0..ROUNDS {
        let filler = phrase(&mut rng, ADMIN_WORDS, 3).join(" ");
        let stamp = random_case(&mut rng, "stamp duty");
        let stt = random_case(&mut rng, "stt");

        let text = format!("*** {filler} {stamp} ***");
        assert_eq!(classify(&text), admin(AdminKind::StampDuty), "{text}");

        let text = format!("*** {stt} {filler} ***");
        assert_eq!(classify(&text), admin(AdminKind::SttPaid), "{text}");

        let text = format!("*** {stt} {stamp} ***");
        assert_eq!(classify(&text), admin(AdminKind::StampDuty), "{text}");
    }
}

#[test]
fn test_classification_ignores_case() {
    let mut rng = rng(3);
    for _ in 0..ROUNDS {
        let mut text = phrase(&mut rng, DESCRIPTION_WORDS, 5).join(" ");
        if rng.gen_bool(0.3) {
            text = format!("***{text}***");
        }
        let shuffled = random_case(&mut rng, &text);
        assert_eq!(classify(&text), classify(&shuffled), "{text} / {shuffled}");
    }
}

/// A random run of administrative entries in the layouts statements use.
/// Returns the body and the expected (date, description) pairs.
fn admin_entries(rng: &mut StdRng, count: usize) -> (String, Vec<(String, String)>) {
    let mut lines = Vec::new();
    let mut expected = Vec::new();
    for _ in 0..count {
        let date = date(rng);
        let description = match rng.gen_range(0..3) {
            0 => "*** Stamp Duty ***".to_string(),
            1 => "*** STT Paid ***".to_string(),
            _ => format!("***{}***", phrase(rng, ADMIN_WORDS, 5).join(" ")),
        };
        let fee = rng.gen_bool(0.5).then(|| figure(rng));
        let header = match &fee {
            Some(fee) => format!("{date}{}{fee}", gap(rng)),
            None => date.clone(),
        };
        if rng.gen_bool(0.3) {
            lines.push(format!("{header}{}{description}", gap(rng)));
        } else {
            lines.push(header);
            if rng.gen_bool(0.2) {
                lines.push(String::new());
            }
            lines.push(description.clone());
        }
        expected.push((date, description));
    }
    (lines.join("\n"), expected)
}

#[test]
fn test_every_admin_pair_yields_one_record() {
    let mut rng = rng(4);
    for _ in 0..ROUNDS {
        let count = rng.gen_range(1..=20);
        let (body, expected) = admin_entries(&mut rng, count);
        let txs = parse_transactions(&window(&body), &mut Diagnostics::new());

        assert_eq!(txs.len(), count, "{body}");
        for (tx, (date, description)) in txs.iter().zip(&expected) {
            assert_eq!(tx.date.as_str(), date);
            assert_eq!(&tx.description, description);
            assert!(tx.is_administrative());
        }
    }
}

#[test]
fn test_admin_unit_fields_are_explicit_nulls() {
    let mut rng = rng(5);
    for _ in 0..ROUNDS / 4 {
        let count = rng.gen_range(1..=10);
        let (body, _) = admin_entries(&mut rng, count);
        for tx in parse_transactions(&window(&body), &mut Diagnostics::new()) {
            assert_eq!((tx.nav, tx.units, tx.unit_balance), (None, None, None));
            if !tx.kind.carries_fee() {
                assert_eq!(tx.amount, None);
            }
            let json = serde_json::to_value(&tx).unwrap();
            for key in ["amount", "nav", "units", "unitBalance"] {
                assert!(json.get(key).is_some(), "{key} missing");
            }
            assert!(json["nav"].is_null());
            assert!(json["units"].is_null());
            assert!(json["unitBalance"].is_null());
        }
    }
}

#[test]
fn test_financial_description_is_preserved() {
    let mut rng = rng(6);
    for _ in 0..ROUNDS {
        let words = phrase(&mut rng, DESCRIPTION_WORDS, 6);
        let mut description = words[0].clone();
        for word in &words[1..] {
            description.push_str(gap(&mut rng));
            description.push_str(word);
        }
        let amount = figure(&mut rng);
        let nav = figure(&mut rng);
        let units = figure(&mut rng);
        let balance = figure(&mut rng);
        let line = format!(
            "{}{}{amount}{}{nav}{}{units}{}{description}{}{balance}",
            date(&mut rng),
            gap(&mut rng),
            gap(&mut rng),
            gap(&mut rng),
            gap(&mut rng),
            gap(&mut rng),
        );

        let txs = parse_transactions(&window(&line), &mut Diagnostics::new());
        assert_eq!(txs.len(), 1, "{line}");
        let tx = &txs[0];
        assert_eq!(tx.description, description);
        assert_eq!(tx.kind, classify(&description));
        assert_eq!(tx.amount, amount.parse::<f64>().ok());
        assert_eq!(tx.nav, nav.parse::<f64>().ok());
        assert_eq!(tx.units, units.parse::<f64>().ok());
        assert_eq!(tx.unit_balance, balance.parse::<f64>().ok());
    }
}

/// A folio head whose scheme name is wrapped over `lines` lines with random
/// whitespace. Returns the folio text and the scheme name's words.
fn wrapped_scheme(rng: &mut StdRng, lines: usize) -> (String, Vec<String>) {
    let words = phrase(rng, SCHEME_WORDS, 12);
    let words = if words.len() < lines {
        (0..lines).map(|i| SCHEME_WORDS[i].to_string()).collect()
    } else {
        words
    };

    let mut cuts: Vec<usize> = (1..words.len()).collect();
    cuts.shuffle(&mut *rng);
    cuts.truncate(lines - 1);
    cuts.sort_unstable();
    let mut bounds = vec![0];
    bounds.extend(cuts);
    bounds.push(words.len());

    let mut text = String::from("PAN: ABCDE1234F KYC: OK\n");
    for (i, pair) in bounds.windows(2).enumerate() {
        let mut chunk = String::new();
        for (j, word) in words[pair[0]..pair[1]].iter().enumerate() {
            if j > 0 {
                chunk.push_str(gap(rng));
            }
            chunk.push_str(word);
        }
        if rng.gen_bool(0.3) {
            chunk = format!("{}{chunk}{}", gap(rng), gap(rng));
        }
        if i == 0 {
            chunk = format!("G201-{}", chunk.trim_start());
        }
        if i == lines - 1 {
            let (before, after) = (gap(rng), gap(rng));
            chunk = format!("{chunk}{before}-{after}ISIN: INF194K01524(Advisor: ARN-111569)");
        }
        text.push_str(&chunk);
        text.push('\n');
    }
    text.push_str("Registrar : CAMS\nFolio No: 2772992 / 35\nNidhi Bhasin\n");
    (text, words)
}

#[test]
fn test_wrapped_scheme_name_is_complete() {
    let mut rng = rng(7);
    for _ in 0..ROUNDS {
        let lines = rng.gen_range(1..=5);
        let (text, words) = wrapped_scheme(&mut rng, lines);
        let block = extract_identity_block(&text, &mut Diagnostics::new());

        assert_eq!(block.scheme_name.as_deref(), Some(words.join(" ").as_str()), "{text}");
        assert_eq!(block.isin.as_deref(), Some("INF194K01524"));
        assert_eq!(block.registrar.as_deref(), Some("CAMS"));
    }
}

#[test]
fn test_identity_whitespace_is_normalized() {
    let mut rng = rng(8);
    for _ in 0..ROUNDS {
        let lines = rng.gen_range(1..=5);
        let (text, _) = wrapped_scheme(&mut rng, lines);
        let block = extract_identity_block(&text, &mut Diagnostics::new());

        for field in [block.isin_line.unwrap(), block.scheme_name.unwrap()] {
            assert!(!field.contains("  "), "{field:?}");
            assert!(!field.contains(['\t', '\n']), "{field:?}");
            assert_eq!(field.trim(), field);
        }
    }
}

#[test]
fn test_isin_and_scheme_name_come_together() {
    let mut rng = rng(9);
    for _ in 0..ROUNDS {
        let text = match rng.gen_range(0..3) {
            0 => {
                let lines = rng.gen_range(1..=5);
                wrapped_scheme(&mut rng, lines).0
            }
            1 => "PAN: ABCDE1234F KYC: OK\nISIN: INF209K01264\nFolio No: 1\n".to_string(),
            _ => format!(
                "PAN: ABCDE1234F KYC: OK\nG123-{}\nFolio No: 1\n",
                phrase(&mut rng, SCHEME_WORDS, 6).join(" ")
            ),
        };
        let block = extract_identity_block(&text, &mut Diagnostics::new());
        assert_eq!(block.isin.is_some(), block.scheme_name.is_some(), "{text}");
        if let Some(name) = block.scheme_name {
            assert!(!name.is_empty());
        }
    }
}
