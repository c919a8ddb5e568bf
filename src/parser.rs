use std::sync::LazyLock;

use chrono::NaiveDate;
use log::debug;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::categorize::categorize;
use crate::period::billing_period;
use crate::Transaction;

/// Iterator which parses transaction lines from the text of a cartola PDF
///
/// The format of the document is as follows:
///
/// 1. A fixed-size prelude of account metadata (holder, account number,
///    statement range), skipped by position.
/// 2. One line per movement:
///    `"01/08/2025 UBER TRIP 1234 $ 5.990"`
///
/// A movement line carries a `DD/MM/YYYY` date token, a free-text
/// description, and an amount token: the `$` marker, an optional minus
/// (itself optionally followed by a space), and digits with dot thousands
/// separators. Anything else (column headers, page footers, totals without
/// a date) is skipped, not reported: statement layouts vary and a dropped
/// line is preferable to a dead ingest.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct TransactionParser<I> {
    iter: I,
    lines_to_skip: usize,
}

/// Number of prelude lines before the first movement line.
pub const HEADER_LINE_COUNT: usize = 12;

/// Substituted when a movement line has no usable description.
pub const EMPTY_DESCRIPTION_FALLBACK: &str = "needs review";

const CURRENCY_MARKER: char = '$';
const CREDIT_NOTE_MARKERS: &[&str] = &["NOTA DE CREDITO", "NOTA DE CRÉDITO"];

const DAY_FIELD: &str = "day";
const MONTH_FIELD: &str = "month";
const YEAR_FIELD: &str = "year";
const DESCRIPTION_FIELD: &str = "description";
const SIGN_FIELD: &str = "sign";
const AMOUNT_FIELD: &str = "amount";

impl<I> TransactionParser<I> {
    fn new(iter: I) -> Self {
        Self {
            iter,
            lines_to_skip: HEADER_LINE_COUNT,
        }
    }
}

/// Per-line parse outcome. The skip-vs-parse decision is an explicit,
/// testable branch; the iterator only surfaces the parsed side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Parsed(Transaction),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `$` anywhere in the line.
    NoCurrencyMarker,
    /// The line does not carry a date token followed by an amount token.
    PatternMismatch,
    /// The date token is not a valid calendar date.
    InvalidDate,
    /// The amount token has no parseable magnitude.
    InvalidAmount,
}

/// Parses a single statement line.
///
/// The description is the substring strictly between the date token and the
/// currency marker, trimmed. The amount is negative iff the token carries an
/// explicit minus or the line mentions a credit note; the magnitude itself is
/// never negated twice. Category and period are filled from the description
/// and date respectively.
pub fn parse_line(line: &str) -> LineOutcome {
    static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(
            r"(?x)
            (?P<{DAY_FIELD}>\d{{2}})
            /
            (?P<{MONTH_FIELD}>\d{{2}})
            /
            (?P<{YEAR_FIELD}>\d{{4}})
            \x20
            (?P<{DESCRIPTION_FIELD}>.*?)
            \x20?
            \$
            \x20?
            (?P<{SIGN_FIELD}>-?)
            \x20?
            (?P<{AMOUNT_FIELD}>[\d.]+)
        "
        ))
        .expect("regex")
    });

    if !line.contains(CURRENCY_MARKER) {
        return LineOutcome::Skipped(SkipReason::NoCurrencyMarker);
    }
    let Some(groups) = LINE_REGEX.captures(line) else {
        return LineOutcome::Skipped(SkipReason::PatternMismatch);
    };
    let Some(date) = parse_date(&groups) else {
        return LineOutcome::Skipped(SkipReason::InvalidDate);
    };
    let Some(amount) = parse_amount(&groups, line) else {
        return LineOutcome::Skipped(SkipReason::InvalidAmount);
    };
    let description = parse_description(&groups);
    let category = categorize(&description).to_owned();
    let period = billing_period(date);

    LineOutcome::Parsed(Transaction {
        date,
        description,
        amount,
        category,
        period,
    })
}

fn parse_date(groups: &Captures<'_>) -> Option<NaiveDate> {
    let day: u32 = groups[DAY_FIELD].parse().ok()?;
    let month: u32 = groups[MONTH_FIELD].parse().ok()?;
    let year: i32 = groups[YEAR_FIELD].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_amount(groups: &Captures<'_>, line: &str) -> Option<Decimal> {
    // Thousands separators only; CLP amounts are integral.
    let magnitude: Decimal = groups[AMOUNT_FIELD].replace('.', "").parse().ok()?;
    if &groups[SIGN_FIELD] == "-" || is_credit_note(line) {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

fn parse_description(groups: &Captures<'_>) -> String {
    let raw = groups[DESCRIPTION_FIELD].trim();
    if raw.is_empty() || raw.chars().all(|c| matches!(c, '-' | '.' | '*')) {
        EMPTY_DESCRIPTION_FALLBACK.to_owned()
    } else {
        raw.to_owned()
    }
}

fn is_credit_note(line: &str) -> bool {
    let upper = line.to_uppercase();
    CREDIT_NOTE_MARKERS.iter().any(|m| upper.contains(m))
}

impl<'a, I: Iterator<Item = &'a str>> Iterator for TransactionParser<I> {
    type Item = Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.iter.by_ref() {
            if self.lines_to_skip > 0 {
                self.lines_to_skip -= 1;
                continue;
            }
            match parse_line(line) {
                LineOutcome::Parsed(transaction) => return Some(transaction),
                LineOutcome::Skipped(reason) => {
                    debug!("skipping line ({reason:?}): {line}");
                }
            }
        }
        None
    }
}

pub trait IteratorExt {
    fn transactions(self) -> TransactionParser<Self>
    where
        Self: Sized;
}

impl<'a, I: Iterator<Item = &'a str>> IteratorExt for I {
    fn transactions(self) -> TransactionParser<I> {
        TransactionParser::new(self)
    }
}
