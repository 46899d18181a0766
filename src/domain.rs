mod impls;

use std::{collections::HashMap, fmt};

use chrono::{Locale, NaiveDate};
use fastnum::D128;

/// A raw CSV row keyed by header name.
pub type Row = HashMap<String, String>;

/// One normalized transaction, ready to be aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Classification values, outermost first. Shorter than the configured
    /// nesting when a nesting field is absent from the input.
    pub path: Vec<String>,
    pub period: Period,
    pub date: NaiveDate,
    pub subtotal: D128,
}

/// A reporting bucket, identified by its rendered label.
///
/// Dates that format to the same label share a bucket, so the pattern decides
/// the granularity: `%b %Y` buckets by month, `%Y` by year.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(String);

impl Period {
    #[allow(unused)]
    pub fn new(label: impl Into<String>) -> Self {
        Period(label.into())
    }

    /// Buckets `date` with a strftime-style pattern, localized when a locale
    /// is given.
    pub fn of(date: NaiveDate, format: &str, locale: Option<Locale>) -> Self {
        let label = match locale {
            Some(locale) => date.format_localized(format, locale).to_string(),
            None => date.format(format).to_string(),
        };
        Period(label)
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounds a money value to `decimals` places, fixing its scale so that it
/// always prints with exactly that many digits.
pub fn round_money(value: D128, decimals: i16) -> D128 {
    value.rescale(decimals)
}
