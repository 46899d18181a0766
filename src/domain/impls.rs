use chrono::NaiveDate;
use color_eyre::eyre::{self, OptionExt as _, ensure, eyre};
use fastnum::{D128, dec128};

use crate::{
    config::ReportConfig,
    domain::{Period, Record, Row, round_money},
};

impl Record {
    /// Normalizes a raw row: fills placeholders, expands aliases, then derives
    /// the period, the subtotal and the classification path.
    ///
    /// Placeholders are applied before aliases, so a placeholder value is
    /// itself subject to alias expansion.
    pub fn from_row(mut row: Row, config: &ReportConfig) -> eyre::Result<Self> {
        fill_placeholders(&mut row, config)?;
        expand_aliases(&mut row, config)?;

        let date = required(&row, &config.date_field)?;
        let date = NaiveDate::parse_from_str(date, &config.input_date_format).map_err(|err| {
            eyre!(
                "Cannot parse date '{date}' with pattern '{}': {err}",
                config.input_date_format
            )
        })?;

        let period = Period::of(date, &config.period_format, config.chrono_locale()?);
        let subtotal = subtotal(&row, config)?;

        let path = config
            .nesting
            .iter()
            .map_while(|field| row.get(field).cloned())
            .collect();

        Ok(Record {
            path,
            period,
            date,
            subtotal,
        })
    }
}

fn fill_placeholders(row: &mut Row, config: &ReportConfig) -> eyre::Result<()> {
    for (field, value) in row.iter_mut() {
        if !value.trim().is_empty() {
            continue;
        }

        let placeholder = config
            .placeholders
            .get(field)
            .ok_or_else(|| eyre!("Field '{field}' is empty and has no placeholder"))?;
        value.clone_from(placeholder);
    }

    Ok(())
}

fn expand_aliases(row: &mut Row, config: &ReportConfig) -> eyre::Result<()> {
    for (field, aliases) in &config.aliases {
        let Some(value) = row.get_mut(field) else {
            continue;
        };

        let alias = aliases
            .get(value.trim())
            .ok_or_else(|| eyre!("Field '{field}' has value '{value}' with no alias"))?;
        value.clone_from(alias);
    }

    Ok(())
}

fn required<'a>(row: &'a Row, field: &str) -> eyre::Result<&'a str> {
    row.get(field)
        .map(|value| value.trim())
        .ok_or_eyre(format!("Required field '{field}' is missing"))
}

/// Largest accepted `|amount|`.
const AMOUNT_LIMIT: u64 = 1_000_000_000;

/// `amount * price`, rounded. The amount is a whole number of units.
///
/// Both factors are bounded so that totals stay well inside `D128` precision
/// and always print in plain fixed-point notation.
fn subtotal(row: &Row, config: &ReportConfig) -> eyre::Result<D128> {
    let amount = required(row, &config.amount_field)?;
    let amount: i64 = amount
        .parse()
        .map_err(|_| eyre!("Amount '{amount}' is not a whole number"))?;
    ensure!(
        amount.unsigned_abs() <= AMOUNT_LIMIT,
        "Amount {amount} is out of range (limit {AMOUNT_LIMIT})"
    );

    let raw_price = required(row, &config.price_field)?;
    let price: D128 = raw_price
        .parse()
        .map_err(|_| eyre!("Price '{raw_price}' is not a number"))?;
    ensure!(price.is_finite(), "Price '{raw_price}' is not a number");
    ensure!(
        price.abs() < dec128!(1000000000000000),
        "Price '{raw_price}' is out of range"
    );

    Ok(round_money(D128::from(amount) * price, config.decimals))
}
