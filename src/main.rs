use std::{
    env,
    fs::File,
    io::{self, Write as _},
    path::PathBuf,
};

use color_eyre::eyre::{self, OptionExt, WrapErr as _, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::ReportConfig,
    domain::{Record, Row},
    engine::{ReportEngine, Summary},
};

mod config;
mod domain;
mod engine;
mod period;
mod report;
mod tree;

struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading report config");
            ReportConfig::load(path)?
        }
        None => {
            info!("using built-in report config");
            ReportConfig::default()
        }
    };

    let input = File::open(&args.input)
        .wrap_err_with(|| format!("Cannot open {}", args.input.display()))?;
    let summary = ingest(input, &config)
        .wrap_err_with(|| format!("Cannot read {}", args.input.display()))?;

    if summary.records == 0 {
        warn!(input = %args.input.display(), "input contains no records");
    }
    info!(
        records = summary.records,
        periods = summary.periods.len(),
        "aggregation finished"
    );

    let text = report::render(&summary.root, &summary.periods, &config)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

/// Reads every CSV record into a fresh engine and finishes it.
///
/// Any bad record aborts the run: a report with silently missing rows would
/// have wrong totals.
fn ingest(input: impl io::Read, config: &ReportConfig) -> eyre::Result<Summary> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut engine = ReportEngine::new(config.decimals);

    for result in reader.records() {
        let raw = result?;
        let line = raw.position().map_or(0, |position| position.line());

        let record = raw
            .deserialize::<Row>(Some(&headers))
            .map_err(eyre::Report::from)
            .and_then(|row| Record::from_row(row, config))
            .wrap_err_with(|| format!("Invalid record on line {line}"))?;

        engine.handle_record(record);
    }

    Ok(engine.finish())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "monthly_report=info".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn parse_args() -> eyre::Result<Args> {
    let mut args = env::args();
    args.next(); // Skip the program name

    let input = args
        .next()
        .ok_or_eyre("Please provide the path to the input CSV file.")?;
    let config = args.next().map(PathBuf::from);

    if args.next().is_some() {
        bail!("Too many arguments provided. Usage: monthly-report <input.csv> [config.toml]");
    }

    Ok(Args {
        input: PathBuf::from(input),
        config,
    })
}

#[cfg(test)]
mod tests {
    use fastnum::dec128;

    use super::*;

    const HEADER: &str = "type,shop,category,name,date,amount,price\n";

    fn ingest_str(rows: &str) -> eyre::Result<Summary> {
        ingest(format!("{HEADER}{rows}").as_bytes(), &ReportConfig::default())
    }

    #[test]
    fn test_empty_category_aggregated_under_placeholder() {
        let summary = ingest_str(concat!(
            "sale,A,,X,2024-01-05,2,10.00\n",
            "sale,A,,X,2024-02-10,1,5.00\n",
        ))
        .unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.periods.len(), 2);
        let (jan, feb) = (&summary.periods[0], &summary.periods[1]);

        for path in [
            &["Продажи"][..],
            &["Продажи", "A"],
            &["Продажи", "A", "Без категории"],
            &["Продажи", "A", "Без категории", "X"],
        ] {
            let node = summary.root.find(path).expect("Node must exist");
            assert_eq!(node.grand_total(), dec128!(25.00));
            assert_eq!(node.period_total(jan), dec128!(20.00));
            assert_eq!(node.period_total(feb), dec128!(5.00));
        }
        assert!(summary.root.find(&["Продажи", "A", ""]).is_none());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let summary = ingest_str(" buy , B , tools , Y , 2024-03-01 , 3 , 1.50 \n").unwrap();
        let node = summary.root.find(&["Покупки", "B", "tools", "Y"]).unwrap();
        assert_eq!(node.grand_total(), dec128!(4.50));
    }

    #[test]
    fn test_shops_ordered_by_total() {
        let summary = ingest_str(concat!(
            "sale,Small,food,X,2024-01-05,1,50.00\n",
            "sale,Large,food,Y,2024-01-06,1,100.00\n",
        ))
        .unwrap();

        let shops: Vec<_> = summary
            .root
            .child("Продажи")
            .unwrap()
            .children()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(shops, ["Large", "Small"]);
    }

    #[test]
    fn test_bad_record_reports_line() {
        let err = ingest_str(concat!(
            "sale,A,food,X,2024-01-05,2,10.00\n",
            "sale,A,food,X,not-a-date,1,5.00\n",
            "sale,A,food,X,2024-01-07,1,5.00\n",
        ))
        .expect_err("Bad date must abort the run");

        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_non_finite_price_aborts() {
        let err = ingest_str("sale,A,food,X,2024-01-05,2,NaN\n")
            .expect_err("NaN price must abort the run");
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_short_row_aborts() {
        assert!(ingest_str("sale,A,food\n").is_err());
    }

    #[test]
    fn test_header_only() {
        let summary = ingest_str("").unwrap();
        assert_eq!(summary.records, 0);
        assert!(summary.periods.is_empty());
    }
}
