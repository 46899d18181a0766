use tracing::debug;

use crate::{
    domain::{Period, Record},
    period::PeriodIndex,
    tree::{AggregationNode, AggregationTree},
};

/// Aggregation state for one batch run.
pub struct ReportEngine {
    tree: AggregationTree,
    periods: PeriodIndex,
    records: usize,
}

/// The ordered result of a run, ready to be rendered.
#[derive(Debug)]
pub struct Summary {
    pub root: AggregationNode,
    pub periods: Vec<Period>,
    pub records: usize,
}

impl ReportEngine {
    pub fn new(decimals: i16) -> Self {
        ReportEngine {
            tree: AggregationTree::new(decimals),
            periods: PeriodIndex::default(),
            records: 0,
        }
    }

    /// Adds a record's subtotal to every node along its classification path.
    pub fn handle_record(&mut self, record: Record) {
        debug!(path = ?record.path, period = %record.period, subtotal = %record.subtotal, "aggregating record");

        self.periods.record(&record.period, record.date);
        self.tree
            .insert(record.path.as_slice(), &record.period, record.subtotal);
        self.records += 1;
    }

    /// Ends ingestion: orders the tree and fixes the period sequence.
    pub fn finish(self) -> Summary {
        debug!(
            records = self.records,
            periods = self.periods.len(),
            "ordering aggregation tree"
        );

        Summary {
            root: self.tree.into_root().reordered(),
            periods: self.periods.finalize(),
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fastnum::{D128, dec128};

    use super::*;

    fn record(path: &[&str], date: &str, subtotal: D128) -> Record {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Record {
            path: path.iter().map(|s| s.to_string()).collect(),
            period: Period::of(date, "%b %Y", None),
            date,
            subtotal,
        }
    }

    fn jan() -> Period {
        Period::new("Jan 2024")
    }

    fn feb() -> Period {
        Period::new("Feb 2024")
    }

    #[test]
    fn test_single_item_two_months() {
        let mut engine = ReportEngine::new(2);
        engine.handle_record(record(&["sale", "A", "misc", "X"], "2024-01-05", dec128!(20.00)));
        engine.handle_record(record(&["sale", "A", "misc", "X"], "2024-02-10", dec128!(5.00)));

        let summary = engine.finish();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.periods, [jan(), feb()]);

        for path in [&["sale"][..], &["sale", "A"], &["sale", "A", "misc", "X"]] {
            let node = summary.root.find(path).unwrap();
            assert_eq!(node.grand_total(), dec128!(25.00));
            assert_eq!(node.period_total(&jan()), dec128!(20.00));
            assert_eq!(node.period_total(&feb()), dec128!(5.00));
        }
    }

    #[test]
    fn test_finish_orders_shops() {
        let mut engine = ReportEngine::new(2);
        engine.handle_record(record(&["sale", "Small"], "2024-02-01", dec128!(50.00)));
        engine.handle_record(record(&["sale", "Large"], "2024-01-31", dec128!(100.00)));

        let summary = engine.finish();
        let shops: Vec<_> = summary
            .root
            .child("sale")
            .unwrap()
            .children()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(shops, ["Large", "Small"]);
        assert_eq!(summary.periods, [jan(), feb()]);
    }

    #[test]
    fn test_year_buckets_merge() {
        let mut engine = ReportEngine::new(2);
        for (date, subtotal) in [("2024-02-05", dec128!(1.00)), ("2024-01-05", dec128!(1.00))] {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
            engine.handle_record(Record {
                path: vec!["sale".to_owned()],
                period: Period::of(date, "%Y", None),
                date,
                subtotal,
            });
        }

        let summary = engine.finish();
        assert_eq!(summary.periods, [Period::new("2024")]);
        let sale = summary.root.child("sale").unwrap();
        assert_eq!(sale.period_total(&Period::new("2024")), dec128!(2.00));
    }

    #[test]
    fn test_empty_run() {
        let summary = ReportEngine::new(2).finish();
        assert_eq!(summary.records, 0);
        assert!(summary.periods.is_empty());
        assert!(summary.root.is_leaf());
    }
}
