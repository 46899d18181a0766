use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::Period;

/// The distinct periods seen during a run, each with the earliest date that
/// fell into it.
#[derive(Default, Debug, Clone)]
pub struct PeriodIndex {
    periods: HashMap<Period, NaiveDate>,
}

impl PeriodIndex {
    pub fn record(&mut self, period: &Period, date: NaiveDate) {
        match self.periods.get_mut(period) {
            Some(earliest) => *earliest = (*earliest).min(date),
            None => {
                self.periods.insert(period.clone(), date);
            }
        }
    }

    /// The recorded periods in calendar order of their earliest dates. Labels
    /// only break ties.
    pub fn finalize(&self) -> Vec<Period> {
        let mut periods: Vec<_> = self.periods.iter().collect();
        periods.sort_by(|(label_a, date_a), (label_b, date_b)| {
            date_a.cmp(date_b).then_with(|| label_a.cmp(label_b))
        });
        periods
            .into_iter()
            .map(|(period, _)| period.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    #[allow(unused)]
    pub fn earliest(&self, period: &Period) -> Option<NaiveDate> {
        self.periods.get(period).copied()
    }
}
