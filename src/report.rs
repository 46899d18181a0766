use std::fmt::{self, Write as _};

use color_eyre::eyre;
use fastnum::D128;

use crate::{
    config::{LayoutConfig, ReportConfig},
    domain::{Period, round_money},
    tree::AggregationNode,
};

/// Renders the ordered tree as a fixed-width table: a header row of period
/// labels plus the total caption, then one row per node, depth first, in the
/// tree's current child order.
///
/// Each row starts with `nesting.len()` aside columns; the node's key sits in
/// the column matching its depth and the others are left blank.
pub fn render(
    root: &AggregationNode,
    periods: &[Period],
    config: &ReportConfig,
) -> eyre::Result<String> {
    let table = Table {
        layout: &config.layout,
        depth: config.nesting.len(),
        decimals: config.decimals,
        periods,
    };

    let mut out = String::new();
    table.header(&mut out)?;
    table.body(&mut out, root, 0)?;
    Ok(out)
}

struct Table<'a> {
    layout: &'a LayoutConfig,
    depth: usize,
    decimals: i16,
    periods: &'a [Period],
}

impl Table<'_> {
    fn header(&self, out: &mut String) -> fmt::Result {
        let width = self.layout.column_width;

        self.aside(out, "", 0)?;
        for period in self.periods {
            let label = period.label();
            write!(out, "{label:>width$}")?;
        }
        writeln!(out, "{:>width$}", self.layout.total_caption)
    }

    fn body(&self, out: &mut String, node: &AggregationNode, level: usize) -> fmt::Result {
        for (key, child) in node.children() {
            self.aside(out, key, level)?;
            for period in self.periods {
                self.cell(out, child.period_total(period))?;
            }
            self.cell(out, child.grand_total())?;
            writeln!(out)?;

            if !child.is_leaf() {
                self.body(out, child, level + 1)?;
            }
        }

        Ok(())
    }

    fn aside(&self, out: &mut String, label: &str, level: usize) -> fmt::Result {
        let LayoutConfig {
            aside_width,
            aside_max_width,
            ..
        } = *self.layout;

        for column in 0..self.depth {
            if column == level {
                write!(out, "{label:<aside_max_width$}")?;
            } else {
                write!(out, "{:<aside_width$}", "")?;
            }
        }

        Ok(())
    }

    fn cell(&self, out: &mut String, value: D128) -> fmt::Result {
        let width = self.layout.column_width;
        let value = round_money(value, self.decimals).to_string();
        write!(out, "{value:>width$}")
    }
}
