mod ordering;

use std::collections::{BTreeMap, HashMap};

use fastnum::D128;

use crate::domain::{Period, round_money};

/// One value at one level of the classification hierarchy.
///
/// Totals cover every record at or below this node. They are maintained on
/// write, so reading them is O(1).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct AggregationNode {
    /// Insertion order until reordered.
    children: Vec<(String, AggregationNode)>,
    /// key -> position in `children`
    index: HashMap<String, usize>,
    grand_total: D128,
    period_totals: BTreeMap<Period, D128>,
}

impl AggregationNode {
    pub fn grand_total(&self) -> D128 {
        self.grand_total
    }

    pub fn period_total(&self, period: &Period) -> D128 {
        self.period_totals
            .get(period)
            .copied()
            .unwrap_or(D128::ZERO)
    }

    #[allow(unused)]
    pub fn period_totals(&self) -> &BTreeMap<Period, D128> {
        &self.period_totals
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &AggregationNode)> {
        self.children
            .iter()
            .map(|(key, node)| (key.as_str(), node))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[allow(unused)]
    pub fn child(&self, key: &str) -> Option<&AggregationNode> {
        self.index
            .get(key)
            .map(|&position| &self.children[position].1)
    }

    /// Looks a node up by its classification path. Never creates nodes.
    #[allow(unused)]
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&AggregationNode> {
        path.iter()
            .try_fold(self, |node, key| node.child(key.as_ref()))
    }

    /// Returns the child for `key`, appending an empty one if there is none.
    pub fn child_or_insert(&mut self, key: &str) -> &mut AggregationNode {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                let position = self.children.len();
                self.children
                    .push((key.to_owned(), AggregationNode::default()));
                self.index.insert(key.to_owned(), position);
                position
            }
        };
        &mut self.children[position].1
    }

    /// Adds `amount` to the grand total and to the period's total, rounding
    /// after each addition.
    fn accumulate(&mut self, period: &Period, amount: D128, decimals: i16) {
        self.grand_total = round_money(self.grand_total + amount, decimals);

        match self.period_totals.get_mut(period) {
            Some(total) => *total = round_money(*total + amount, decimals),
            None => {
                self.period_totals
                    .insert(period.clone(), round_money(amount, decimals));
            }
        }
    }
}

/// The grouping tree for a whole run. The root is not part of the
/// classification hierarchy; it holds the overall totals.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationTree {
    root: AggregationNode,
    decimals: i16,
}

impl AggregationTree {
    pub fn new(decimals: i16) -> Self {
        AggregationTree {
            root: AggregationNode::default(),
            decimals,
        }
    }

    /// Adds `amount` to every node along `path`, creating the missing ones.
    ///
    /// A path shorter than the configured nesting stops at its last value;
    /// deeper levels are never created for it.
    pub fn insert<S: AsRef<str>>(&mut self, path: &[S], period: &Period, amount: D128) {
        let decimals = self.decimals;

        let mut node = &mut self.root;
        node.accumulate(period, amount, decimals);

        for key in path {
            node = node.child_or_insert(key.as_ref());
            node.accumulate(period, amount, decimals);
        }
    }

    #[allow(unused)]
    pub fn root(&self) -> &AggregationNode {
        &self.root
    }

    pub fn into_root(self) -> AggregationNode {
        self.root
    }
}
