use std::cmp::Ordering;

use crate::tree::AggregationNode;

impl AggregationNode {
    /// Sorts the children of every node by descending grand total, breaking
    /// ties by ascending key. Totals are left untouched.
    pub fn reorder(&mut self) {
        self.children.sort_by(|(key_a, a), (key_b, b)| {
            b.grand_total
                .partial_cmp(&a.grand_total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| key_a.cmp(key_b))
        });

        for (position, (key, _)) in self.children.iter().enumerate() {
            if let Some(slot) = self.index.get_mut(key) {
                *slot = position;
            }
        }

        for (_, child) in &mut self.children {
            child.reorder();
        }
    }

    /// Consuming form of [`AggregationNode::reorder`].
    pub fn reordered(mut self) -> Self {
        self.reorder();
        self
    }
}
