//! Knapsack items and the fractional (greedy) bound.

use serde::Serialize;

/// A knapsack item with its position in the caller's input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Item {
    /// Original 0-based index.
    pub index: usize,

    /// Item value.
    pub value: f64,

    /// Item weight (> 0).
    pub weight: f64,
}

impl Item {
    /// Value per unit of weight.
    pub fn density(&self) -> f64 {
        self.value / self.weight
    }
}

/// Items sorted by density, highest first; equal densities keep input order.
pub fn sort_by_density(values: &[f64], weights: &[f64]) -> Vec<Item> {
    let mut items: Vec<Item> = values
        .iter()
        .zip(weights.iter())
        .enumerate()
        .map(|(index, (&value, &weight))| Item {
            index,
            value,
            weight,
        })
        .collect();
    items.sort_by(|a, b| b.density().total_cmp(&a.density()));
    items
}

/// Fractional-knapsack bound on the value obtainable from `items[level..]`.
///
/// Whole items are added in order while they fit; the first item that does
/// not fit contributes the fraction that fills the remaining capacity.
/// With density-sorted items this is never below any integer completion.
pub fn fractional_bound(items: &[Item], level: usize, remaining: f64) -> f64 {
    let mut bound = 0.0;
    let mut capacity = remaining;
    for item in items.iter().skip(level) {
        if item.weight <= capacity {
            bound += item.value;
            capacity -= item.weight;
        } else {
            bound += item.density() * capacity.max(0.0);
            break;
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_density() {
        let items = sort_by_density(&[60.0, 100.0, 120.0], &[10.0, 20.0, 30.0]);
        let order: Vec<usize> = items.iter().map(|i| i.index).collect();
        assert_eq!(order, vec![0, 1, 2]);

        let items = sort_by_density(&[10.0, 30.0, 20.0], &[10.0, 10.0, 10.0]);
        let order: Vec<usize> = items.iter().map(|i| i.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = sort_by_density(&[2.0, 4.0, 1.0], &[1.0, 2.0, 0.5]);
        let order: Vec<usize> = items.iter().map(|i| i.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_fractional_bound() {
        let items = sort_by_density(&[60.0, 100.0, 120.0], &[10.0, 20.0, 30.0]);

        // 60 + 100 + 20/30 * 120
        assert!((fractional_bound(&items, 0, 50.0) - 240.0).abs() < 1e-12);
        // From level 1 with 40 left: 100 + 20/30 * 120
        assert!((fractional_bound(&items, 1, 40.0) - 180.0).abs() < 1e-12);
        // Nothing left to add
        assert_eq!(fractional_bound(&items, 3, 50.0), 0.0);
        assert_eq!(fractional_bound(&items, 0, 0.0), 0.0);
    }
}
