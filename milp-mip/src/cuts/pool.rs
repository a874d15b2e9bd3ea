//! Record of the cuts added by the cutting-plane loop.
//!
//! Gomory cuts are rounded to integral data, so a stalled loop shows up as
//! the same half-space being derived twice. The pool compares cuts after
//! scaling each to a unit normal, which also catches positive multiples.

use crate::master::LinearCut;

const ZERO_NORM: f64 = 1e-10;
const SAME_TOL: f64 = 1e-8;

/// Ordered set of distinct cuts.
#[derive(Debug, Default)]
pub struct CutPool {
    cuts: Vec<LinearCut>,
}

impl CutPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `cut` unless an equivalent one is already present.
    ///
    /// Returns the id of the stored cut and `true` when `cut` was a repeat
    /// (the id is then that of the earlier cut).
    pub fn add(&mut self, cut: LinearCut, round: usize) -> (usize, bool) {
        if let Some(id) = self.cuts.iter().position(|c| same_half_space(c, &cut)) {
            log::debug!("pool: round {} repeats cut {}", round, id);
            return (id, true);
        }

        let id = self.cuts.len();
        log::debug!("pool: cut {} from round {}", id, round);
        self.cuts.push(cut);
        (id, false)
    }

    /// Number of distinct cuts.
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// No cut recorded yet.
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }
}

/// Unit normal and scaled right-hand side, or `None` for an all-zero row.
fn normalized(cut: &LinearCut) -> Option<(Vec<f64>, f64)> {
    let norm = cut.coefs.iter().map(|a| a * a).sum::<f64>().sqrt();
    if norm < ZERO_NORM {
        return None;
    }
    Some((cut.coefs.iter().map(|a| a / norm).collect(), cut.rhs / norm))
}

/// `a·x <= r` and `b·x <= s` describe the same half-space.
///
/// Opposite normals are different half-spaces even when parallel.
fn same_half_space(a: &LinearCut, b: &LinearCut) -> bool {
    if a.coefs.len() != b.coefs.len() {
        return false;
    }
    match (normalized(a), normalized(b)) {
        (None, None) => true,
        (Some((na, ra)), Some((nb, rb))) => {
            (ra - rb).abs() < SAME_TOL && na.iter().zip(&nb).all(|(u, v)| (u - v).abs() < SAME_TOL)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::CutSource;

    fn cut(coefs: Vec<f64>, rhs: f64) -> LinearCut {
        LinearCut::new(coefs, rhs, CutSource::User)
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut pool = CutPool::new();
        assert!(pool.is_empty());

        assert_eq!(pool.add(cut(vec![1.0, 2.0], 3.0), 1), (0, false));
        assert_eq!(pool.add(cut(vec![4.0, 5.0], 6.0), 2), (1, false));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_repeats_are_rejected() {
        let mut pool = CutPool::new();
        pool.add(cut(vec![1.0, 2.0], 3.0), 1);

        // Identical, then a positive multiple
        assert_eq!(pool.add(cut(vec![1.0, 2.0], 3.0), 2), (0, true));
        assert_eq!(pool.add(cut(vec![2.0, 4.0], 6.0), 3), (0, true));
        // Reversed inequality is a different half-space
        assert_eq!(pool.add(cut(vec![-1.0, -2.0], -3.0), 4), (1, false));
        // Same normal, different offset
        assert_eq!(pool.add(cut(vec![1.0, 2.0], 2.0), 5), (2, false));

        assert_eq!(pool.len(), 3);
    }
}
