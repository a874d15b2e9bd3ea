//! Dense simplex tableau.
//!
//! Layout (m constraints, n original variables, one slack column per
//! constraint, optional artificial columns during phase one):
//!
//! ```text
//!            x_1 .. x_n | s_1 .. s_m | a_1 .. a_k | RHS
//! row 0      ...                                  | b_0
//! ...
//! row m-1    ...                                  | b_{m-1}
//! objective  reduced costs                        | -w^T x
//! ```
//!
//! The objective row always prices a *minimization* (`w = c` for min,
//! `w = -c` for max), so an entry below `-tol` marks an improving column.

use nalgebra::DMatrix;

/// Tableau with basis bookkeeping.
#[derive(Debug, Clone)]
pub struct Tableau {
    matrix: DMatrix<f64>,
    basis: Vec<Option<usize>>,
    num_original: usize,
    num_slack: usize,
    num_artificial: usize,
}

impl Tableau {
    /// Zero tableau with `num_rows` constraint rows.
    pub(crate) fn zeros(
        num_rows: usize,
        num_original: usize,
        num_slack: usize,
        num_artificial: usize,
    ) -> Self {
        let cols = num_original + num_slack + num_artificial + 1;
        Self {
            matrix: DMatrix::zeros(num_rows + 1, cols),
            basis: vec![None; num_rows],
            num_original,
            num_slack,
            num_artificial,
        }
    }

    /// Number of constraint rows (the objective row is not counted).
    pub fn num_rows(&self) -> usize {
        self.basis.len()
    }

    /// Number of variable columns (RHS excluded).
    pub fn num_cols(&self) -> usize {
        self.matrix.ncols() - 1
    }

    /// Number of original decision variables.
    pub fn num_original(&self) -> usize {
        self.num_original
    }

    /// Number of slack/surplus columns.
    pub fn num_slack(&self) -> usize {
        self.num_slack
    }

    /// Index of the objective row.
    pub fn objective_row(&self) -> usize {
        self.num_rows()
    }

    /// Index of the RHS column.
    pub fn rhs_col(&self) -> usize {
        self.num_cols()
    }

    /// Entry at (row, col). Row `num_rows()` is the objective row.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, val: f64) {
        self.matrix[(row, col)] = val;
    }

    /// RHS of a row.
    pub fn rhs(&self, row: usize) -> f64 {
        self.matrix[(row, self.rhs_col())]
    }

    /// Objective-row RHS cell (`-w^T x` at the current basis).
    pub fn objective_rhs(&self) -> f64 {
        self.rhs(self.objective_row())
    }

    /// Variable-column entries of a row (RHS excluded).
    pub fn row_entries(&self, row: usize) -> Vec<f64> {
        (0..self.num_cols()).map(|j| self.matrix[(row, j)]).collect()
    }

    /// Basic column of each constraint row (`None` for a redundant row).
    pub fn basis(&self) -> &[Option<usize>] {
        &self.basis
    }

    pub(crate) fn set_basic(&mut self, row: usize, col: usize) {
        self.basis[row] = Some(col);
    }

    /// Full matrix, objective row last, RHS column last.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub(crate) fn is_artificial(&self, col: usize) -> bool {
        let first = self.num_original + self.num_slack;
        (first..first + self.num_artificial).contains(&col)
    }

    /// Dantzig pricing: most negative objective-row entry, lowest index on ties.
    pub fn entering_most_negative(&self, tol: f64) -> Option<usize> {
        let obj = self.objective_row();
        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.num_cols() {
            let d = self.matrix[(obj, j)];
            if d < -tol && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        best.map(|(j, _)| j)
    }

    /// Bland pricing: lowest-index column with a negative objective-row entry.
    pub fn entering_bland(&self, tol: f64) -> Option<usize> {
        let obj = self.objective_row();
        (0..self.num_cols()).find(|&j| self.matrix[(obj, j)] < -tol)
    }

    /// Minimum-ratio test on column `col`.
    ///
    /// Only rows with an entry above `tol` qualify. Ties go to the lowest
    /// row index, or to the lowest basic column when `bland` is set.
    pub fn leaving_row(&self, col: usize, tol: f64, bland: bool) -> Option<usize> {
        let rhs_col = self.rhs_col();
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.num_rows() {
            let a = self.matrix[(i, col)];
            if a <= tol {
                continue;
            }
            let ratio = self.matrix[(i, rhs_col)] / a;
            match best {
                None => best = Some((i, ratio)),
                Some((bi, br)) => {
                    let tie = (ratio - br).abs() <= 1e-12 * (1.0 + br.abs());
                    if tie {
                        if bland && self.basis[i].unwrap_or(usize::MAX) < self.basis[bi].unwrap_or(usize::MAX) {
                            best = Some((i, ratio));
                        }
                    } else if ratio < br {
                        best = Some((i, ratio));
                    }
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// Gauss-Jordan pivot on (row, col), objective row included.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let ncols = self.matrix.ncols();
        let piv = self.matrix[(row, col)];
        for j in 0..ncols {
            self.matrix[(row, j)] /= piv;
        }
        self.matrix[(row, col)] = 1.0;

        for i in 0..self.matrix.nrows() {
            if i == row {
                continue;
            }
            let factor = self.matrix[(i, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..ncols {
                let v = self.matrix[(i, j)] - factor * self.matrix[(row, j)];
                self.matrix[(i, j)] = if v.abs() < 1e-12 { 0.0 } else { v };
            }
            self.matrix[(i, col)] = 0.0;
        }

        self.basis[row] = Some(col);
    }

    /// Subtract multiples of basic rows so every basic column is zero in the objective row.
    pub(crate) fn canonicalize_objective(&mut self) {
        let obj = self.objective_row();
        let ncols = self.matrix.ncols();
        for r in 0..self.num_rows() {
            let Some(b) = self.basis[r] else { continue };
            let coef = self.matrix[(obj, b)];
            if coef == 0.0 {
                continue;
            }
            for j in 0..ncols {
                self.matrix[(obj, j)] -= coef * self.matrix[(r, j)];
            }
            self.matrix[(obj, b)] = 0.0;
        }
    }

    /// Copy of this tableau with the artificial columns removed.
    ///
    /// Rows whose basic variable is still artificial become redundant.
    pub(crate) fn without_artificials(&self) -> Self {
        let keep = self.num_original + self.num_slack;
        let mut out = Tableau::zeros(self.num_rows(), self.num_original, self.num_slack, 0);
        for i in 0..=self.num_rows() {
            for j in 0..keep {
                out.matrix[(i, j)] = self.matrix[(i, j)];
            }
            out.matrix[(i, keep)] = self.matrix[(i, self.rhs_col())];
        }
        for (r, b) in self.basis.iter().enumerate() {
            out.basis[r] = b.filter(|&c| c < keep);
        }
        out
    }

    /// Row in which `col` is a unit column: exactly one constraint row holds
    /// ~1 and every other row, the objective row included, holds ~0.
    pub fn basic_row(&self, col: usize, tol: f64) -> Option<usize> {
        let mut found = None;
        for i in 0..self.matrix.nrows() {
            let v = self.matrix[(i, col)];
            if (v - 1.0).abs() <= tol && i < self.num_rows() && found.is_none() {
                found = Some(i);
            } else if v.abs() > tol {
                return None;
            }
        }
        found
    }

    /// Values of the original variables: RHS of the row a variable is basic
    /// in, 0 when non-basic. Slack values are not reported.
    pub fn extract_solution(&self) -> Vec<f64> {
        let mut x = vec![0.0; self.num_original];
        for (r, b) in self.basis.iter().enumerate() {
            if let Some(j) = *b {
                if j < self.num_original {
                    let v = self.rhs(r);
                    x[j] = if v.abs() < 1e-12 { 0.0 } else { v };
                }
            }
        }
        x
    }
}
