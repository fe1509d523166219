use std::fmt;
use std::ops::Index;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{MlpError, Result, Shape};
use crate::math::numeric::{sanitize, valid_add, valid_mul, Numerics};

/// Dense row-major matrix of `f64`.
///
/// All arithmetic is value-returning: the receiver is borrowed and a new
/// matrix comes back, so a failed operation never leaves an operand half
/// modified. Additions and multiplications are sanitized through
/// [`Numerics`]; the plain methods use [`Numerics::Clamp`], the `*_with`
/// variants take the policy explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Uniform values in `[-1, 1)` drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }

        res
    }

    /// Takes ownership of nested rows. Rejects ragged or empty input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(MlpError::invalid("matrix must have at least one row and one column"));
        }
        if let Some(bad) = data.iter().position(|row| row.len() != cols) {
            return Err(MlpError::invalid(format!(
                "ragged matrix data: row {} has {} elements, expected {}",
                bad,
                data[bad].len(),
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a `rows × cols` matrix from a flat row-major buffer. Rejects
    /// zero dimensions like [`from_data`](Self::from_data).
    pub fn from_flat(rows: usize, cols: usize, flat: &[f64]) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(MlpError::invalid("matrix must have at least one row and one column"));
        }
        if flat.len() != rows * cols {
            return Err(MlpError::shape("from_flat", (rows, cols), (flat.len(), 1)));
        }
        let data = flat.chunks(cols).map(<[f64]>::to_vec).collect();
        Ok(Matrix { rows, cols, data })
    }

    pub fn column_vector(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Row-major copy of all elements.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    /// Unguarded elementwise map.
    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Guarded arithmetic
    // -----------------------------------------------------------------------

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.add_with(rhs, Numerics::Clamp)
    }

    pub fn add_with(&self, rhs: &Matrix, numerics: Numerics) -> Result<Matrix> {
        self.zip_guarded(rhs, "add", numerics, |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.sub_with(rhs, Numerics::Clamp)
    }

    /// Subtraction is addition of the negated right operand.
    pub fn sub_with(&self, rhs: &Matrix, numerics: Numerics) -> Result<Matrix> {
        self.zip_guarded(rhs, "subtract", numerics, |a, b| a + -b)
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.hadamard_with(rhs, Numerics::Clamp)
    }

    pub fn hadamard_with(&self, rhs: &Matrix, numerics: Numerics) -> Result<Matrix> {
        self.zip_guarded(rhs, "multiply", numerics, |a, b| a * b)
    }

    pub fn add_scalar(&self, scalar: f64) -> Matrix {
        self.map(|x| valid_add(x, scalar))
    }

    /// Multiplies every element by `scalar`.
    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| valid_mul(x, scalar))
    }

    pub fn scale_with(&self, scalar: f64, numerics: Numerics) -> Result<Matrix> {
        self.map_guarded("scale", numerics, |x| x * scalar)
    }

    /// Like [`scale`](Self::scale) but leaves column `index` untouched.
    pub fn scale_except_column(&self, scalar: f64, index: usize) -> Matrix {
        let mut res = self.clone();
        for row in res.data.iter_mut() {
            for (j, x) in row.iter_mut().enumerate() {
                if j != index {
                    *x = valid_mul(*x, scalar);
                }
            }
        }
        res
    }

    /// Standard matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        self.dot_with(rhs, Numerics::Clamp)
    }

    /// Naive triple loop; both the product and the running sum are guarded.
    pub fn dot_with(&self, rhs: &Matrix, numerics: Numerics) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(MlpError::shape("dot", self.shape(), rhs.shape()));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    let product = numerics.guard("dot", self.data[i][k] * rhs.data[k][j])?;
                    sum = numerics.guard("dot", sum + product)?;
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Elementwise activation (`derive == false`) or its derivative.
    pub fn apply<A: Activation + ?Sized>(&self, activation: &A, derive: bool) -> Matrix {
        if derive {
            self.map(|z| sanitize(activation.derive(z)))
        } else {
            self.map(|z| sanitize(activation.activate(z)))
        }
    }

    pub fn apply_with<A: Activation + ?Sized>(
        &self,
        activation: &A,
        derive: bool,
        numerics: Numerics,
    ) -> Result<Matrix> {
        if derive {
            self.map_guarded("apply", numerics, |z| activation.derive(z))
        } else {
            self.map_guarded("apply", numerics, |z| activation.activate(z))
        }
    }

    pub fn abs(&self) -> Matrix {
        self.map(f64::abs)
    }

    /// Copy with a new column inserted at `index`, filled with `filler`.
    pub fn expand_by_column(&self, index: usize, filler: f64) -> Result<Matrix> {
        if index > self.cols {
            return Err(MlpError::invalid(format!(
                "column index {} out of range for {} columns",
                index, self.cols
            )));
        }
        let data = self
            .data
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.insert(index, filler);
                row
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols + 1, data })
    }

    /// Copy with a new row inserted at `index`, filled with `filler`.
    pub fn expand_by_row(&self, index: usize, filler: f64) -> Result<Matrix> {
        if index > self.rows {
            return Err(MlpError::invalid(format!(
                "row index {} out of range for {} rows",
                index, self.rows
            )));
        }
        let mut data = self.data.clone();
        data.insert(index, vec![filler; self.cols]);
        Ok(Matrix { rows: self.rows + 1, cols: self.cols, data })
    }

    // -----------------------------------------------------------------------
    // Norms
    // -----------------------------------------------------------------------

    /// Sum of absolute values.
    pub fn l1norm(&self) -> f64 {
        self.data.iter().flatten().map(|x| x.abs()).sum()
    }

    /// Euclidean norm over all elements.
    pub fn l2norm(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// `l2norm / (rows * cols)`: the mean-magnitude error the stochastic
    /// trainer reports. Not a coefficient of determination.
    pub fn r2error(&self) -> f64 {
        self.l2norm() / (self.rows * self.cols) as f64
    }

    // -----------------------------------------------------------------------
    // Workspace buffers
    // -----------------------------------------------------------------------

    /// In-place `self += rhs`, used by gradient accumulators.
    pub fn accumulate(&mut self, rhs: &Matrix, numerics: Numerics) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(MlpError::shape("accumulate", self.shape(), rhs.shape()));
        }
        for (row, rhs_row) in self.data.iter_mut().zip(&rhs.data) {
            for (x, &y) in row.iter_mut().zip(rhs_row) {
                *x = numerics.guard("accumulate", *x + y)?;
            }
        }
        Ok(())
    }

    pub fn fill(&mut self, value: f64) {
        for row in self.data.iter_mut() {
            row.iter_mut().for_each(|x| *x = value);
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn zip_guarded<F>(&self, rhs: &Matrix, op: &'static str, numerics: Numerics, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != rhs.shape() {
            return Err(MlpError::shape(op, self.shape(), rhs.shape()));
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = numerics.guard(op, f(self.data[i][j], rhs.data[i][j]))?;
            }
        }

        Ok(res)
    }

    fn map_guarded<F>(&self, op: &'static str, numerics: Numerics, f: F) -> Result<Matrix>
    where
        F: Fn(f64) -> f64,
    {
        let mut data = Vec::with_capacity(self.rows);
        for row in &self.data {
            let mapped = row
                .iter()
                .map(|&x| numerics.guard(op, f(x)))
                .collect::<Result<Vec<f64>>>()?;
            data.push(mapped);
        }
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row][col]
    }
}

/// One line per row, elements separated by spaces.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            for x in row {
                write!(f, "{} ", x)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
