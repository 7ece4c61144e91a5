use std::fmt::Display;

use serde::Deserialize;

/// A dense, row-major matrix. Deserializes from a JSON array of rows
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Matrix<T>(Vec<Vec<T>>);

impl<T> Matrix<T> {
    pub fn new(v: Vec<Vec<T>>) -> Self {
        Self(v)
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.0.len(), self.0.first().map(|v| v.len()).unwrap_or(0))
    }

    /// reports whether `self` is `n` by `n`, checking every row rather than
    /// trusting the first
    pub fn is_square(&self, n: usize) -> bool {
        self.0.len() == n && self.0.iter().all(|row| row.len() == n)
    }
}

impl Matrix<f64> {
    /// xᵀ M x. `x` must have as many entries as `self` has rows and columns
    pub fn quadratic_form(&self, x: &[f64]) -> f64 {
        self.0
            .iter()
            .zip(x)
            .map(|(row, xi)| {
                xi * row.iter().zip(x).map(|(m, xj)| m * xj).sum::<f64>()
            })
            .sum()
    }
}

impl<T: Display> Display for Matrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = f.width().unwrap_or(8);
        let prec = f.precision().unwrap_or(4);
        for row in &self.0 {
            for col in row {
                write!(f, "{col:width$.prec$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
