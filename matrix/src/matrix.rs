use rand::Rng;
use rand_distr::StandardNormal;

/// Dense row-major matrix of `f64` values.
///
/// Rows are stored contiguously, so iterating a row is a plain slice walk.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<f64>,
}

impl Matrix {
    /// Creates a new matrix from row-major data.
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows
    /// * `cols` - Number of columns
    /// * `data` - Values in row-major order, `rows * cols` of them
    ///
    /// # Panics
    ///
    /// Panics if the data length does not match the dimensions.
    #[must_use]
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Data length must match rows * cols"
        );
        Self { rows, cols, data }
    }

    /// Creates a matrix with every entry set to zero.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix of samples from a zero-mean Gaussian with the given
    /// standard deviation, drawn from the supplied generator.
    ///
    /// Passing a seeded generator reproduces the exact same matrix.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Self {
        let data = (0..rows * cols)
            .map(|_| rng.sample::<f64, _>(StandardNormal) * std_dev)
            .collect();
        Self { rows, cols, data }
    }

    /// Returns the number of rows.
    #[inline(always)]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline(always)]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the underlying data in row-major order.
    #[inline(always)]
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "Index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Sets the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "Index out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// Borrows row `row` as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if the row index is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "Row index out of bounds");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutably borrows row `row` as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if the row index is out of bounds.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        assert!(row < self.rows, "Row index out of bounds");
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Adds `other` into `self` entry by entry.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn accumulate(&mut self, other: &Matrix) {
        assert_eq!(self.rows, other.rows, "Matrix rows must match");
        assert_eq!(self.cols, other.cols, "Matrix columns must match");
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }

    /// Multiplies every entry by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.data {
            *value *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_matrix() {
        let m = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "Data length must match rows * cols")]
    fn test_new_matrix_bad_length() {
        let _ = Matrix::new(2, 2, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zeros() {
        let m = Matrix::zeros(3, 2);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert!(m.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_get_and_set() {
        let mut m = matrix![1.0, 2.0; 3.0, 4.0];
        assert_relative_eq!(m.get(1, 0), 3.0);
        m.set(1, 0, -7.5);
        assert_relative_eq!(m.get(1, 0), -7.5);
    }

    #[test]
    fn test_row_slices() {
        let mut m = matrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0];
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        m.row_mut(0)[2] = 9.0;
        assert_eq!(m.row(0), &[1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_accumulate() {
        let mut m = matrix![1.0, 2.0; 3.0, 4.0];
        let other = matrix![0.5, -1.0; 2.0, 0.25];
        m.accumulate(&other);
        assert_eq!(m, matrix![1.5, 1.0; 5.0, 4.25]);
    }

    #[test]
    #[should_panic(expected = "Matrix columns must match")]
    fn test_accumulate_dimension_mismatch() {
        let mut m = matrix![1.0, 2.0; 3.0, 4.0];
        let other = matrix![1.0; 2.0];
        m.accumulate(&other);
    }

    #[test]
    fn test_scale() {
        let mut m = matrix![2.0, -4.0; 6.0, 8.0];
        m.scale(0.5);
        assert_eq!(m, matrix![1.0, -2.0; 3.0, 4.0]);
    }

    #[test]
    fn test_random_is_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = Matrix::random(4, 3, 0.5, &mut rng_a);
        let b = Matrix::random(4, 3, 0.5, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_scales_with_std_dev() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::random(5, 5, 0.0, &mut rng);
        assert!(m.data().iter().all(|&v| v == 0.0));
    }
}
