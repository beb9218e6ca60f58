use std::collections::BTreeMap;
use num_traits::Float;
use crate::linalg::DenseMat;

//

/// Global sparse constraint structure
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Sparse matrix whose column \\(k\\) is the flattened block-diagonal matrix \\(F_k\\) of
/// \\(F_0 + \sum_{k \geq 1} y_k F_k \succeq 0\\).
/// Rows are the row-major positions inside the blocks laid out one after another.
///
/// The number of columns is allocated as an upper bound first;
/// the highest column ever written is tracked and [`SpStruct::trim_cols`] shrinks the bound to the actual size.
#[derive(Debug, Clone, PartialEq)]
pub struct SpStruct<F>
{
    n_row: usize,
    n_col: usize,
    entries: BTreeMap<(usize, usize), F>,
    high_water: usize,
}

impl<F: Float> SpStruct<F>
{
    /// Creates an empty structure.
    ///
    /// * `n_row` is the number of rows, the sum of squared block sizes.
    /// * `n_col` is the column capacity.
    pub fn new(n_row: usize, n_col: usize) -> Self
    {
        SpStruct {
            n_row, n_col,
            entries: BTreeMap::new(),
            high_water: 0,
        }
    }

    /// Shape of the structure.
    ///
    /// Returns a tuple of a number of rows and columns.
    pub fn shape(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize
    {
        self.entries.len()
    }

    /// Highest column written so far.
    pub fn high_water(&self) -> usize
    {
        self.high_water
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> F
    {
        self.entries.get(&(row, col)).copied().unwrap_or_else(F::zero)
    }

    /// Accumulates `val` into `(row, col)`.
    ///
    /// An entry accumulated to zero is removed.
    pub fn add(&mut self, row: usize, col: usize, val: F)
    {
        assert!(row < self.n_row);
        assert!(col < self.n_col);

        let f0 = F::zero();
        if val == f0 {
            return;
        }

        let v = self.get(row, col) + val;
        if v == f0 {
            self.entries.remove(&(row, col));
        }
        else {
            self.entries.insert((row, col), v);
        }
        self.high_water = self.high_water.max(col);
    }

    /// Shrinks (or grows) the column capacity to `n_col`.
    pub fn trim_cols(&mut self, n_col: usize)
    {
        assert!(self.entries.is_empty() || self.high_water < n_col);

        self.n_col = n_col;
    }

    /// Nonzero entries as `(row, col, value)` in row-major order.
    pub fn triples(&self) -> impl Iterator<Item=(usize, usize, F)> + '_
    {
        self.entries.iter().map(|((r, c), v)| (*r, *c, *v))
    }

    /// Rows of the nonzero entries of a column, in increasing order.
    pub fn col_rows(&self, col: usize) -> Vec<usize>
    {
        self.triples().filter(|e| e.1 == col).map(|e| e.0).collect()
    }

    /// Calculates \\(F x\\).
    pub fn mul_vec(&self, x: &[F]) -> Vec<F>
    {
        assert!(x.len() >= self.high_water + 1 || self.entries.is_empty());

        let mut y = vec![F::zero(); self.n_row];
        for (r, c, v) in self.triples() {
            y[r] = y[r] + v * x[c];
        }
        y
    }

    /// Change of variables \\(y = x_{[1:]} + H w\\).
    ///
    /// Returns the structure \\([F x,\ F_{[:,1:]} H]\\) whose columns after the first are the new variables \\(w\\).
    /// * `x` is the particular point with a leading one.
    /// * `mat_h` is the basis \\(H\\).
    pub fn change_basis(&self, x: &[F], mat_h: &DenseMat<F>) -> Self
    {
        let (nh, nw) = mat_h.size();
        assert_eq!(x.len(), nh + 1);

        let mut s = SpStruct::new(self.n_row, nw + 1);

        for (r, v) in self.mul_vec(x).into_iter().enumerate() {
            s.add(r, 0, v);
        }

        for (r, c, v) in self.triples() {
            if c > 0 {
                for j in 0.. nw {
                    s.add(r, j + 1, v * mat_h[(c - 1, j)]);
                }
            }
        }

        s
    }
}

//

#[test]
fn test_spstruct()
{
    let mut f = SpStruct::<f64>::new(4, 10);
    f.add(0, 0, 1.);
    f.add(1, 3, 2.);
    f.add(1, 3, 0.5);
    f.add(3, 2, 1.);
    f.add(3, 2, -1.);

    assert_eq!(f.nnz(), 2);
    assert_eq!(f.get(1, 3), 2.5);
    assert_eq!(f.high_water(), 3);

    f.trim_cols(4);
    assert_eq!(f.shape(), (4, 4));
    assert_eq!(f.triples().collect::<Vec<_>>(), vec![(0, 0, 1.), (1, 3, 2.5)]);
    assert_eq!(f.mul_vec(&[1., 0., 0., 2.]), vec![1., 5., 0., 0.]);
}
