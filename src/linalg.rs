//! Dense linear algebra for the equality elimination

use num_traits::Float;
use totsu::MatBuild;
use totsu_core::{FloatGeneric, LinAlgEx, MatType};

//

/// Dense matrix stored in column-major.
pub type DenseMat<F> = MatBuild<FloatGeneric<F>>;

/// Creates a zero matrix.
pub fn zeros<F: Float>(n_row: usize, n_col: usize) -> DenseMat<F>
{
    DenseMat::new(MatType::General(n_row, n_col))
}

/// Creates an identity matrix.
pub fn identity<F: Float>(n: usize) -> DenseMat<F>
{
    zeros(n, n).by_fn(|r, c| if r == c {F::one()} else {F::zero()})
}

/// Column slice of a matrix.
pub fn col<F: Float>(mat: &DenseMat<F>, c: usize) -> &[F]
{
    let (n_row, n_col) = mat.size();
    assert!(c < n_col);

    let array: &[F] = mat.as_ref();
    &array[c * n_row.. (c + 1) * n_row]
}

/// Copy of the columns `[c0, c1)` of a matrix.
pub fn cols<F: Float>(mat: &DenseMat<F>, c0: usize, c1: usize) -> DenseMat<F>
{
    let (n_row, n_col) = mat.size();
    assert!(c0 <= c1 && c1 <= n_col);

    zeros(n_row, c1 - c0).by_fn(|r, c| mat[(r, c0 + c)])
}

/// Calculates \\(\alpha G x\\), or \\(\alpha G^T x\\) if `transpose`.
pub fn mul_vec<F: Float>(mat: &DenseMat<F>, transpose: bool, alpha: F, x: &[F]) -> Vec<F>
{
    let (n_row, n_col) = mat.size();
    let array: &[F] = mat.as_ref();
    let mut y = vec![F::zero(); if transpose {n_col} else {n_row}];

    FloatGeneric::<F>::transform_ge(transpose, n_row, n_col, alpha, array, x, F::zero(), &mut y);
    y
}

fn swap_cols<F: Float>(mat: &mut DenseMat<F>, c0: usize, c1: usize)
{
    let n_row = mat.size().0;
    if c0 != c1 {
        let array: &mut [F] = mat.as_mut();
        for r in 0.. n_row {
            array.swap(c0 * n_row + r, c1 * n_row + r);
        }
    }
}

fn sq_norm_below<F: Float>(mat: &DenseMat<F>, r0: usize, c: usize) -> F
{
    let mut sum = F::zero();
    for u in &col(mat, c)[r0..] {
        sum = sum + *u * *u;
    }
    sum
}

//

/// Result of [`qr_pivot`]: \\(G P = Q R\\).
#[derive(Clone)]
pub struct QrPivot<F: Float>
{
    /// Orthogonal \\(Q\\), square of the number of rows of \\(G\\).
    pub q: DenseMat<F>,
    /// Upper trapezoidal \\(R\\), the same size as \\(G\\).
    pub r: DenseMat<F>,
    /// Column permutation: column `i` of \\(G P\\) is column `perm[i]` of \\(G\\).
    pub perm: Vec<usize>,
}

/// Householder QR decomposition with column pivoting.
///
/// Returns the full decomposition \\(G P = Q R\\)
/// whose diagonal of \\(R\\) is non-increasing in magnitude.
/// * `mat_g` is the matrix \\(G\\).
pub fn qr_pivot<F: Float>(mat_g: &DenseMat<F>) -> QrPivot<F>
{
    let (m, n) = mat_g.size();
    let f0 = F::zero();
    let f2 = F::one() + F::one();

    let mut r = mat_g.clone();
    let mut q = identity(m);
    let mut perm: Vec<usize> = (0.. n).collect();

    let mut v = vec![f0; m];

    for k in 0.. m.min(n) {
        // pivot on the largest remaining column
        let mut p = k;
        let mut p_norm = sq_norm_below(&r, k, k);
        for j in k + 1.. n {
            let j_norm = sq_norm_below(&r, k, j);
            if j_norm > p_norm {
                p = j;
                p_norm = j_norm;
            }
        }
        if p_norm == f0 {
            break;
        }
        swap_cols(&mut r, k, p);
        perm.swap(k, p);

        // reflector v = x - beta e_1
        let alpha = p_norm.sqrt();
        let x0 = r[(k, k)];
        let beta = if x0 >= f0 {-alpha} else {alpha};

        let v = &mut v[k..];
        v.copy_from_slice(&col(&r, k)[k..]);
        v[0] = x0 - beta;
        let mut v_norm = f0;
        for u in v.iter() {
            v_norm = v_norm + *u * *u;
        }
        if v_norm == f0 {
            continue;
        }

        // R = H R
        for j in k.. n {
            let mut s = f0;
            for (i, u) in v.iter().enumerate() {
                s = s + *u * r[(k + i, j)];
            }
            let t = f2 * s / v_norm;
            for (i, u) in v.iter().enumerate() {
                r[(k + i, j)] = r[(k + i, j)] - t * *u;
            }
        }
        r[(k, k)] = beta;
        for i in k + 1.. m {
            r[(i, k)] = f0;
        }

        // Q = Q H
        for row in 0.. m {
            let mut s = f0;
            for (i, u) in v.iter().enumerate() {
                s = s + q[(row, k + i)] * *u;
            }
            let t = f2 * s / v_norm;
            for (i, u) in v.iter().enumerate() {
                q[(row, k + i)] = q[(row, k + i)] - t * *u;
            }
        }
    }

    QrPivot {
        q, r, perm,
    }
}

/// Numerical rank from the diagonal of a pivoted \\(R\\).
///
/// Returns the number of leading diagonals with \\(|R_{kk}| > \epsilon \max(1, |R_{00}|)\\).
pub fn rank_of<F: Float>(mat_r: &DenseMat<F>, eps: F) -> usize
{
    let (m, n) = mat_r.size();
    let kmax = m.min(n);
    if kmax == 0 {
        return 0;
    }

    let tol = eps * mat_r[(0, 0)].abs().max(F::one());
    (0.. kmax).take_while(|&k| mat_r[(k, k)].abs() > tol).count()
}

/// Solves \\(R_{[0:n,0:n]}^T z = b_{[0:n]}\\) by forward substitution.
pub fn solve_trans_upper<F: Float>(mat_r: &DenseMat<F>, n: usize, b: &[F]) -> Vec<F>
{
    assert!(b.len() >= n);

    let mut z = vec![F::zero(); n];
    for i in 0.. n {
        let mut s = b[i];
        for j in 0.. i {
            s = s - mat_r[(j, i)] * z[j];
        }
        z[i] = s / mat_r[(i, i)];
    }
    z
}

//

#[test]
fn test_qr_pivot()
{
    use float_eq::assert_float_eq;

    // rank 2 with the third column = first + second
    let data = [[1., 2., 0., 1.], [0., 1., 3., 1.], [1., 3., 3., 2.]];
    let g = zeros::<f64>(4, 3).by_fn(|r, c| data[c][r]);

    let qr = qr_pivot(&g);
    assert_eq!(rank_of(&qr.r, 1e-10), 2);
    assert_eq!(qr.perm[0], 2);

    // G P = Q R
    for i in 0.. 3 {
        let gp = col(&g, qr.perm[i]);
        let qr_i = mul_vec(&qr.q, false, 1., col(&qr.r, i));
        assert_float_eq!(gp, qr_i.as_slice(), abs_all <= 1e-12);
    }

    // Q^T Q = I
    for i in 0.. 4 {
        let e = mul_vec(&qr.q, true, 1., col(&qr.q, i));
        for (j, v) in e.iter().enumerate() {
            assert_float_eq!(*v, if i == j {1.} else {0.}, abs <= 1e-12);
        }
    }
}
