use num_traits::Float;
use crate::SpStruct;
use crate::linalg::{DenseMat, zeros, cols, mul_vec, qr_pivot, rank_of, solve_trans_upper};

//

/// Affine change of variables \\(y = y_p + H w\\).
#[derive(Clone)]
pub struct Reduction<F: Float>
{
    /// Particular point \\((1, y_p)\\).
    pub particular: Vec<F>,
    /// Null-space basis \\(H\\) of the equalities.
    pub basis: DenseMat<F>,
    /// Numerical rank of the equalities.
    pub rank: usize,
    /// Number of equalities not satisfied by \\(y_p\\); nonzero if they are inconsistent.
    pub n_violated: usize,
}

impl<F: Float> Reduction<F>
{
    /// Reduced variables of a point.
    ///
    /// Returns \\(w = H^T (y - y_p)\\).
    /// * `y` is a point in the variables before the elimination.
    pub fn reduce(&self, y: &[F]) -> Vec<F>
    {
        let d: Vec<F> = y.iter().zip(&self.particular[1..]).map(|(a, b)| *a - *b).collect();
        mul_vec(&self.basis, true, F::one(), &d)
    }

    /// Original variables of a reduced point.
    ///
    /// Returns \\(y = y_p + H w\\).
    pub fn expand(&self, w: &[F]) -> Vec<F>
    {
        let hw = mul_vec(&self.basis, false, F::one(), w);
        hw.iter().zip(&self.particular[1..]).map(|(a, b)| *a + *b).collect()
    }

    /// Objective in the reduced variables.
    ///
    /// Returns a tuple of \\(H^T c\\) and the constant \\(c^T y_p\\).
    pub fn reduce_objective(&self, obj_facvar: &[F]) -> (Vec<F>, F)
    {
        let c = mul_vec(&self.basis, true, F::one(), obj_facvar);
        let offset = obj_facvar.iter().zip(&self.particular[1..]).fold(F::zero(), |s, (c, y)| s + *c * *y);
        (c, offset)
    }
}

/// Result of [`remove_equalities`].
#[derive(Clone)]
pub struct Elimination<F: Float>
{
    /// Constraint structure in the reduced variables.
    pub f_struct: SpStruct<F>,
    /// Objective coefficients \\(H^T c\\) of the reduced variables.
    pub obj_facvar: Vec<F>,
    /// Objective constant \\(c^T y_p\\) moved out of the variables.
    pub constant_offset: F,
    /// The change of variables.
    pub reduction: Reduction<F>,
}

/// Eliminates linear equalities by a change of basis.
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// The equalities \\(A_{[:,0]} + A_{[:,1:]} y = 0\\) are solved by the pivoted QR decomposition
/// \\(A_{[:,1:]}^T P = Q R\\) of numerical rank \\(n\\):
/// \\(y = y_p + H w\\) with \\(y_p = Q_{[:,0:n]} R_{[0:n,0:n]}^{-T} P^T (-A_{[:,0]})\\) and \\(H = Q_{[:,n:]}\\).
///
/// Returns the [`Elimination`].
/// * `f_struct` is the constraint structure of \\(y\\).
/// * `obj_facvar` is the objective coefficients \\(c\\) of \\(y\\).
/// * `mat_a` is \\(A\\).
/// * `eps_rank` is the relative tolerance of the rank;
///   equalities violated by \\(y_p\\) beyond its square root are counted in [`Reduction::n_violated`].
pub fn remove_equalities<F: Float>(f_struct: &SpStruct<F>, obj_facvar: &[F], mat_a: &DenseMat<F>, eps_rank: F) -> Elimination<F>
{
    let (n_eq, n_col) = mat_a.size();
    let n_old = n_col - 1;
    assert_eq!(obj_facvar.len(), n_old);
    assert_eq!(f_struct.shape().1, n_col);

    let mat_g = zeros(n_old, n_eq).by_fn(|r, c| mat_a[(c, r + 1)]);
    let qr = qr_pivot(&mat_g);
    let rank = rank_of(&qr.r, eps_rank);

    let b: Vec<F> = qr.perm.iter().map(|p| -mat_a[(*p, 0)]).collect();
    let z = solve_trans_upper(&qr.r, rank, &b);
    let y_p = mul_vec(&cols(&qr.q, 0, rank), false, F::one(), &z);

    // consistency of the equalities
    let eps_res = eps_rank.sqrt();
    let n_violated = (0.. n_eq).filter(|&i| {
        let a0 = mat_a[(i, 0)];
        let res = y_p.iter().enumerate().fold(a0, |s, (j, y)| s + *y * mat_a[(i, j + 1)]);
        res.abs() > eps_res * a0.abs().max(F::one())
    }).count();
    if n_violated > 0 {
        log::warn!("{} of {} equalities are not satisfied by the particular solution", n_violated, n_eq);
    }

    let mut particular = vec![F::one()];
    particular.extend(y_p);

    let reduction = Reduction {
        particular,
        basis: cols(&qr.q, rank, n_old),
        rank,
        n_violated,
    };

    let (obj_new, constant_offset) = reduction.reduce_objective(obj_facvar);
    let f_new = f_struct.change_basis(&reduction.particular, &reduction.basis);

    log::debug!("equalities: {} rows, rank {}, {} -> {} variables", n_eq, rank, n_old, n_old - rank);

    Elimination {
        f_struct: f_new,
        obj_facvar: obj_new,
        constant_offset,
        reduction,
    }
}

//

#[test]
fn test_remove_equalities()
{
    use float_eq::assert_float_eq;

    // y1 - 1 = 0, stored with the positive constant
    let mut mat_a = zeros::<f64>(1, 3);
    mat_a[(0, 0)] = 1.;
    mat_a[(0, 1)] = -1.;

    let mut f = SpStruct::new(2, 3);
    f.add(0, 1, 1.);
    f.add(1, 2, 1.);

    let e = remove_equalities(&f, &[1., 1.], &mat_a, 1e-10);

    let red = &e.reduction;
    assert_eq!(red.rank, 1);
    assert_eq!(red.n_violated, 0);
    assert_eq!(e.f_struct.shape(), (2, 2));
    assert_float_eq!(red.particular.as_slice(), [1., 1., 0.].as_slice(), abs_all <= 1e-12);
    assert_float_eq!(e.constant_offset, 1., abs <= 1e-12);
    assert_float_eq!(e.obj_facvar[0].abs(), 1., abs <= 1e-12);

    assert_float_eq!(e.f_struct.get(0, 0), 1., abs <= 1e-12);
    assert_float_eq!(e.f_struct.get(1, 0), 0., abs <= 1e-12);
    assert_float_eq!(e.f_struct.get(1, 1).abs(), 1., abs <= 1e-12);

    let w = red.reduce(&[1., 3.]);
    assert_float_eq!(red.expand(&w).as_slice(), [1., 3.].as_slice(), abs_all <= 1e-12);
}
