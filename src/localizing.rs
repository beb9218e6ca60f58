use num_traits::Float;
use crate::{Algebra, Monomial, Polynomial, Substitutions, MonomialIndex, SpStruct, RelaxError};
use crate::algebra::pick_monomials_up_to_degree;
use crate::block::{BlockPlan, localization_order};
use crate::linalg::{DenseMat, zeros};

//

/// Localizing matrix builder
///
/// Maps polynomials onto the slots of a frozen [`MonomialIndex`], which it only reads.
/// Terms whose monomial (and its adjoint) is not in the index cannot be represented
/// at the chosen level; they are skipped and counted.
pub struct Localizer<'a, F: Float, A: Algebra<F>>
{
    algebra: &'a A,
    subs: &'a Substitutions<F>,
    index: &'a MonomialIndex,
    dropped: usize,
}

impl<'a, F: Float, A: Algebra<F>> Localizer<'a, F, A>
{
    /// Creates a builder reading `index`.
    pub fn new(algebra: &'a A, subs: &'a Substitutions<F>, index: &'a MonomialIndex) -> Self
    {
        Localizer {
            algebra, subs, index,
            dropped: 0,
        }
    }

    /// Number of terms skipped so far.
    pub fn dropped(&self) -> usize
    {
        self.dropped
    }

    fn drop_term(&mut self, mono: &Monomial)
    {
        self.dropped += 1;
        log::debug!("term {} is beyond the monomial index, dropped", self.algebra.format_monomial(mono));
    }

    // canonical u^dagger g v
    fn sandwich(&self, u: &Monomial, g: &Polynomial<F>, v: &Monomial) -> Polynomial<F>
    {
        let u_adj = Polynomial::from_monomial(self.algebra.adjoint(u));
        let v = Polynomial::from_monomial(v.clone());

        self.algebra.canonicalize(&(u_adj * g * v), self.subs)
    }

    /// Dense coefficient vector of a canonical polynomial.
    ///
    /// Returns a vector of length `n_vars + 1` whose element 0 is the constant coefficient.
    pub fn facvar(&mut self, poly: &Polynomial<F>) -> Vec<F>
    {
        let mut v = vec![F::zero(); self.index.n_vars() + 1];

        for (m, c) in self.algebra.expand(poly) {
            match self.index.index_of(self.algebra, self.subs, &m, c) {
                Some((k, c)) => v[k] = v[k] + c,
                None => self.drop_term(&m),
            }
        }

        v
    }

    /// Accumulates the terms of a canonical polynomial into one row of `f_struct`.
    pub fn push_facvar_sparse(&mut self, f_struct: &mut SpStruct<F>, poly: &Polynomial<F>, row: usize)
    {
        for (m, c) in self.algebra.expand(poly) {
            match self.index.index_of(self.algebra, self.subs, &m, c) {
                Some((k, c)) => f_struct.add(row, k, c),
                None => self.drop_term(&m),
            }
        }
    }

    /// Fills the localizing blocks.
    ///
    /// Entry `(row, column)`, `row <= column`, of the block of \\(g\\) is \\(u_{row}^\dagger g u_{column}\\).
    /// * `plan` gives the localizing monomials and the place of each block.
    /// * `inequalities` is in the same order as planned.
    pub fn process_inequalities(&mut self, f_struct: &mut SpStruct<F>, plan: &BlockPlan, inequalities: &[Polynomial<F>])
    {
        assert_eq!(inequalities.len(), plan.localizing_monomials.len());

        let offsets = plan.row_offsets();

        for (i, (ineq, monos)) in inequalities.iter().zip(&plan.localizing_monomials).enumerate() {
            let row_offset = offsets[plan.n_moment_blocks + i];
            let n = monos.len();

            for row in 0.. n {
                for column in row.. n {
                    let p = self.sandwich(&monos[row], ineq, &monos[column]);
                    self.push_facvar_sparse(f_struct, &p, row_offset + row * n + column);
                }
            }
        }
    }

    /// Dense rows of the equality constraints.
    ///
    /// Returns the matrix \\(A\\) whose rows, one per equality and localizing pair `row <= column`,
    /// are the coefficient vectors of \\(u_{row}^\dagger h u_{column} = 0\\).
    /// Every row is negated if its constant is negative.
    /// * `all_monomials` is the deduplicated union of the moment monomials.
    /// * `level` is the relaxation level; the largest localization order among the equalities is used for all.
    pub fn process_equalities(&mut self, equalities: &[Polynomial<F>], all_monomials: &[Monomial], level: usize) -> Result<DenseMat<F>, RelaxError>
    {
        let mut order = 0;
        for eq in equalities {
            order = order.max(localization_order(self.algebra.degree(eq), level)?);
        }

        let monos = pick_monomials_up_to_degree(all_monomials, order);
        let n = monos.len();

        let mut mat_a = zeros(equalities.len() * n * (n + 1) / 2, self.index.n_vars() + 1);
        let mut r = 0;

        for eq in equalities {
            for row in 0.. n {
                for column in row.. n {
                    let p = self.sandwich(&monos[row], eq, &monos[column]);
                    let mut v = self.facvar(&p);

                    if v[0] < F::zero() {
                        for e in v.iter_mut() {
                            *e = -*e;
                        }
                    }
                    for (c, e) in v.into_iter().enumerate() {
                        mat_a[(r, c)] = e;
                    }
                    r += 1;
                }
            }
        }

        Ok(mat_a)
    }
}

//

#[test]
fn test_facvar_drop()
{
    use crate::NcAlgebra;

    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);
    let subs = Substitutions::<f64>::new();

    let mut idx = MonomialIndex::new(true, true);
    idx.lookup_or_insert(&alg, &subs, &Monomial::var(x[0]));
    idx.lookup_or_insert(&alg, &subs, &Monomial::from_vars(&[x[0], x[1]]));

    let mut loc = Localizer::new(&alg, &subs, &idx);

    // 2 - X0 + 3 X1 X0 + X1 X1 X1
    let p = Polynomial::constant(2.)
            - Polynomial::var(x[0])
            + Polynomial::from_term(Monomial::from_vars(&[x[1], x[0]]), 3.)
            + Polynomial::from_monomial(Monomial::from_vars(&[x[1], x[1], x[1]]));

    assert_eq!(loc.facvar(&p), vec![2., -1., 3.]);
    assert_eq!(loc.dropped(), 1);

    let mut f = SpStruct::new(4, 3);
    loc.push_facvar_sparse(&mut f, &p, 2);
    assert_eq!(f.triples().collect::<Vec<_>>(), vec![(2, 0, 2.), (2, 1, -1.), (2, 2, 3.)]);
    assert_eq!(loc.dropped(), 2);
}
