use num_traits::Float;
use crate::{Algebra, Monomial, Polynomial, RelaxError, SdpRelaxation, Stage, Target};
use crate::block::convert_row_to_block_index;
use crate::localizing::Localizer;

//

/// Read-only view of a relaxation for an external modeling layer
///
/// Obtained from a relaxation built with [`Target::External`]:
/// only the moment blocks are filled and the monomial index is frozen.
/// The layer builds its own constraints of the moment matrix from
/// dense coefficient vectors against the index
/// and from the positions each variable occupies.
pub struct ModelingInterface<'a, F: Float, A: Algebra<F>>
{
    relaxation: &'a SdpRelaxation<F, A>,
}

impl<'a, F: Float, A: Algebra<F>> ModelingInterface<'a, F, A>
{
    /// Block sizes.
    pub fn block_struct(&self) -> &[usize]
    {
        self.relaxation.block_struct()
    }

    /// Row offsets of the blocks, with the total number of rows appended.
    pub fn row_offsets(&self) -> Vec<usize>
    {
        self.relaxation.row_offsets()
    }

    /// Number of moment variables.
    pub fn n_vars(&self) -> usize
    {
        self.relaxation.n_vars()
    }

    /// Dense coefficient vector of a polynomial.
    ///
    /// Returns a vector of length `n_vars + 1` whose element 0 is the constant coefficient.
    /// Terms beyond the relaxation level are dropped.
    pub fn facvar(&self, poly: &Polynomial<F>) -> Vec<F>
    {
        let r = self.relaxation;
        let mut loc = Localizer::new(r.algebra(), r.substitutions(), r.monomial_index());

        let v = loc.facvar(&r.algebra().canonicalize(poly, r.substitutions()));
        if loc.dropped() > 0 {
            log::debug!("{} terms dropped", loc.dropped());
        }
        v
    }

    /// Dense coefficient vector of the localizing entry \\(u^\dagger g v\\).
    pub fn localizing_entry(&self, constraint: &Polynomial<F>, u: &Monomial, v: &Monomial) -> Vec<F>
    {
        let r = self.relaxation;
        let u_adj = Polynomial::from_monomial(r.algebra().adjoint(u));

        self.facvar(&(u_adj * constraint * Polynomial::from_monomial(v.clone())))
    }

    /// Localizing monomials of the `i`-th inequality.
    pub fn localizing_monomials(&self, i: usize) -> &[Monomial]
    {
        &self.relaxation.plan().localizing_monomials[i]
    }

    /// Inequalities of the relaxation, without the equalities.
    pub fn inequalities(&self) -> &[Polynomial<F>]
    {
        self.relaxation.inequalities()
    }

    /// Equalities of the relaxation.
    pub fn equalities(&self) -> &[Polynomial<F>]
    {
        self.relaxation.equalities()
    }

    /// Positions of a variable in the moment blocks.
    ///
    /// Returns tuples of the block index and the row and column inside the block, `row <= column`,
    /// in the order of rows of the constraint structure.
    /// Entries sharing a variable are equal in any feasible moment matrix.
    pub fn positions(&self, k: usize) -> Vec<(usize, usize, usize)>
    {
        let bs = self.block_struct();
        let offsets = self.row_offsets();

        self.relaxation.f_struct().col_rows(k).into_iter()
        .map(|row| convert_row_to_block_index(bs, &offsets, row))
        .collect()
    }
}

impl<F: Float, A: Algebra<F>> SdpRelaxation<F, A>
{
    /// View for an external modeling layer.
    ///
    /// Returns `Err` with [`RelaxError::StageOrder`] unless built with [`Target::External`].
    pub fn modeling_interface(&self) -> Result<ModelingInterface<'_, F, A>, RelaxError>
    {
        if self.stage() != Stage::Finalized || self.target() != Target::External {
            log::error!("modeling interface of a relaxation not built for it");
            return Err(RelaxError::StageOrder);
        }

        Ok(ModelingInterface {
            relaxation: self,
        })
    }
}
