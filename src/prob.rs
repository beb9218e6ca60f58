use num_traits::Float;
use totsu::{MatBuild, ProbSDP};
use totsu_core::{LinAlgEx, MatType};
use crate::{Algebra, RelaxError, SdpRelaxation, Stage, Target};
use crate::block::convert_row_to_block_index;

//

impl<F: Float, A: Algebra<F>> SdpRelaxation<F, A>
{
    /// Converts into [`totsu::ProbSDP`].
    ///
    /// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
    /// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
    ///
    /// The blocks are laid out diagonally in one symmetric matrix of the sum of the block sizes, and
    /// \\(F_0 + \sum_k y_k F_k \succeq 0\\) becomes \\(\sum_k y_k (-F_k) + (-F_0) \preceq 0\\).
    /// The objective constant [`SdpRelaxation::constant_term`] is not included.
    ///
    /// Returns the [`totsu::ProbSDP`],
    /// or `Err` with [`RelaxError::StageOrder`] unless finalized for [`Target::Native`].
    /// * `eps_zero` should be the same value as [`totsu_core::solver::SolverParam::eps_zero`].
    pub fn to_prob_sdp<L>(&self, eps_zero: F) -> Result<ProbSDP<L>, RelaxError>
    where L: LinAlgEx<F=F>
    {
        if self.stage() != Stage::Finalized || self.target() != Target::Native {
            log::error!("relaxation not finalized for the native target");
            return Err(RelaxError::StageOrder);
        }

        let n = self.n_vars();
        let bs = self.block_struct();
        let offsets = self.row_offsets();

        let mut diag_offsets = Vec::with_capacity(bs.len());
        let mut k = 0;
        for s in bs {
            diag_offsets.push(k);
            k += s;
        }

        let obj = self.obj_facvar();
        let vec_c = MatBuild::new(MatType::General(n, 1))
                    .by_fn(|r, _| obj[r]);

        let mut syms_f = vec![MatBuild::new(MatType::SymPack(k)); n + 1];

        for (row, col, val) in self.f_struct().triples() {
            let (b, i, j) = convert_row_to_block_index(bs, &offsets, row);
            let (i, j) = (diag_offsets[b] + i, diag_offsets[b] + j);

            let sym_f = if col == 0 {&mut syms_f[n]} else {&mut syms_f[col - 1]};
            sym_f[(i, j)] = sym_f[(i, j)] - val;
        }

        let mat_a = MatBuild::new(MatType::General(0, n));
        let vec_b = MatBuild::new(MatType::General(0, 1));

        log::debug!("SDP of {} variables, {}x{} symmetric", n, k, k);

        Ok(ProbSDP::new(vec_c, syms_f, mat_a, vec_b, eps_zero))
    }
}
