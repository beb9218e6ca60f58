use float_eq::assert_float_eq;
use ncsdp::prelude::*;
use totsu::prelude::*;

type La = FloatGeneric<f64>;
type ASolver = Solver<La>;

type P = Polynomial<f64>;
type ASdp = SdpRelaxation<f64, NcAlgebra>;

//

fn optimal_value(sdp: &ASdp) -> f64
{
    let s = ASolver::new().par(|p| {p.max_iter = Some(1_000_000)});
    let mut prob = sdp.to_prob_sdp::<La>(s.par.eps_zero).unwrap();
    let rslt = s.solve(prob.problem()).unwrap();

    let x = rslt.0;
    assert_eq!(x.len(), sdp.n_vars());

    sdp.obj_facvar().iter().zip(x).map(|(c, x)| c * x).sum::<f64>() + sdp.constant_term()
}

fn disk(eqs: &[P], remove_equalities: bool) -> (ASdp, Vec<VarId>)
{
    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);

    let x0 = P::var(x[0]);
    let x1 = P::var(x[1]);
    let obj = &x0 + &x1;
    let ineq = P::one() - &x0 * &x0 - &x1 * &x1;

    let mut sdp = ASdp::new(alg, vec![x.clone()], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], eqs, Substitutions::new(), 1, remove_equalities, None, Target::Native).unwrap();

    (sdp, x)
}

//

#[test]
fn test_solve_disk()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (sdp, _) = disk(&[], false);

    assert_float_eq!(optimal_value(&sdp), -2f64.sqrt(), abs <= 1e-2);
}

#[test]
fn test_solve_swapped()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut sdp, x) = disk(&[], false);

    let obj = -(P::var(x[0]) + P::var(x[1]));
    sdp.swap_objective(&obj).unwrap();

    assert_float_eq!(optimal_value(&sdp), -2f64.sqrt(), abs <= 1e-2);
}

#[test]
fn test_solve_eliminated()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (_, x) = disk(&[], false);
    // the optimum already lies on X0 = X1
    let eq = P::var(x[0]) - P::var(x[1]);
    let (sdp, _) = disk(&[eq], true);

    assert_eq!(sdp.n_vars(), 4);
    assert_float_eq!(optimal_value(&sdp), -2f64.sqrt(), abs <= 1e-2);
}

#[test]
fn test_solve_constant_objective()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut sdp, _) = disk(&[], false);

    sdp.swap_objective(&P::constant(3.)).unwrap();

    assert_eq!(sdp.obj_facvar(), &[0., 0., 0., 0., 0.]);
    assert_eq!(sdp.constant_term(), 3.);
}
