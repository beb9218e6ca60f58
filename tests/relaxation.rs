use ncsdp::prelude::*;
use ncsdp::*;
use ncsdp::block::{row_offsets, convert_row_to_block_index};

type P = Polynomial<f64>;
type ASdp = SdpRelaxation<f64, NcAlgebra>;

//

// X0, X1 Hermitian: minimize X0 + X1 subject to 1 - X0^2 - X1^2 >= 0
fn two_hermitian() -> (NcAlgebra, Vec<VarId>, P, P)
{
    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);

    let x0 = P::var(x[0]);
    let x1 = P::var(x[1]);
    let obj = &x0 + &x1;
    let ineq = P::one() - &x0 * &x0 - &x1 * &x1;

    (alg, x, obj, ineq)
}

fn assert_upper_triangle(sdp: &ASdp)
{
    let bs = sdp.block_struct();
    let offsets = sdp.row_offsets();

    for (row, _, _) in sdp.f_struct().triples() {
        let (_, i, j) = convert_row_to_block_index(bs, &offsets, row);
        assert!(i <= j, "row {} is in a lower triangle", row);
    }
}

fn assert_block_rows(sdp: &ASdp)
{
    let rows: usize = sdp.block_struct().iter().map(|s| s * s).sum();
    assert_eq!(sdp.f_struct().shape().0, rows);
    assert_eq!(*row_offsets(sdp.block_struct()).last().unwrap(), rows);
}

//

#[test]
fn test_concrete_scenario()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x.clone()], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    assert_eq!(sdp.stage(), Stage::Finalized);
    assert_eq!(sdp.block_struct(), &[3, 1]);
    assert_eq!(sdp.localization_order(), &[0]);
    assert_eq!(sdp.n_vars(), 5);
    assert_eq!(sdp.f_struct().shape(), (10, 6));
    assert_eq!(sdp.dropped_terms(), 0);

    let k0 = sdp.monomial_index().slot_of(&Monomial::var(x[0])).unwrap();
    let k1 = sdp.monomial_index().slot_of(&Monomial::var(x[1])).unwrap();
    assert_eq!((k0, k1), (1, 2));

    let obj_facvar = sdp.obj_facvar();
    assert_eq!(obj_facvar.len(), 5);
    assert_eq!(obj_facvar.iter().filter(|c| **c != 0.).count(), 2);
    assert_eq!(obj_facvar[k0 - 1], 1.);
    assert_eq!(obj_facvar[k1 - 1], 1.);
    assert_eq!(sdp.constant_term(), 0.);

    let k00 = sdp.monomial_index().slot_of(&Monomial::from_vars(&[x[0], x[0]])).unwrap();
    let k11 = sdp.monomial_index().slot_of(&Monomial::from_vars(&[x[1], x[1]])).unwrap();
    assert_eq!(sdp.f_struct().triples().collect::<Vec<_>>(), vec![
        (0, 0, 1.),
        (1, 1, 1.),
        (2, 2, 1.),
        (4, k00, 1.),
        (5, 4, 1.),
        (8, k11, 1.),
        (9, 0, 1.),
        (9, k00, -1.),
        (9, k11, -1.),
    ]);

    assert_upper_triangle(&sdp);
    assert_block_rows(&sdp);
}

#[test]
fn test_determinism()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let build = || {
        let (alg, x, obj, ineq) = two_hermitian();
        let subs = Substitutions::new().with(Monomial::from_vars(&[x[0], x[0]]), P::one());

        let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
        sdp.get_relaxation(&obj, &[ineq], &[], subs, 2, false, None, Target::Native).unwrap();
        sdp
    };

    let sdp1 = build();
    let sdp2 = build();

    assert_eq!(sdp1.block_struct(), sdp2.block_struct());
    assert_eq!(sdp1.monomial_index(), sdp2.monomial_index());
    assert_eq!(sdp1.f_struct(), sdp2.f_struct());
    assert_eq!(sdp1.obj_facvar(), sdp2.obj_facvar());
}

#[test]
fn test_upper_triangle()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);
    let subs = Substitutions::new().with(Monomial::from_vars(&[x[0], x[0]]), P::one());

    let x0 = P::var(x[0]);
    let x1 = P::var(x[1]);
    let obj = &x0 * &x1 + &x1 * &x0;
    let ineq = P::one() - &x0 * &x1 - &x1 * &x0;

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], &[], subs, 2, false, None, Target::Native).unwrap();

    // 1, X0, X1, X0*X1, X1*X0, X1*X1 since X0*X0 = 1
    assert_eq!(sdp.block_struct(), &[6, 3]);
    assert_eq!(sdp.localization_order(), &[1]);

    assert_upper_triangle(&sdp);
    assert_block_rows(&sdp);
}

#[test]
fn test_hermitian_dedup()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x.clone()], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 2, false, None, Target::Native).unwrap();

    // 7 monomials: at most 7 * 8 / 2 - 1 variables, fewer by the adjoint pairs
    assert_eq!(sdp.block_struct()[0], 7);
    assert!(sdp.n_vars() < 27);

    let x01 = Monomial::from_vars(&[x[0], x[1]]);
    let x10 = Monomial::from_vars(&[x[1], x[0]]);
    let idx = sdp.monomial_index();
    let k = idx.slot_of(&x01).unwrap();
    assert_eq!(idx.slot_of(&x10), None);
    assert_eq!(idx.index_of(sdp.algebra(), sdp.substitutions(), &x10, 2.), Some((k, 2.)));

    assert_upper_triangle(&sdp);
    assert_block_rows(&sdp);
}

#[test]
fn test_non_hermitian()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut alg = NcAlgebra::new();
    let a = alg.add_variable("a", false);

    let pa = P::var(a);
    let pa_adj = P::from_monomial(Monomial::from_letters(vec![Letter::new(a).dagger()]));
    let obj = &pa + &pa_adj;

    let mut sdp = ASdp::new(alg, vec![vec![a]], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    // 1, a, a'
    assert_eq!(sdp.block_struct(), &[3]);
    // a, a', a'a, a'a', a a' without sharing
    assert_eq!(sdp.n_vars(), 5);
    assert_eq!(sdp.obj_facvar()[0..2], [1., 1.]);

    assert_upper_triangle(&sdp);
}

#[test]
fn test_degree_too_high()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, _) = two_hermitian();
    let x0 = P::var(x[0]);
    let ineq = P::one() - &x0 * &x0 * &x0;

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
    let r = sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native);

    assert_eq!(r, Err(RelaxError::DegreeTooHigh {degree: 3, level: 1}));
    assert_ne!(sdp.stage(), Stage::Finalized);
}

#[test]
fn test_degree_too_high_equality()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, _) = two_hermitian();
    let x0 = P::var(x[0]);
    let eq = &x0 * &x0 * &x0 - P::one();

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
    let r = sdp.get_relaxation(&obj, &[], &[eq], Substitutions::new(), 1, true, None, Target::Native);

    assert_eq!(r, Err(RelaxError::DegreeTooHigh {degree: 3, level: 1}));
}

#[test]
fn test_unknown_hierarchy()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let r = "npa-sparse".parse::<Hierarchy>();
    assert_eq!(r, Err(RelaxError::UnknownHierarchy));

    let h: Hierarchy = "npa_sparse".parse().unwrap();
    assert_eq!(h, Hierarchy::NpaSparse);
}

#[test]
fn test_stage_order()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
    assert_eq!(sdp.stage(), Stage::Configured);
    assert_eq!(sdp.swap_objective(&obj), Err(RelaxError::StageOrder));

    sdp.get_relaxation(&obj, &[ineq.clone()], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();
    let r = sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native);
    assert_eq!(r, Err(RelaxError::StageOrder));
}

#[test]
fn test_equalities_as_inequalities()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, ineq) = two_hermitian();
    let eq = P::var(x[0]) - P::one();

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], &[eq], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    assert_eq!(sdp.block_struct(), &[3, 1, 1, 1]);
    assert_eq!(sdp.n_vars(), 5);

    // X0 - 1 >= 0 and 1 - X0 >= 0
    let f = sdp.f_struct();
    assert_eq!((f.get(10, 0), f.get(10, 1)), (-1., 1.));
    assert_eq!((f.get(11, 0), f.get(11, 1)), (1., -1.));

    assert_block_rows(&sdp);
}

#[test]
fn test_swap_objective()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x.clone()], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    let f_before = sdp.f_struct().clone();
    let triples_before: Vec<_> = f_before.triples().collect();

    let new_obj = P::var(x[0]) - P::var(x[1]) + P::constant(3.);
    sdp.swap_objective(&new_obj).unwrap();

    assert_eq!(sdp.obj_facvar(), &[1., -1., 0., 0., 0.]);
    assert_eq!(sdp.constant_term(), 3.);
    assert_eq!(sdp.f_struct(), &f_before);
    assert_eq!(sdp.f_struct().triples().collect::<Vec<_>>(), triples_before);
    assert_eq!(sdp.stage(), Stage::Finalized);
}

#[test]
fn test_dropped_terms()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, _, ineq) = two_hermitian();
    let x0 = P::var(x[0]);
    let obj = &x0 + &x0 * &x0 * &x0;

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa);
    sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    // X0^3 is beyond level 1
    assert_eq!(sdp.dropped_terms(), 1);
    assert_eq!(sdp.obj_facvar(), &[1., 0., 0., 0., 0.]);
}

#[test]
fn test_unnormalized()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa)
                  .par(|p| {
                      p.normalized = false;
                  });
    sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    // the identity takes slot 1
    assert_eq!(sdp.n_vars(), 6);
    assert_eq!(sdp.monomial_index().slot_of(&Monomial::one()), Some(1));
    assert_eq!(sdp.f_struct().get(0, 1), 1.);
    assert_eq!(sdp.f_struct().get(9, 1), 1.);
    assert_eq!(sdp.f_struct().get(9, 0), 0.);
}

#[test]
fn test_unnormalized_adjoint_identity()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);
    let subs = Substitutions::new()
               .with(Monomial::from_vars(&[x[0], x[1]]), P::one());

    // adjoint of X1*X0 reduces to the identity
    let obj = P::from_monomial(Monomial::from_vars(&[x[1], x[0]]));

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa)
                  .par(|p| {
                      p.normalized = false;
                  });
    sdp.get_relaxation(&obj, &[], &[], subs, 1, false, None, Target::Native).unwrap();

    let k1 = sdp.monomial_index().slot_of(&Monomial::one()).unwrap();
    assert_eq!(sdp.obj_facvar()[k1 - 1], 1.);
    assert_eq!(sdp.obj_facvar().iter().filter(|c| **c != 0.).count(), 1);
    assert_eq!(sdp.constant_term(), 0.);
}

#[test]
fn test_dump_index()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let path = std::env::temp_dir().join(format!("ncsdp_dump_index_{}.txt", std::process::id()));
    let dump_path = path.to_string_lossy().into_owned();

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa)
                  .par(|p| {
                      p.verbose = 2;
                      p.dump_path = dump_path;
                  });
    sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(text, "1\tX0\n2\tX1\n3\tX0*X0\n4\tX0*X1\n5\tX1*X1\n");
}

#[test]
fn test_dump_index_unwritable()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let path = std::env::temp_dir().join("ncsdp_no_such_dir").join("monomials.txt");

    let (alg, x, obj, ineq) = two_hermitian();

    let mut sdp = ASdp::new(alg, vec![x], Hierarchy::Npa)
                  .par(|p| {
                      p.verbose = 2;
                      p.dump_path = path.to_string_lossy().into_owned();
                  });
    let r = sdp.get_relaxation(&obj, &[ineq], &[], Substitutions::new(), 1, false, None, Target::Native);

    assert_eq!(r, Err(RelaxError::Io(std::io::ErrorKind::NotFound)));
}
