use std::collections::BTreeMap;
use std::io::Write;
use num_traits::Float;
use crate::{Algebra, Monomial, Polynomial, Substitutions, RelaxError};

//

/// Monomial index
///
/// Bidirectional mapping between canonical monomials and SDP variable slots.
/// Slot 0 is the constant column; variables count from 1.
/// Slots are handed out in the order monomials are first met, so that the same
/// traversal always yields the same assignment.
///
/// Only [`MonomialIndex::lookup_or_insert`] and [`MonomialIndex::fresh_slot`] grow the index,
/// and both take `&mut self`: builders that only read it are given a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct MonomialIndex
{
    map: BTreeMap<Monomial, usize>,
    n_vars: usize,
    hermitian: bool,
    normalized: bool,
}

impl MonomialIndex
{
    /// Creates an empty index.
    ///
    /// * `hermitian` enables sharing a slot between a monomial and its adjoint.
    /// * `normalized` maps the identity to the constant slot 0.
    pub fn new(hermitian: bool, normalized: bool) -> Self
    {
        MonomialIndex {
            map: BTreeMap::new(),
            n_vars: 0,
            hermitian,
            normalized,
        }
    }

    /// Number of allocated variable slots.
    pub fn n_vars(&self) -> usize
    {
        self.n_vars
    }

    /// Number of monomials registered.
    pub fn len(&self) -> usize
    {
        self.map.len()
    }

    /// Checks if no monomial is registered.
    pub fn is_empty(&self) -> bool
    {
        self.map.is_empty()
    }

    /// Slot registered for exactly this monomial.
    pub fn slot_of(&self, mono: &Monomial) -> Option<usize>
    {
        self.map.get(mono).copied()
    }

    /// Registered monomials ordered by slot.
    pub fn entries(&self) -> Vec<(&Monomial, usize)>
    {
        let mut v: Vec<_> = self.map.iter().map(|(m, k)| (m, *k)).collect();
        v.sort_by_key(|e| e.1);
        v
    }

    /// Allocates a slot tied to no monomial.
    pub fn fresh_slot(&mut self) -> usize
    {
        self.n_vars += 1;
        self.n_vars
    }

    /// Slot of a canonical monomial, allocating one if not yet seen.
    ///
    /// Returns a tuple of the slot and the scalar factor relating the monomial to the slot's variable.
    /// If the index is Hermitian, the canonical adjoint of `mono` is tried before allocation.
    pub fn lookup_or_insert<F, A>(&mut self, algebra: &A, subs: &Substitutions<F>, mono: &Monomial) -> (usize, F)
    where F: Float, A: Algebra<F>
    {
        if mono.is_one() && self.normalized {
            return (0, F::one());
        }

        if let Some(k) = self.slot_of(mono) {
            return (k, F::one());
        }

        if self.hermitian && !mono.is_one() {
            if let Some((k, s)) = self.adjoint_slot(algebra, subs, mono) {
                return (k, s);
            }
        }

        let k = self.fresh_slot();
        self.map.insert(mono.clone(), k);
        (k, F::one())
    }

    /// Slot of a term without inserting.
    ///
    /// Returns a tuple of the slot and the coefficient, scaled by the factor coming from the adjoint if used,
    /// or `None` if neither the monomial nor its adjoint is registered.
    /// If normalized, the identity resolves to the constant slot 0.
    pub fn index_of<F, A>(&self, algebra: &A, subs: &Substitutions<F>, mono: &Monomial, coeff: F) -> Option<(usize, F)>
    where F: Float, A: Algebra<F>
    {
        if mono.is_one() && self.normalized {
            return Some((0, coeff));
        }

        if let Some(k) = self.slot_of(mono) {
            return Some((k, coeff));
        }

        self.adjoint_slot(algebra, subs, mono).map(|(k, s)| (k, coeff * s))
    }

    fn adjoint_slot<F, A>(&self, algebra: &A, subs: &Substitutions<F>, mono: &Monomial) -> Option<(usize, F)>
    where F: Float, A: Algebra<F>
    {
        let adj = Polynomial::from_monomial(algebra.adjoint(mono));
        let adj = algebra.canonicalize(&adj, subs);

        let (m, s) = adj.single_term()?;
        if m.is_one() && self.normalized {
            Some((0, s))
        }
        else {
            self.slot_of(m).map(|k| (k, s))
        }
    }

    /// Writes the index as text, one `slot<TAB>monomial` line per registered monomial.
    ///
    /// * `w` is the destination.
    /// * `format` gives the text of a monomial.
    pub fn save<W, M>(&self, mut w: W, format: M) -> Result<(), RelaxError>
    where W: Write, M: Fn(&Monomial) -> String
    {
        for (m, k) in self.entries() {
            writeln!(w, "{}\t{}", k, format(m))?;
        }
        w.flush()?;
        Ok(())
    }
}

//

#[test]
fn test_index_adjoint()
{
    use crate::NcAlgebra;

    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);
    let subs = Substitutions::<f64>::new();

    let x01 = Monomial::from_vars(&[x[0], x[1]]);
    let x10 = Monomial::from_vars(&[x[1], x[0]]);

    let mut idx = MonomialIndex::new(true, true);
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &Monomial::one()), (0, 1.));
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &Monomial::var(x[0])), (1, 1.));
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &x01), (2, 1.));
    // adjoint shares the slot of the first seen
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &x10), (2, 1.));
    assert_eq!(idx.n_vars(), 2);
    assert_eq!(idx.slot_of(&x10), None);

    assert_eq!(idx.index_of(&alg, &subs, &x10, 3.), Some((2, 3.)));
    assert_eq!(idx.index_of(&alg, &subs, &Monomial::var(x[1]), 1.), None);
    assert_eq!(idx.index_of(&alg, &subs, &Monomial::one(), 2.), Some((0, 2.)));

    // no sharing unless Hermitian
    let mut idx = MonomialIndex::new(false, true);
    idx.lookup_or_insert(&alg, &subs, &x01);
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &x10), (2, 1.));

    let mut buf = Vec::new();
    idx.save(&mut buf, |m| alg.format_monomial(m)).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "1\tX0*X1\n2\tX1*X0\n");
}

#[test]
fn test_index_adjoint_identity()
{
    use crate::NcAlgebra;

    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);
    let subs = Substitutions::<f64>::new()
               .with(Monomial::from_vars(&[x[0], x[1]]), Polynomial::one());

    let x10 = Monomial::from_vars(&[x[1], x[0]]);

    // the identity is a variable unless normalized
    let mut idx = MonomialIndex::new(true, false);
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &Monomial::one()), (1, 1.));
    assert_eq!(idx.index_of(&alg, &subs, &x10, 2.), Some((1, 2.)));
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &x10), (1, 1.));
    assert_eq!(idx.n_vars(), 1);

    let mut idx = MonomialIndex::new(true, true);
    assert_eq!(idx.index_of(&alg, &subs, &x10, 2.), Some((0, 2.)));
    assert_eq!(idx.lookup_or_insert(&alg, &subs, &x10), (0, 1.));
    assert_eq!(idx.n_vars(), 0);
}
