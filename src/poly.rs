use std::collections::BTreeMap;
use std::ops::{Add, Sub, Mul, Neg};
use core::fmt::{Display, Formatter};
use num_traits::Float;

//

/// Variable identifier, an index into the variable table of an [`crate::Algebra`].
pub type VarId = usize;

/// A variable or its adjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Letter
{
    /// Variable.
    pub var: VarId,
    /// `true` if the adjoint of the variable.
    pub adj: bool,
}

impl Letter
{
    /// Creates a plain (non-adjoint) letter.
    pub fn new(var: VarId) -> Self
    {
        Letter {
            var,
            adj: false,
        }
    }

    /// Adjoint of the letter.
    pub fn dagger(self) -> Self
    {
        Letter {
            var: self.var,
            adj: !self.adj,
        }
    }
}

//

/// Monomial
///
/// A word of [`Letter`]s, i.e. an ordered product of operators.
/// The empty word is the identity.
/// Equality is structural; canonicalization is the job of [`crate::Algebra`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Monomial(Vec<Letter>);

impl Monomial
{
    /// Identity monomial.
    pub fn one() -> Self
    {
        Monomial(Vec::new())
    }

    /// Monomial of a single variable.
    pub fn var(var: VarId) -> Self
    {
        Monomial(vec![Letter::new(var)])
    }

    /// Monomial of a given word.
    pub fn from_letters(letters: Vec<Letter>) -> Self
    {
        Monomial(letters)
    }

    /// Monomial of a word of plain variables.
    pub fn from_vars(vars: &[VarId]) -> Self
    {
        Monomial(vars.iter().map(|v| Letter::new(*v)).collect())
    }

    /// Checks if the identity.
    pub fn is_one(&self) -> bool
    {
        self.0.is_empty()
    }

    /// Length of the word.
    pub fn degree(&self) -> usize
    {
        self.0.len()
    }

    /// Letters of the word.
    pub fn letters(&self) -> &[Letter]
    {
        &self.0
    }

    /// Word concatenation `self * rhs`.
    pub fn concat(&self, rhs: &Monomial) -> Monomial
    {
        let mut w = Vec::with_capacity(self.0.len() + rhs.0.len());
        w.extend_from_slice(&self.0);
        w.extend_from_slice(&rhs.0);
        Monomial(w)
    }

    /// Word with a letter appended.
    pub fn push(&self, l: Letter) -> Monomial
    {
        let mut w = self.0.clone();
        w.push(l);
        Monomial(w)
    }

    /// Position of the first contiguous occurrence of `pattern`.
    pub fn find(&self, pattern: &Monomial) -> Option<usize>
    {
        let (n, k) = (self.0.len(), pattern.0.len());
        if k == 0 || k > n {
            return None;
        }

        (0..= n - k).find(|&i| self.0[i..i + k] == pattern.0[..])
    }

    /// Splits into the words before and after `[pos, pos + len)`.
    pub fn split_around(&self, pos: usize, len: usize) -> (Monomial, Monomial)
    {
        assert!(pos + len <= self.0.len());

        (Monomial(self.0[..pos].to_vec()), Monomial(self.0[pos + len..].to_vec()))
    }

    /// Variables appearing in the word.
    pub fn vars(&self) -> impl Iterator<Item=VarId> + '_
    {
        self.0.iter().map(|l| l.var)
    }

    pub(crate) fn letters_mut(&mut self) -> &mut Vec<Letter>
    {
        &mut self.0
    }
}

impl Display for Monomial
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        if self.0.is_empty() {
            return write!(f, "1");
        }

        for (i, l) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "x{}", l.var)?;
            if l.adj {
                write!(f, "'")?;
            }
        }
        Ok(())
    }
}

//

/// Polynomial
///
/// Linear combination of [`Monomial`]s with nonzero coefficients,
/// kept in a `BTreeMap` so that every traversal is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial<F>
{
    terms: BTreeMap<Monomial, F>,
}

impl<F: Float> Polynomial<F>
{
    /// Zero polynomial.
    pub fn zero() -> Self
    {
        Polynomial {
            terms: BTreeMap::new(),
        }
    }

    /// Identity polynomial.
    pub fn one() -> Self
    {
        Self::constant(F::one())
    }

    /// Constant polynomial.
    pub fn constant(c: F) -> Self
    {
        Self::from_term(Monomial::one(), c)
    }

    /// Polynomial of a single variable.
    pub fn var(var: VarId) -> Self
    {
        Self::from_monomial(Monomial::var(var))
    }

    /// Polynomial of a single monomial with coefficient one.
    pub fn from_monomial(m: Monomial) -> Self
    {
        Self::from_term(m, F::one())
    }

    /// Polynomial of a single term.
    pub fn from_term(m: Monomial, c: F) -> Self
    {
        let mut p = Self::zero();
        p.add_term(m, c);
        p
    }

    /// Polynomial of terms, accumulating duplicated monomials.
    pub fn from_terms<I>(iter: I) -> Self
    where I: IntoIterator<Item=(Monomial, F)>
    {
        let mut p = Self::zero();
        for (m, c) in iter {
            p.add_term(m, c);
        }
        p
    }

    /// Adds `c * m`, dropping the term if it cancels.
    pub fn add_term(&mut self, m: Monomial, c: F)
    {
        if c == F::zero() {
            return;
        }

        let f0 = F::zero();
        let v = self.terms.get(&m).copied().unwrap_or(f0) + c;
        if v == f0 {
            self.terms.remove(&m);
        }
        else {
            self.terms.insert(m, v);
        }
    }

    /// Terms in monomial order.
    pub fn terms(&self) -> impl Iterator<Item=(&Monomial, F)> + '_
    {
        self.terms.iter().map(|(m, c)| (m, *c))
    }

    /// Number of terms.
    pub fn len(&self) -> usize
    {
        self.terms.len()
    }

    /// Checks if zero.
    pub fn is_zero(&self) -> bool
    {
        self.terms.is_empty()
    }

    /// The only term, if the polynomial has exactly one.
    pub fn single_term(&self) -> Option<(&Monomial, F)>
    {
        if self.terms.len() == 1 {
            self.terms().next()
        }
        else {
            None
        }
    }

    /// Coefficient of the identity.
    pub fn constant_term(&self) -> F
    {
        self.terms.get(&Monomial::one()).copied().unwrap_or_else(F::zero)
    }

    /// Length of the longest word; zero for constants and for the zero polynomial.
    pub fn degree(&self) -> usize
    {
        self.terms.keys().map(|m| m.degree()).max().unwrap_or(0)
    }

    /// Scales by `alpha`.
    pub fn scale(&self, alpha: F) -> Self
    {
        Self::from_terms(self.terms().map(|(m, c)| (m.clone(), alpha * c)))
    }

    /// Maps every monomial, accumulating the coefficients.
    pub fn map_monomials<M>(&self, mut map: M) -> Self
    where M: FnMut(&Monomial) -> Monomial
    {
        Self::from_terms(self.terms().map(|(m, c)| (map(m), c)))
    }
}

impl<F: Float> Default for Polynomial<F>
{
    fn default() -> Self
    {
        Self::zero()
    }
}

impl<F: Float + Display> Display for Polynomial<F>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result
    {
        if self.terms.is_empty() {
            return write!(f, "0");
        }

        for (i, (m, c)) in self.terms().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}*{}", c, m)?;
        }
        Ok(())
    }
}

//

fn poly_add<F: Float>(lhs: &Polynomial<F>, rhs: &Polynomial<F>, sign: F) -> Polynomial<F>
{
    let mut p = lhs.clone();
    for (m, c) in rhs.terms() {
        p.add_term(m.clone(), sign * c);
    }
    p
}

fn poly_mul<F: Float>(lhs: &Polynomial<F>, rhs: &Polynomial<F>) -> Polynomial<F>
{
    let mut p = Polynomial::zero();
    for (ml, cl) in lhs.terms() {
        for (mr, cr) in rhs.terms() {
            p.add_term(ml.concat(mr), cl * cr);
        }
    }
    p
}

macro_rules! impl_poly_binop {
    ($tr:ident, $fn:ident, $body:expr) => {
        impl<F: Float> $tr<Polynomial<F>> for Polynomial<F>
        {
            type Output = Polynomial<F>;
            fn $fn(self, rhs: Polynomial<F>) -> Polynomial<F>
            {
                $body(&self, &rhs)
            }
        }

        impl<F: Float> $tr<&Polynomial<F>> for Polynomial<F>
        {
            type Output = Polynomial<F>;
            fn $fn(self, rhs: &Polynomial<F>) -> Polynomial<F>
            {
                $body(&self, rhs)
            }
        }

        impl<F: Float> $tr<Polynomial<F>> for &Polynomial<F>
        {
            type Output = Polynomial<F>;
            fn $fn(self, rhs: Polynomial<F>) -> Polynomial<F>
            {
                $body(self, &rhs)
            }
        }

        impl<F: Float> $tr<&Polynomial<F>> for &Polynomial<F>
        {
            type Output = Polynomial<F>;
            fn $fn(self, rhs: &Polynomial<F>) -> Polynomial<F>
            {
                $body(self, rhs)
            }
        }
    };
}

impl_poly_binop!(Add, add, |l, r| poly_add(l, r, F::one()));
impl_poly_binop!(Sub, sub, |l, r| poly_add(l, r, -F::one()));
impl_poly_binop!(Mul, mul, poly_mul);

impl<F: Float> Mul<F> for Polynomial<F>
{
    type Output = Polynomial<F>;
    fn mul(self, rhs: F) -> Polynomial<F>
    {
        self.scale(rhs)
    }
}

impl<F: Float> Neg for Polynomial<F>
{
    type Output = Polynomial<F>;
    fn neg(self) -> Polynomial<F>
    {
        self.scale(-F::one())
    }
}

impl<F: Float> Neg for &Polynomial<F>
{
    type Output = Polynomial<F>;
    fn neg(self) -> Polynomial<F>
    {
        self.scale(-F::one())
    }
}

//

/// Substitution rules
///
/// Ordered list of rules rewriting a monomial pattern into a polynomial,
/// e.g. \\(P^2 \rightarrow P\\) for projectors.
/// Rules are tried in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitutions<F>
{
    rules: Vec<(Monomial, Polynomial<F>)>,
}

impl<F: Float> Substitutions<F>
{
    /// Creates an empty rule set.
    pub fn new() -> Self
    {
        Substitutions {
            rules: Vec::new(),
        }
    }

    /// Adds a rule `lhs -> rhs`, replacing the previous rule of the same `lhs`.
    pub fn add(&mut self, lhs: Monomial, rhs: Polynomial<F>)
    {
        assert!(!lhs.is_one());

        if let Some(r) = self.rules.iter_mut().find(|(l, _)| *l == lhs) {
            r.1 = rhs;
        }
        else {
            self.rules.push((lhs, rhs));
        }
    }
    /// Builder pattern of [`Substitutions::add`].
    pub fn with(mut self, lhs: Monomial, rhs: Polynomial<F>) -> Self
    {
        self.add(lhs, rhs);
        self
    }

    /// Appends all rules of `other`.
    pub fn extend(&mut self, other: Substitutions<F>)
    {
        for (l, r) in other.rules {
            self.add(l, r);
        }
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item=&(Monomial, Polynomial<F>)>
    {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize
    {
        self.rules.len()
    }

    /// Checks if no rule.
    pub fn is_empty(&self) -> bool
    {
        self.rules.is_empty()
    }
}

impl<F: Float> Default for Substitutions<F>
{
    fn default() -> Self
    {
        Self::new()
    }
}

//

#[test]
fn test_poly_arith()
{
    type P = Polynomial<f64>;

    let x0 = P::var(0);
    let x1 = P::var(1);

    // (x0 + x1)(x0 - x1) = x0^2 - x0x1 + x1x0 - x1^2
    let p = (&x0 + &x1) * (&x0 - &x1);
    assert_eq!(p.len(), 4);
    assert_eq!(p.degree(), 2);
    assert_eq!(p.constant_term(), 0.);

    // cancels to zero
    let z = &p - &p;
    assert!(z.is_zero());

    let q = P::one() - &x0 * &x0;
    assert_eq!(q.constant_term(), 1.);
    assert_eq!(q.single_term(), None);
    assert_eq!((-q).constant_term(), -1.);
}

#[test]
fn test_monomial_find()
{
    let w = Monomial::from_vars(&[0, 1, 1, 2]);

    assert_eq!(w.find(&Monomial::from_vars(&[1, 1])), Some(1));
    assert_eq!(w.find(&Monomial::from_vars(&[2, 0])), None);
    assert_eq!(w.find(&Monomial::one()), None);

    let (l, r) = w.split_around(1, 2);
    assert_eq!(l, Monomial::from_vars(&[0]));
    assert_eq!(r, Monomial::from_vars(&[2]));
    assert_eq!(w.to_string(), "x0*x1*x1*x2");
}
