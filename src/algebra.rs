use std::collections::BTreeSet;
use num_traits::Float;
use crate::{VarId, Letter, Monomial, Polynomial, Substitutions};

//

/// Symbolic algebra capability
///
/// Everything the relaxation needs to know about the operator algebra:
/// reduction of polynomials into canonical form under [`Substitutions`],
/// adjoints, degrees, term decomposition and monomial enumeration.
/// [`NcAlgebra`] is the implementation shipped with this crate.
pub trait Algebra<F: Float>
{
    /// Checks if a variable is Hermitian.
    fn is_hermitian(&self, var: VarId) -> bool;

    /// Checks if all the variables are Hermitian.
    fn all_hermitian(&self, vars: &[VarId]) -> bool
    {
        vars.iter().all(|v| self.is_hermitian(*v))
    }

    /// Reduces a polynomial into its canonical form.
    ///
    /// Returns the polynomial after the substitution rules are applied until nothing changes.
    /// * `poly` is the polynomial to reduce.
    /// * `subs` is the substitution rules.
    fn canonicalize(&self, poly: &Polynomial<F>, subs: &Substitutions<F>) -> Polynomial<F>;

    /// Adjoint of a monomial, before any substitution.
    fn adjoint(&self, mono: &Monomial) -> Monomial
    {
        let w = mono.letters().iter().rev()
                .map(|l| if self.is_hermitian(l.var) {Letter::new(l.var)} else {l.dagger()})
                .collect();
        Monomial::from_letters(w)
    }

    /// Degree of a polynomial.
    fn degree(&self, poly: &Polynomial<F>) -> usize
    {
        poly.degree()
    }

    /// Decomposes a polynomial into its additive terms.
    fn expand(&self, poly: &Polynomial<F>) -> Vec<(Monomial, F)>
    {
        poly.terms().map(|(m, c)| (m.clone(), c)).collect()
    }

    /// Enumerates the monomials of the variables up to a degree.
    ///
    /// Returns the identity first, then the words by increasing degree.
    fn enumerate_monomials(&self, vars: &[VarId], degree: usize) -> Vec<Monomial>;

    /// Variables a polynomial depends on.
    fn support(&self, poly: &Polynomial<F>) -> BTreeSet<VarId>
    {
        poly.terms().flat_map(|(m, _)| m.vars().collect::<Vec<_>>()).collect()
    }

    /// Human-readable text of a monomial.
    fn format_monomial(&self, mono: &Monomial) -> String
    {
        mono.to_string()
    }
}

//

/// Variable entry of [`NcAlgebra`].
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo
{
    /// Name used in diagnostics.
    pub name: String,
    /// `true` if the operator is Hermitian.
    pub hermitian: bool,
}

/// Noncommutative (or commutative) polynomial algebra
///
/// Owns the variable table.
/// Words are reduced by rewriting the first occurrence of the first matching rule
/// until a fixed point; commutative algebras also sort every word.
#[derive(Debug, Clone)]
pub struct NcAlgebra
{
    vars: Vec<VarInfo>,
    commutative: bool,
    max_subst_iter: usize,
}

impl NcAlgebra
{
    /// Creates a noncommutative algebra without variables.
    pub fn new() -> Self
    {
        NcAlgebra {
            vars: Vec::new(),
            commutative: false,
            max_subst_iter: 1000,
        }
    }

    /// Creates a commutative algebra without variables.
    pub fn new_commutative() -> Self
    {
        NcAlgebra {
            commutative: true,
            .. Self::new()
        }
    }

    /// Limits the passes of substitution before giving up.
    pub fn max_subst_iter(mut self, n: usize) -> Self
    {
        self.max_subst_iter = n;
        self
    }

    /// Adds a variable.
    ///
    /// Returns its [`VarId`].
    pub fn add_variable(&mut self, name: &str, hermitian: bool) -> VarId
    {
        self.vars.push(VarInfo {
            name: name.to_string(),
            hermitian,
        });
        self.vars.len() - 1
    }

    /// Adds `n` variables named `prefix0`, `prefix1`, ...
    pub fn add_variables(&mut self, prefix: &str, n: usize, hermitian: bool) -> Vec<VarId>
    {
        (0.. n).map(|i| self.add_variable(&format!("{}{}", prefix, i), hermitian)).collect()
    }

    /// Variable entry.
    pub fn var_info(&self, var: VarId) -> &VarInfo
    {
        &self.vars[var]
    }

    /// Number of variables.
    pub fn n_vars(&self) -> usize
    {
        self.vars.len()
    }

    /// Checks if commutative.
    pub fn is_commutative(&self) -> bool
    {
        self.commutative
    }

    /// Rules \\(P^2 \rightarrow P\\) of projectors.
    pub fn projector_rules<F: Float>(&self, vars: &[VarId]) -> Substitutions<F>
    {
        let mut subs = Substitutions::new();
        for v in vars {
            subs.add(Monomial::from_vars(&[*v, *v]), Polynomial::var(*v));
        }
        subs
    }

    /// Rules \\(b a \rightarrow a b\\) making two groups of variables commute.
    pub fn commuting_rules<F: Float>(&self, a: &[VarId], b: &[VarId]) -> Substitutions<F>
    {
        let mut subs = Substitutions::new();
        for la in self.letters_of(a) {
            for lb in self.letters_of(b) {
                let lhs = Monomial::from_letters(vec![lb, la]);
                let rhs = Monomial::from_letters(vec![la, lb]);
                subs.add(lhs, Polynomial::from_monomial(rhs));
            }
        }
        subs
    }

    /// Checks if a variable is Hermitian.
    pub fn is_hermitian(&self, var: VarId) -> bool
    {
        self.vars[var].hermitian
    }

    /// Enumerates the monomials of the variables up to a degree.
    ///
    /// Returns the identity first, then the words by increasing degree.
    pub fn enumerate_monomials(&self, vars: &[VarId], degree: usize) -> Vec<Monomial>
    {
        let letters = self.letters_of(vars);

        let mut seen = BTreeSet::new();
        let mut monos = vec![Monomial::one()];
        seen.insert(Monomial::one());

        let mut layer = vec![Monomial::one()];
        for _ in 0.. degree {
            let mut next = Vec::new();
            for w in layer.iter() {
                for l in letters.iter() {
                    let m = self.normal_order(&w.push(*l));
                    if seen.insert(m.clone()) {
                        next.push(m);
                    }
                }
            }
            monos.extend(next.iter().cloned());
            layer = next;
        }

        monos
    }

    /// Text of a monomial using the variable names.
    pub fn format_monomial(&self, mono: &Monomial) -> String
    {
        if mono.is_one() {
            return "1".to_string();
        }

        let names: Vec<String> = mono.letters().iter().map(|l| {
            if l.adj {
                format!("{}'", self.vars[l.var].name)
            }
            else {
                self.vars[l.var].name.clone()
            }
        }).collect();
        names.join("*")
    }

    fn letters_of(&self, vars: &[VarId]) -> Vec<Letter>
    {
        let mut ls = Vec::new();
        for v in vars {
            let l = Letter::new(*v);
            ls.push(l);
            if !self.vars[*v].hermitian {
                ls.push(l.dagger());
            }
        }
        ls
    }

    fn normal_order(&self, mono: &Monomial) -> Monomial
    {
        let mut m = mono.clone();
        for l in m.letters_mut().iter_mut() {
            if self.vars[l.var].hermitian {
                l.adj = false;
            }
        }
        if self.commutative {
            m.letters_mut().sort();
        }
        m
    }

    // the word without the letters of pattern, if it contains them all
    fn remove_submultiset(mono: &Monomial, pattern: &Monomial) -> Option<Monomial>
    {
        let mut rest = mono.letters().to_vec();
        for l in pattern.letters() {
            let i = rest.iter().position(|x| x == l)?;
            rest.remove(i);
        }
        Some(Monomial::from_letters(rest))
    }

    fn substitute_once<F: Float>(&self, poly: &Polynomial<F>, subs: &Substitutions<F>) -> Polynomial<F>
    {
        let mut out = Polynomial::zero();

        for (m, c) in poly.terms() {
            let mut replaced = None;

            for (lhs, rhs) in subs.iter() {
                let lhs = self.normal_order(lhs);
                if lhs.is_one() || lhs.degree() > m.degree() {
                    continue;
                }

                if self.commutative {
                    if let Some(rest) = Self::remove_submultiset(m, &lhs) {
                        replaced = Some(Polynomial::from_monomial(rest) * rhs);
                        break;
                    }
                }
                else if let Some(pos) = m.find(&lhs) {
                    let (l, r) = m.split_around(pos, lhs.degree());
                    replaced = Some(Polynomial::from_monomial(l) * rhs * Polynomial::from_monomial(r));
                    break;
                }
            }

            match replaced {
                Some(p) => {
                    for (rm, rc) in p.terms() {
                        out.add_term(self.normal_order(rm), c * rc);
                    }
                },
                None => out.add_term(m.clone(), c),
            }
        }

        out
    }
}

impl Default for NcAlgebra
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<F: Float> Algebra<F> for NcAlgebra
{
    fn is_hermitian(&self, var: VarId) -> bool
    {
        NcAlgebra::is_hermitian(self, var)
    }

    fn canonicalize(&self, poly: &Polynomial<F>, subs: &Substitutions<F>) -> Polynomial<F>
    {
        let mut cur = poly.map_monomials(|m| self.normal_order(m));

        if subs.is_empty() {
            return cur;
        }

        for _ in 0.. self.max_subst_iter {
            let next = self.substitute_once(&cur, subs);
            if next == cur {
                return cur;
            }
            cur = next;
        }

        log::warn!("substitution did not converge in {} passes", self.max_subst_iter);
        cur
    }

    fn enumerate_monomials(&self, vars: &[VarId], degree: usize) -> Vec<Monomial>
    {
        NcAlgebra::enumerate_monomials(self, vars, degree)
    }

    fn format_monomial(&self, mono: &Monomial) -> String
    {
        NcAlgebra::format_monomial(self, mono)
    }
}

//

/// Monomial basis of a group of variables.
///
/// Returns the enumerated monomials up to `level` plus `extra`,
/// each reduced under `subs` with its scalar factor removed,
/// monomials reducing to zero dropped and duplicates removed in order.
pub fn get_monomials<F, A>(algebra: &A, vars: &[VarId], extra: &[Monomial], subs: &Substitutions<F>, level: usize) -> Vec<Monomial>
where F: Float, A: Algebra<F>
{
    let mut monos = algebra.enumerate_monomials(vars, level);
    monos.extend(extra.iter().cloned());

    let reduced = monos.into_iter().filter_map(|m| {
        let p = algebra.canonicalize(&Polynomial::from_monomial(m.clone()), subs);
        if p.is_zero() {
            None
        }
        else if let Some((r, _)) = p.single_term() {
            Some(r.clone())
        }
        else {
            Some(m)
        }
    });

    unique(reduced)
}

/// Monomials of degree at most `degree`.
pub fn pick_monomials_up_to_degree(monos: &[Monomial], degree: usize) -> Vec<Monomial>
{
    monos.iter().filter(|m| m.degree() <= degree).cloned().collect()
}

/// Removes duplicates keeping the first occurrences in order.
pub fn unique<I>(monos: I) -> Vec<Monomial>
where I: IntoIterator<Item=Monomial>
{
    let mut seen = BTreeSet::new();
    monos.into_iter().filter(|m| seen.insert(m.clone())).collect()
}

//

#[test]
fn test_enumerate_monomials()
{
    let mut alg = NcAlgebra::new();
    let x = alg.add_variables("X", 2, true);

    let monos = alg.enumerate_monomials(&x, 2);
    // 1, X0, X1, X0X0, X0X1, X1X0, X1X1
    assert_eq!(monos.len(), 7);
    assert!(monos[0].is_one());
    assert_eq!(monos[1], Monomial::var(x[0]));
    assert_eq!(monos[5], Monomial::from_vars(&[x[1], x[0]]));

    let mut alg = NcAlgebra::new_commutative();
    let x = alg.add_variables("x", 2, true);

    let monos = alg.enumerate_monomials(&x, 2);
    // 1, x0, x1, x0^2, x0x1, x1^2
    assert_eq!(monos.len(), 6);

    let mut alg = NcAlgebra::new();
    let a = alg.add_variable("a", false);

    let monos = alg.enumerate_monomials(&[a], 1);
    // 1, a, a'
    assert_eq!(monos.len(), 3);
    assert_eq!(alg.format_monomial(&monos[2]), "a'");
}

#[test]
fn test_canonicalize()
{
    type P = Polynomial<f64>;

    let mut alg = NcAlgebra::new();
    let p = alg.add_variables("P", 2, true);

    let subs = alg.projector_rules::<f64>(&p)
               .with(Monomial::from_vars(&[p[1], p[0]]), P::zero());

    // P0 P0 P1 P1 -> P0 P1
    let w = P::from_monomial(Monomial::from_vars(&[p[0], p[0], p[1], p[1]]));
    let c = alg.canonicalize(&w, &subs);
    assert_eq!(c, P::from_monomial(Monomial::from_vars(&[p[0], p[1]])));

    // P1 P1 P0 -> P1 P0 -> 0
    let w = P::from_monomial(Monomial::from_vars(&[p[1], p[1], p[0]]));
    assert!(alg.canonicalize(&w, &subs).is_zero());

    let mut alg = NcAlgebra::new_commutative();
    let x = alg.add_variables("x", 2, true);

    let w = P::from_monomial(Monomial::from_vars(&[x[1], x[0], x[1]]));
    let subs = Substitutions::new().with(Monomial::from_vars(&[x[1], x[1]]), P::one());
    let c = alg.canonicalize(&w, &subs);
    assert_eq!(c, P::var(x[0]));
}
