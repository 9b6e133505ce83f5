//! # The term model
//!
//! This module defines the tree representation of logic terms that is used at
//! the boundaries of the engine: rules are built from [`Term`]s, and solutions
//! are handed back as [`Term`]s with all bindings applied.
//!
//! The root nodes are [`Rule`] for facts and derivation rules, and [`Query`]
//! for conjunctive goals to be proven against a theory.

/// An interned functor symbol, e.g. `foo` and `bar` in `foo(bar)`. It can
/// refer to both a predicate and data.
///
/// Symbols are plain numeric IDs; the associated names live in a
/// [`SymbolStore`](crate::symbols::SymbolStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sym(usize);

impl Sym {
    /// The reserved cut functor `@cut`. It is pre-interned by every
    /// [`SymbolStore`](crate::symbols::SymbolStore), and the nullary
    /// application `@cut/0` is the cut marker recognized by the resolvers.
    pub const CUT: Sym = Sym(0);

    /// Return the ordinal number of this symbol.
    #[inline(always)]
    pub fn ord(self) -> usize {
        self.0
    }

    /// Build a symbol from its ordinal number. Inverse of [`Sym::ord`].
    #[inline(always)]
    pub fn from_ord(ord: usize) -> Sym {
        Sym(ord)
    }
}

/// A variable, identified by a numeric index.
///
/// Variable identity is the index, not the surface name: two occurrences of
/// `$X` in different clauses denote different variables. Surface names are
/// kept in a [`VarScope`] purely for display. Indices should be allocated
/// densely from zero within each rule or query, because the engine uses them
/// as slots in the per-query binding vector; the [`forall`] and [`exists`]
/// helpers and the parser both do this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(usize);

impl Var {
    /// Return the ordinal number of this variable.
    #[inline(always)]
    pub fn ord(self) -> usize {
        self.0
    }

    /// Build a variable from its ordinal number. Inverse of [`Var::ord`].
    #[inline(always)]
    pub fn from_ord(ord: usize) -> Var {
        Var(ord)
    }

    /// Apply an offset to the variable's index.
    ///
    /// Rule activation mints fresh variables by offsetting the rule's dense
    /// `0..n` range past all variables allocated so far.
    pub fn offset(self, offset: usize) -> Var {
        Var(self.0 + offset)
    }
}

/// A logic term: either a variable or an application of a functor to
/// argument terms.
///
/// A nullary application acts as an atom. Number and string literals of the
/// surface syntax are stored as atoms as well; the engine assigns them no
/// further meaning. Bindings are never stored inside a term, they live in a
/// [`Context`](crate::context::Context), so terms can be shared freely
/// across backtracking branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A variable term.
    Var(Var),
    /// An application term, see [`AppTerm`].
    App(AppTerm),
}

impl Term {
    /// Number of binding slots needed to accommodate all variables in this
    /// term, i.e. the highest variable index plus one.
    pub fn var_slots(&self) -> usize {
        match self {
            Term::Var(v) => v.0 + 1,
            Term::App(app) => app.var_slots(),
        }
    }

    /// Whether this term is the cut marker `@cut/0`.
    pub fn is_cut(&self) -> bool {
        matches!(self, Term::App(app) if app.is_cut())
    }
}

impl From<Var> for Term {
    fn from(v: Var) -> Self {
        Term::Var(v)
    }
}

impl From<Sym> for Term {
    fn from(s: Sym) -> Self {
        Term::App(s.into())
    }
}

impl From<AppTerm> for Term {
    fn from(app: AppTerm) -> Self {
        Term::App(app)
    }
}

/// An application term `functor(arg1, ..., argN)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTerm {
    /// The functor being applied.
    pub functor: Sym,
    /// The ordered arguments of the application.
    pub args: Vec<Term>,
}

impl From<Sym> for AppTerm {
    fn from(s: Sym) -> Self {
        Self {
            functor: s,
            args: vec![],
        }
    }
}

impl AppTerm {
    pub fn new(functor: Sym, args: Vec<Term>) -> Self {
        Self { functor, args }
    }

    /// The cut marker `@cut/0`.
    pub fn cut() -> Self {
        Self {
            functor: Sym::CUT,
            args: vec![],
        }
    }

    pub fn is_cut(&self) -> bool {
        self.functor == Sym::CUT && self.args.is_empty()
    }

    /// See [`Term::var_slots`].
    pub fn var_slots(&self) -> usize {
        self.args.iter().map(Term::var_slots).max().unwrap_or(0)
    }
}

/// Convenience constructor for an application term.
pub fn app(functor: Sym, args: Vec<Term>) -> Term {
    Term::App(AppTerm::new(functor, args))
}

/// Convenience constructor for a variable term.
pub fn var(v: Var) -> Term {
    Term::Var(v)
}

/// A Horn clause: `head` holds whenever every term in `body` holds. A clause
/// with an empty body is a fact.
///
/// # Examples
///
/// ```
/// use hornlog::ast::*;
/// // grandparent($0, $1) :- parent($0, $2), parent($2, $1).
/// let grandparent = Sym::from_ord(1); // normally obtained from a SymbolStore
/// let parent = Sym::from_ord(2);
/// let rule = forall(|[x, y, z]| {
///     Rule::fact(grandparent, vec![x.into(), y.into()])
///         .when(parent, vec![x.into(), z.into()])
///         .when(parent, vec![z.into(), y.into()])
/// });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The derivable fact.
    pub head: AppTerm,
    /// The conditions under which `head` holds, proven left to right.
    pub body: Vec<Term>,
    /// Display names of the variables used in this rule, if known.
    pub scope: Option<VarScope>,
}

impl Rule {
    /// Create a fact, i.e. a rule that unconditionally holds.
    pub fn fact(pred: Sym, args: Vec<Term>) -> Self {
        Self {
            head: AppTerm::new(pred, args),
            body: vec![],
            scope: None,
        }
    }

    /// Append a condition that must hold for the head to become true.
    pub fn when(mut self, pred: Sym, args: Vec<Term>) -> Self {
        self.body.push(Term::App(AppTerm::new(pred, args)));
        self
    }

    /// Append a cut to the body, committing the enclosing invocation to this
    /// rule once the preceding conditions have been proven.
    pub fn cut(mut self) -> Self {
        self.body.push(Term::App(AppTerm::cut()));
        self
    }

    /// Number of binding slots needed for all variables of head and body.
    pub fn var_slots(&self) -> usize {
        self.head
            .var_slots()
            .max(self.body.iter().map(Term::var_slots).max().unwrap_or(0))
    }
}

/// A conjunction of goals to prove against a theory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The conjunctive goals, proven left to right.
    pub goals: Vec<Term>,
    /// Display names of the variables used in this query, if known.
    pub scope: Option<VarScope>,
}

impl Query {
    /// A query consisting of the given goals.
    pub fn new(goals: Vec<Term>, scope: Option<VarScope>) -> Query {
        Query { goals, scope }
    }

    /// A query with a single goal.
    pub fn single_app(pred: Sym, args: Vec<Term>) -> Query {
        Query::new(vec![Term::App(AppTerm::new(pred, args))], None)
    }

    /// Add another goal to this query.
    pub fn and_app(mut self, pred: Sym, args: Vec<Term>) -> Self {
        self.goals.push(Term::App(AppTerm::new(pred, args)));
        self
    }

    /// See [`Term::var_slots`].
    pub fn var_slots(&self) -> usize {
        self.goals.iter().map(Term::var_slots).max().unwrap_or(0)
    }
}

/// Mapping of variable display names to indices inside one scope (a rule or
/// a query).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VarScope {
    names: Vec<Option<String>>,
}

impl VarScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the variable associated with a name, or associate the name with
    /// the next free index.
    pub fn get_or_insert(&mut self, name: &str) -> Var {
        self.names
            .iter()
            .position(|existing| existing.as_deref() == Some(name))
            .map(Var::from_ord)
            .unwrap_or_else(|| {
                let ord = self.names.len();
                self.names.push(Some(name.to_string()));
                Var::from_ord(ord)
            })
    }

    /// Insert a fresh unnamed wildcard variable.
    pub fn insert_wildcard(&mut self) -> Var {
        let ord = self.names.len();
        self.names.push(None);
        Var::from_ord(ord)
    }

    /// The display name of the given variable, if it has one.
    pub fn name(&self, var: Var) -> Option<&str> {
        self.names.get(var.ord()).and_then(|n| n.as_deref())
    }

    /// Number of variables recorded in this scope.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Helper for populating an array with incrementing variable indices.
fn quantify<R, const N: usize>(f: impl FnOnce([Var; N]) -> R) -> R {
    let mut vars = [Var::from_ord(0); N];
    vars.iter_mut()
        .enumerate()
        .for_each(|(i, var)| *var = Var::from_ord(i));
    f(vars)
}

/// Universal quantification for describing the creation of rules; see the
/// example on [`Rule`].
pub fn forall<const N: usize>(f: impl FnOnce([Var; N]) -> Rule) -> Rule {
    quantify(f)
}

/// Existential quantification for describing the creation of queries.
pub fn exists<const N: usize>(f: impl FnOnce([Var; N]) -> Query) -> Query {
    quantify(f)
}
