//! # The per-query binding context
//!
//! A [`Context`] holds everything that is mutated while proving a query: a
//! term buffer from which goal and rule instances are allocated, the binding
//! slots of all variables minted so far, and the trail used to undo bindings
//! on backtracking.
//!
//! Terms themselves are immutable once allocated; a variable's binding lives
//! only in its context slot. This is what makes term handles freely shareable
//! across backtracking branches: undoing a binding never touches the term
//! cells.
//!
//! The buffer is stack-like: [`Context::checkpoint`] captures the current
//! extent of the buffer, the binding vector and the trail, and
//! [`Context::backtrack`] releases everything allocated or bound since. The
//! resolvers take a checkpoint before every choice point.

use crate::ast::{AppTerm, Sym, Term, Var};
use crate::theory::Signature;

/// Handle of a term allocated in a [`Context`].
///
/// Handles are only meaningful for the context that produced them (or a
/// clone of it). They are invalidated by [`Context::backtrack`] to a
/// checkpoint taken before their allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TermId(usize);

/// The argument positions of an allocated application term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArgSpan {
    first: usize,
    len: usize,
}

impl ArgSpan {
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

/// One allocated term cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cell {
    /// A variable occurrence.
    Var(Var),
    /// An application; the arguments are found through the span.
    App(Sym, ArgSpan),
}

/// Append-only term storage with stack-style release.
///
/// Cells are kept free of pointers by storing application arguments in a
/// separate vector of [`TermId`]s; this keeps cells `Copy` and makes
/// checkpoint/release a pair of truncations.
#[derive(Debug, Clone, Default)]
pub(crate) struct TermBuf {
    cells: Vec<Cell>,
    args: Vec<TermId>,
}

/// Extent of a [`TermBuf`] at checkpoint time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BufMark {
    cells: usize,
    args: usize,
}

impl TermBuf {
    fn push_var(&mut self, v: Var) -> TermId {
        let id = TermId(self.cells.len());
        self.cells.push(Cell::Var(v));
        id
    }

    fn push_app(&mut self, functor: Sym, args: &[TermId]) -> TermId {
        let span = ArgSpan {
            first: self.args.len(),
            len: args.len(),
        };
        self.args.extend_from_slice(args);
        let id = TermId(self.cells.len());
        self.cells.push(Cell::App(functor, span));
        id
    }

    #[inline(always)]
    pub(crate) fn cell(&self, id: TermId) -> Cell {
        self.cells[id.0]
    }

    #[inline(always)]
    pub(crate) fn arg(&self, span: ArgSpan, index: usize) -> TermId {
        debug_assert!(index < span.len);
        self.args[span.first + index]
    }

    /// Allocate a copy of an AST term, offsetting every variable index.
    pub(crate) fn insert_term(&mut self, term: &Term, var_offset: usize) -> TermId {
        match term {
            Term::Var(v) => self.push_var(v.offset(var_offset)),
            Term::App(app) => self.insert_app(app, var_offset),
        }
    }

    pub(crate) fn insert_app(&mut self, app: &AppTerm, var_offset: usize) -> TermId {
        let args: Vec<TermId> = app
            .args
            .iter()
            .map(|arg| self.insert_term(arg, var_offset))
            .collect();
        self.push_app(app.functor, &args)
    }

    /// Copy every cell of a blueprint buffer into this buffer, offsetting
    /// variable indices by `var_offset`.
    ///
    /// Returns a translation from blueprint handles to handles in this
    /// buffer. This is how rule activation mints a fresh copy of a clause:
    /// the blueprint is compiled once, and each activation replays it with a
    /// new variable range.
    pub(crate) fn import(&mut self, blueprint: &TermBuf, var_offset: usize) -> impl Fn(TermId) -> TermId {
        let cell_base = self.cells.len();
        let arg_base = self.args.len();
        self.cells.extend(blueprint.cells.iter().map(|cell| match cell {
            Cell::Var(v) => Cell::Var(v.offset(var_offset)),
            Cell::App(functor, span) => Cell::App(
                *functor,
                ArgSpan {
                    first: span.first + arg_base,
                    len: span.len,
                },
            ),
        }));
        self.args
            .extend(blueprint.args.iter().map(|TermId(id)| TermId(id + cell_base)));
        move |TermId(id)| TermId(id + cell_base)
    }

    pub(crate) fn mark(&self) -> BufMark {
        BufMark {
            cells: self.cells.len(),
            args: self.args.len(),
        }
    }

    /// Release everything allocated after the mark. Marks must be released
    /// in reverse order of creation.
    pub(crate) fn release(&mut self, mark: &BufMark) {
        debug_assert!(mark.cells <= self.cells.len() && mark.args <= self.args.len());
        self.cells.truncate(mark.cells);
        self.args.truncate(mark.args);
    }
}

/// A restore point for [`Context::backtrack`].
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    trail: usize,
    slots: usize,
    terms: BufMark,
}

/// The mutable state of one query: allocated terms, variable bindings and
/// the undo trail.
///
/// A context is created empty, fed the query's goals, and then threaded
/// through the resolver. Cloning a context yields an independent copy of the
/// bindings (used by the tabling engine to isolate suspended consumers);
/// term handles remain valid in the clone.
#[derive(Debug, Clone, Default)]
pub struct Context {
    terms: TermBuf,
    slots: Vec<Option<TermId>>,
    trail: Vec<Var>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `count` fresh unbound variables and return the first one.
    pub(crate) fn allocate_vars(&mut self, count: usize) -> Var {
        let first = self.slots.len();
        self.slots.resize(first + count, None);
        Var::from_ord(first)
    }

    /// Grow the binding vector to hold at least `count` slots.
    fn reserve_vars(&mut self, count: usize) {
        if self.slots.len() < count {
            self.slots.resize(count, None);
        }
    }

    pub(crate) fn import(&mut self, blueprint: &TermBuf, var_offset: usize) -> impl Fn(TermId) -> TermId {
        self.terms.import(blueprint, var_offset)
    }

    /// Allocate an AST term in this context.
    ///
    /// Binding slots for all variables occurring in the term are reserved,
    /// so the term may be used as a goal right away.
    pub fn insert(&mut self, term: &Term) -> TermId {
        self.reserve_vars(term.var_slots());
        self.terms.insert_term(term, 0)
    }

    pub(crate) fn insert_goal(&mut self, app: &AppTerm) -> TermId {
        self.reserve_vars(app.var_slots());
        self.terms.insert_app(app, 0)
    }

    #[inline(always)]
    fn cell(&self, id: TermId) -> Cell {
        self.terms.cell(id)
    }

    #[inline(always)]
    pub(crate) fn arg(&self, span: ArgSpan, index: usize) -> TermId {
        self.terms.arg(span, index)
    }

    /// Bind an unbound variable and record the operation on the trail.
    pub(crate) fn bind(&mut self, var: Var, value: TermId) {
        debug_assert!(self.slots[var.ord()].is_none());
        self.slots[var.ord()] = Some(value);
        self.trail.push(var);
    }

    /// Chase variable bindings until reaching an unbound variable or an
    /// application cell.
    ///
    /// The returned handle refers to the "bottom" of the chain: for an
    /// unbound variable, the innermost variable cell; otherwise the value
    /// cell the chain ends in.
    pub(crate) fn resolve(&self, mut id: TermId) -> (TermId, Cell) {
        loop {
            match self.terms.cell(id) {
                Cell::Var(v) => match self.slots[v.ord()] {
                    Some(value) => id = value,
                    None => return (id, Cell::Var(v)),
                },
                cell @ Cell::App(_, _) => return (id, cell),
            }
        }
    }

    /// The functor/arity signature of a term, if it resolves to an
    /// application.
    pub fn signature_of(&self, id: TermId) -> Option<Signature> {
        match self.resolve(id).1 {
            Cell::App(functor, span) => Some(Signature::new(functor, span.len())),
            Cell::Var(_) => None,
        }
    }

    /// Whether the term resolves to the cut marker `@cut/0`.
    pub(crate) fn is_cut(&self, id: TermId) -> bool {
        self.signature_of(id) == Some(Signature::new(Sym::CUT, 0))
    }

    /// Capture the current extent of terms, bindings and trail.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            trail: self.trail.len(),
            slots: self.slots.len(),
            terms: self.terms.mark(),
        }
    }

    /// Undo every binding and allocation made since the checkpoint.
    pub fn backtrack(&mut self, checkpoint: &Checkpoint) {
        for var in self.trail.drain(checkpoint.trail..) {
            self.slots[var.ord()] = None;
        }
        self.slots.truncate(checkpoint.slots);
        self.terms.release(&checkpoint.terms);
    }

    /// Read back a term with all current bindings applied. Unbound variables
    /// are kept as variables.
    pub fn extract(&self, id: TermId) -> Term {
        match self.resolve(id).1 {
            Cell::Var(v) => Term::Var(v),
            Cell::App(functor, span) => {
                let args = (0..span.len())
                    .map(|i| self.extract(self.terms.arg(span, i)))
                    .collect();
                Term::App(AppTerm::new(functor, args))
            }
        }
    }

    /// Read back a term that must be fully bound.
    ///
    /// # Panics
    ///
    /// Panics if any variable reachable from `id` is unbound; calling this
    /// on a non-ground term is a programming error, not a failed branch.
    pub fn ground(&self, id: TermId) -> Term {
        match self.resolve(id).1 {
            Cell::Var(v) => panic!("cannot ground term: ${} is unbound", v.ord()),
            Cell::App(functor, span) => {
                let args = (0..span.len())
                    .map(|i| self.ground(self.terms.arg(span, i)))
                    .collect();
                Term::App(AppTerm::new(functor, args))
            }
        }
    }

    /// The current binding of a variable, if any, with all bindings applied.
    pub fn binding(&self, var: Var) -> Option<Term> {
        let id = self.slots.get(var.ord()).copied()??;
        Some(self.extract(id))
    }

    /// The current assignment of the first `count` variables, i.e. the
    /// variables of the original query.
    pub fn solution(&self, count: usize) -> Vec<Option<Term>> {
        (0..count)
            .map(|i| self.binding(Var::from_ord(i)))
            .collect()
    }

    /// The canonical call-pattern key of a goal, used by the tabling engine.
    ///
    /// Symbols are rendered by ordinal. Each argument renders as `?` if it
    /// is an unbound variable, as `@` followed by the resolved value if it
    /// is a bound variable, and as the resolved value itself otherwise;
    /// unbound variables nested inside a value render as `?` too. This
    /// distinguishes free from bound argument positions at call time.
    pub fn table_key(&self, goal: TermId) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        match self.resolve(goal).1 {
            Cell::Var(_) => out.push('?'),
            Cell::App(functor, span) => {
                write!(out, "{}", functor.ord()).unwrap();
                if span.len() > 0 {
                    out.push('(');
                    for i in 0..span.len() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.key_arg(&mut out, self.terms.arg(span, i));
                    }
                    out.push(')');
                }
            }
        }
        out
    }

    fn key_arg(&self, out: &mut String, id: TermId) {
        match self.cell(id) {
            Cell::Var(_) => match self.resolve(id).1 {
                Cell::Var(_) => out.push('?'),
                Cell::App(_, _) => {
                    out.push('@');
                    let (bottom, _) = self.resolve(id);
                    self.key_term(out, bottom);
                }
            },
            Cell::App(_, _) => self.key_term(out, id),
        }
    }

    fn key_term(&self, out: &mut String, id: TermId) {
        use std::fmt::Write;
        match self.resolve(id).1 {
            Cell::Var(_) => out.push('?'),
            Cell::App(functor, span) => {
                write!(out, "{}", functor.ord()).unwrap();
                if span.len() > 0 {
                    out.push('(');
                    for i in 0..span.len() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.key_term(out, self.terms.arg(span, i));
                    }
                    out.push(')');
                }
            }
        }
    }
}
