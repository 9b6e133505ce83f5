//! # Unification
//!
//! Unification of two terms under a [`Context`]. Variable-to-variable and
//! variable-to-value bindings are installed in the context and recorded on
//! its trail; on mismatch the branch simply fails.
//!
//! [`Context::unify`] is the raw form used by the resolvers, which bracket
//! it between [`Context::checkpoint`] and [`Context::backtrack`] themselves.
//! [`Context::unify_with`] wraps the same operation in the
//! bind/continue/undo protocol: the continuation runs at most once with the
//! bindings in place, and the context is restored to its pre-call state
//! before the call returns.
//!
//! No occurs check is performed: binding a variable to a term containing
//! that variable is not detected, matching the usual Prolog trade-off.
//! Programs that create such cycles are outside the engine's contract.

use crate::context::{Cell, Context, TermId};

impl Context {
    /// Unify two terms, binding variables as needed.
    ///
    /// Returns `true` if the terms were made equal. On failure, bindings
    /// installed by partially successful sub-unifications are left in
    /// place; the caller is expected to backtrack to its own checkpoint,
    /// which is cheaper than undoing eagerly on every mismatch.
    pub fn unify(&mut self, a: TermId, b: TermId) -> bool {
        let (a_id, a_cell) = self.resolve(a);
        let (b_id, b_cell) = self.resolve(b);

        match (a_cell, b_cell) {
            (Cell::Var(a_var), Cell::Var(b_var)) => {
                // Bind one bottom variable to the other; resolve follows the
                // resulting chain.
                if a_var != b_var {
                    self.bind(b_var, a_id);
                }
                true
            }
            (Cell::Var(a_var), Cell::App(_, _)) => {
                self.bind(a_var, b_id);
                true
            }
            (Cell::App(_, _), Cell::Var(b_var)) => {
                self.bind(b_var, a_id);
                true
            }
            (Cell::App(a_functor, a_args), Cell::App(b_functor, b_args)) => {
                // Functor and arity must agree, then arguments unify left to
                // right.
                if a_functor != b_functor || a_args.len() != b_args.len() {
                    return false;
                }
                (0..a_args.len()).all(|i| {
                    let (x, y) = (self.arg(a_args, i), self.arg(b_args, i));
                    self.unify(x, y)
                })
            }
        }
    }

    /// Unify two terms and run `cont` under the resulting bindings.
    ///
    /// The continuation is invoked at most once, with the most general
    /// unifier installed in the context. Whether or not unification
    /// succeeds, the context is restored to its pre-call state before this
    /// function returns; the continuation's result is passed through, or
    /// `None` if the terms do not unify.
    pub fn unify_with<R>(
        &mut self,
        a: TermId,
        b: TermId,
        cont: impl FnOnce(&mut Context) -> R,
    ) -> Option<R> {
        let checkpoint = self.checkpoint();
        let result = if self.unify(a, b) {
            Some(cont(self))
        } else {
            None
        };
        self.backtrack(&checkpoint);
        result
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::ast::{app, var, AppTerm, Sym, Term, Var};
    use crate::context::Context;

    fn sym(ord: usize) -> Sym {
        Sym::from_ord(ord)
    }

    #[test]
    fn unifies_matching_structure() {
        let mut ctx = Context::new();
        // f(a, $0) ~ f($1, b)
        let left = ctx.insert(&app(sym(1), vec![sym(2).into(), var(Var::from_ord(0))]));
        let right = ctx.insert(&app(sym(1), vec![var(Var::from_ord(1)), sym(3).into()]));
        let solved = ctx.unify_with(left, right, |ctx| {
            (
                ctx.binding(Var::from_ord(0)),
                ctx.binding(Var::from_ord(1)),
            )
        });
        assert_eq!(
            solved,
            Some((Some(Term::from(sym(3))), Some(Term::from(sym(2)))))
        );
        // restored afterwards
        assert_eq!(ctx.binding(Var::from_ord(0)), None);
        assert_eq!(ctx.binding(Var::from_ord(1)), None);
    }

    #[test]
    fn rejects_functor_and_arity_mismatch() {
        let mut ctx = Context::new();
        let f1 = ctx.insert(&app(sym(1), vec![sym(2).into()]));
        let g1 = ctx.insert(&app(sym(4), vec![sym(2).into()]));
        let f2 = ctx.insert(&app(sym(1), vec![sym(2).into(), sym(3).into()]));
        assert_eq!(ctx.unify_with(f1, g1, |_| ()), None);
        assert_eq!(ctx.unify_with(f1, f2, |_| ()), None);
    }

    #[test]
    fn variable_chains_are_chased() {
        let mut ctx = Context::new();
        let v0 = ctx.insert(&var(Var::from_ord(0)));
        let v1 = ctx.insert(&var(Var::from_ord(1)));
        let value = ctx.insert(&Term::from(sym(7)));
        assert!(ctx.unify(v0, v1));
        assert!(ctx.unify(v1, value));
        assert_eq!(ctx.binding(Var::from_ord(0)), Some(Term::from(sym(7))));
        assert_eq!(ctx.binding(Var::from_ord(1)), Some(Term::from(sym(7))));
    }

    #[test]
    fn same_variable_unifies_without_binding() {
        let mut ctx = Context::new();
        let a = ctx.insert(&var(Var::from_ord(0)));
        let b = ctx.insert(&var(Var::from_ord(0)));
        let before = ctx.checkpoint();
        assert!(ctx.unify(a, b));
        ctx.backtrack(&before);
        assert_eq!(ctx.binding(Var::from_ord(0)), None);
    }

    /// Generate random ground-or-not terms over a tiny signature.
    fn arb_term() -> impl Strategy<Value = Term> {
        let leaf = prop_oneof![
            (0usize..4).prop_map(|v| var(Var::from_ord(v))),
            (1usize..5).prop_map(|s| Term::from(sym(s))),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            ((1usize..5), prop::collection::vec(inner, 1..3))
                .prop_map(|(functor, args)| Term::App(AppTerm::new(sym(functor), args)))
        })
    }

    proptest! {
        /// The trail discipline: after a completed unify_with call, the
        /// context is indistinguishable from its pre-call state.
        #[test]
        fn unify_with_restores_context(a in arb_term(), b in arb_term()) {
            let mut ctx = Context::new();
            let a_id = ctx.insert(&a);
            let b_id = ctx.insert(&b);
            let before_bindings: Vec<_> = (0..4)
                .map(|i| ctx.binding(Var::from_ord(i)))
                .collect();
            ctx.unify_with(a_id, b_id, |_| ());
            let after_bindings: Vec<_> = (0..4)
                .map(|i| ctx.binding(Var::from_ord(i)))
                .collect();
            prop_assert_eq!(before_bindings, after_bindings);
            // terms allocated before the call survive untouched
            prop_assert_eq!(ctx.extract(a_id), a);
            prop_assert_eq!(ctx.extract(b_id), b);
        }
    }
}
