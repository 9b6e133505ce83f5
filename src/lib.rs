//! # A Horn-clause inference engine
//!
//! Hornlog is an embeddable resolution engine for Horn clauses over
//! first-order terms. Given a [`Theory`] (a set of facts and rules) and a
//! goal, it enumerates every proof by SLD resolution with unification,
//! streaming the solutions through a callback. It supports the cut operator
//! and an optional tabled resolution mode that terminates on recursive
//! predicates by memoising sub-goal answers.
//!
//! The [`Theory`] identifies functors by interned [`ast::Sym`] IDs; for a
//! Prolog-like textual interface on top of it, see the [`textual`] module.
//!
//! # Example
//!
//! Let's define addition over Peano numerals. In Prolog syntax:
//!
//! ```prolog
//! add(P, z, P).
//! add(P, s(Q), s(R)) :- add(P, Q, R).
//! ```
//!
//! Encoded with the [`ast`] builders, we can ask which `X` satisfies
//! `X + 2 = 3`:
//!
//! ```
//! use hornlog::ast::{self, exists, forall, Query, Rule};
//! use hornlog::{SymbolStore, Theory};
//!
//! let mut syms = SymbolStore::new();
//! let s = syms.get_or_insert_named("s");
//! let z = syms.get_or_insert_named("z");
//! let add = syms.get_or_insert_named("add");
//!
//! let mut theory = Theory::new();
//! // add(P, z, P).
//! theory.add_rule(forall(|[p]| Rule::fact(add, vec![p.into(), z.into(), p.into()])));
//! // add(P, s(Q), s(R)) :- add(P, Q, R).
//! theory.add_rule(forall(|[p, q, r]| {
//!     Rule::fact(
//!         add,
//!         vec![
//!             p.into(),
//!             ast::app(s, vec![q.into()]),
//!             ast::app(s, vec![r.into()]),
//!         ],
//!     )
//!     .when(add, vec![p.into(), q.into(), r.into()])
//! }));
//!
//! // add($0, s(s(z)), s(s(s(z)))), i.e. $0 + 2 = 3
//! let two = ast::app(s, vec![ast::app(s, vec![z.into()])]);
//! let three = ast::app(s, vec![two.clone()]);
//! let query = exists(|[x]| Query::single_app(add, vec![x.into(), two.clone(), three.clone()]));
//!
//! let solutions = theory.solutions(&query);
//! assert_eq!(solutions, vec![vec![Some(ast::app(s, vec![z.into()]))]]);
//! ```
//!
//! The search proceeds depth-first, trying clauses in insertion order and
//! proving body goals left to right. Solutions arrive through callbacks
//! returning a *continue* flag, so a caller can stop after any answer; see
//! [`Theory::infer`] and [`Theory::query`].
//!
//! Plain depth-first search loops forever on left-recursive predicates. The
//! tabled entry points [`Theory::infer_tabled`] and [`Theory::query_tabled`]
//! memoise answers per call pattern instead and terminate whenever the
//! answer set is finite; see the [`table`] module.

pub mod ast;
pub mod context;
pub mod resolve;
pub mod symbols;
pub mod table;
pub mod textual;
pub mod theory;
pub mod unify;

pub use context::Context;
pub use symbols::SymbolStore;
pub use textual::TextualTheory;
pub use theory::{Signature, Snapshot, Theory};
