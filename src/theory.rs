//! # The rule store
//!
//! A [`Theory`] owns the program: Horn clauses indexed by the
//! functor/arity [`Signature`] of their head. Within one signature, clauses
//! keep their insertion order, which is also the order in which the
//! resolvers try them.
//!
//! Clauses are compiled on insertion into a blueprint form that can be
//! activated cheaply: activation copies the blueprint into the query's
//! [`Context`](crate::context::Context) while offsetting every variable
//! index past the variables allocated so far, which renames the clause
//! apart from everything else in flight.
//!
//! [`Theory::snapshot`] and [`Theory::rollback`] give a truncation-style
//! undo: a snapshot records the clause count per signature, and rolling
//! back discards everything added since. Deletions cannot be restored this
//! way; callers needing full undo must snapshot before modifying.

use std::collections::HashMap;

use crate::ast::{Rule, Sym};
use crate::context::{Context, TermBuf, TermId};

/// The functor/arity pair that indexes clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub functor: Sym,
    pub arity: usize,
}

impl Signature {
    pub fn new(functor: Sym, arity: usize) -> Self {
        Self { functor, arity }
    }
}

/// A clause compiled for fast activation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    source: Rule,
    blueprint: TermBuf,
    head: TermId,
    body: Vec<TermId>,
    var_slots: usize,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Self {
        let mut blueprint = TermBuf::default();
        let head = blueprint.insert_app(&rule.head, 0);
        let body = rule
            .body
            .iter()
            .map(|goal| blueprint.insert_term(goal, 0))
            .collect();
        let var_slots = rule.var_slots();
        CompiledRule {
            source: rule,
            blueprint,
            head,
            body,
            var_slots,
        }
    }

    /// The clause as it was inserted.
    pub fn source(&self) -> &Rule {
        &self.source
    }

    /// Instantiate this clause with fresh variables and unify its head with
    /// the goal.
    ///
    /// On success, returns the handles of the instantiated body goals. On
    /// failure returns `None`; either way the caller is responsible for
    /// backtracking the context to its checkpoint.
    pub(crate) fn activate(&self, ctx: &mut Context, goal: TermId) -> Option<Vec<TermId>> {
        let var_offset = ctx.allocate_vars(self.var_slots).ord();
        let translate = ctx.import(&self.blueprint, var_offset);
        let head = translate(self.head);
        if ctx.unify(goal, head) {
            Some(self.body.iter().map(|goal| translate(*goal)).collect())
        } else {
            None
        }
    }
}

/// A set of Horn clauses indexed by head signature.
#[derive(Debug, Clone, Default)]
pub struct Theory {
    rules: HashMap<Signature, Vec<CompiledRule>>,
}

/// Per-signature clause counts captured by [`Theory::snapshot`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    lengths: HashMap<Signature, usize>,
}

impl Theory {
    /// An empty theory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a theory from an initial set of clauses.
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut theory = Self::new();
        theory.add_rules(rules);
        theory
    }

    /// Append a clause at its head signature.
    pub fn add_rule(&mut self, rule: Rule) {
        let signature = Signature::new(rule.head.functor, rule.head.args.len());
        self.rules
            .entry(signature)
            .or_default()
            .push(CompiledRule::compile(rule));
    }

    /// Append several clauses in order.
    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        for rule in rules {
            self.add_rule(rule);
        }
    }

    /// The clauses whose head matches the signature, in insertion order.
    pub fn rules_for(&self, signature: Signature) -> &[CompiledRule] {
        self.rules
            .get(&signature)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over all clauses. Order is stable within one signature but
    /// unspecified across signatures.
    pub fn iter_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .values()
            .flat_map(|rules| rules.iter().map(CompiledRule::source))
    }

    /// Total number of clauses.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(Vec::is_empty)
    }

    /// Record the current clause count of every signature.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lengths: self
                .rules
                .iter()
                .map(|(signature, rules)| (*signature, rules.len()))
                .collect(),
        }
    }

    /// Discard every clause added since the snapshot was taken.
    ///
    /// Signatures not present in the snapshot are dropped entirely; the
    /// rest are truncated back to their recorded length.
    pub fn rollback(&mut self, snapshot: &Snapshot) {
        self.rules.retain(|signature, rules| {
            match snapshot.lengths.get(signature) {
                Some(&len) => {
                    rules.truncate(len);
                    true
                }
                None => false,
            }
        });
    }
}
