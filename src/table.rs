//! # Tabled resolution
//!
//! A memoising variant of the resolver that terminates on recursive
//! predicates with finite answer sets and shares sub-goal answers within a
//! query.
//!
//! Every sub-goal is routed through an answer table keyed by the goal's
//! call pattern ([`Context::table_key`]). The first call with a given key
//! becomes the *producer*: it registers an empty table and enumerates the
//! matching clauses, and every solution it finds is grounded and offered to
//! the table before continuing upward. Later calls with the same key become
//! *consumers*: they unify the goal against the answers stored so far and
//! then subscribe a suspension that receives every answer added later.
//!
//! A suspension must not share bindings with the producer that wakes it, so
//! it captures a clone of the [`Context`] taken at subscription time,
//! together with the rest of its proof reified as a continuation chain (the
//! remaining body goals of each enclosing clause activation, the
//! answer-provide step of each enclosing producer, and finally the user
//! callback). Waking a suspension clones that context once more and runs
//! the chain against the new answer, so deliveries are isolated from each
//! other and from the producer.
//!
//! Duplicate answers are detected by the canonical key of the ground answer
//! and are neither stored nor delivered anywhere. This is what bounds the
//! cycles that arise when a suspension's continuation produces into the
//! very table that woke it.
//!
//! Tables live exactly as long as one top-level [`Theory::infer_tabled`]
//! (or [`Theory::query_tabled`]) call.

#[cfg(test)]
mod test;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::ast::{AppTerm, Query, Term};
use crate::context::{Context, TermId};
use crate::theory::Theory;

/// The continuation of a tabled proof, reified so it can outlive the stack
/// frames that created it.
///
/// Term handles stored here are interpreted relative to the context the
/// chain travels with: the live context on the producer's own path, or the
/// suspension's cloned context on a delivery path. Cloning a context keeps
/// all handles valid.
enum Cont {
    /// Hand the solution to the user callback.
    Yield,
    /// Prove `goals[index..]`, then continue with `parent`.
    Goals {
        goals: Rc<[TermId]>,
        index: usize,
        parent: Rc<Cont>,
    },
    /// A clause activation for the producer of `key` has been fully proven:
    /// ground `goal`, offer it to the table, then continue with `parent`.
    Provide {
        key: Rc<str>,
        goal: TermId,
        parent: Rc<Cont>,
    },
}

/// A consumer waiting for further answers of one table.
struct Suspension {
    /// Bindings as they were at subscription time.
    ctx: Context,
    /// The sub-goal to unify against each new answer, valid in `ctx`.
    goal: TermId,
    /// The rest of the consumer's proof.
    cont: Rc<Cont>,
    /// How many table answers have been handed to this suspension.
    delivered: usize,
    /// Cleared when a delivery asks for no more answers.
    active: bool,
}

/// One memo entry: the ground answers derived so far for a call pattern,
/// plus the consumers waiting for more.
#[derive(Default)]
struct Table {
    answers: Vec<Term>,
    answer_keys: HashSet<String>,
    suspensions: Vec<Suspension>,
    /// Set when a continuation above this table's provide step cancelled,
    /// which prunes the producer's remaining clauses.
    pruned: bool,
}

/// All tables of one tabled query.
#[derive(Default)]
struct Tables {
    entries: HashMap<Rc<str>, Table>,
    /// Set when the user callback returned `false`; every loop of the
    /// engine checks it and unwinds promptly.
    halted: bool,
}

impl Tables {
    fn get(&self, key: &str) -> &Table {
        self.entries
            .get(key)
            .expect("invariant: table is registered before it is used")
    }

    fn get_mut(&mut self, key: &str) -> &mut Table {
        self.entries
            .get_mut(key)
            .expect("invariant: table is registered before it is used")
    }
}

/// Canonical rendering of a ground answer, used for duplicate detection.
/// Matches the value rendering of [`Context::table_key`].
fn answer_key(term: &Term) -> String {
    use std::fmt::Write;
    fn render(out: &mut String, term: &Term) {
        match term {
            Term::Var(v) => panic!("cannot key answer: ${} is unbound", v.ord()),
            Term::App(AppTerm { functor, args }) => {
                write!(out, "{}", functor.ord()).unwrap();
                if !args.is_empty() {
                    out.push('(');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        render(out, arg);
                    }
                    out.push(')');
                }
            }
        }
    }
    let mut out = String::new();
    render(&mut out, term);
    out
}

impl Theory {
    /// Prove `goal` with tabled resolution and invoke `answer` on every
    /// distinct solution.
    ///
    /// Behaves like [`Theory::infer`], except that recursive predicates
    /// with finite answer sets terminate, and each table delivers every
    /// ground answer at most once per call site. The memo is private to
    /// this call and discarded when it returns.
    pub fn infer_tabled(
        &self,
        ctx: &mut Context,
        goal: &AppTerm,
        mut answer: impl FnMut(&mut Context) -> bool,
    ) {
        let goal = ctx.insert_goal(goal);
        let mut tables = Tables::default();
        self.solve_tabled(ctx, &mut tables, goal, &Rc::new(Cont::Yield), &mut answer);
    }

    /// Prove all goals of a query with tabled resolution; see
    /// [`Theory::infer_tabled`].
    pub fn query_tabled(
        &self,
        ctx: &mut Context,
        query: &Query,
        mut answer: impl FnMut(&mut Context) -> bool,
    ) {
        let goals: Vec<TermId> = query.goals.iter().map(|goal| ctx.insert(goal)).collect();
        let goals: Rc<[TermId]> = goals.into();
        let mut tables = Tables::default();
        self.prove_all_tabled(
            ctx,
            &mut tables,
            &goals,
            0,
            &Rc::new(Cont::Yield),
            &mut answer,
        );
    }

    /// Enumerate every solution of a tabled query into a vector of
    /// assignments of the query's variables.
    pub fn solutions_tabled(&self, query: &Query) -> Vec<Vec<Option<Term>>> {
        let vars = query.var_slots();
        let mut ctx = Context::new();
        let mut found = Vec::new();
        self.query_tabled(&mut ctx, query, |ctx| {
            found.push(ctx.solution(vars));
            true
        });
        found
    }

    /// Tabled counterpart of the untabled goal-list proof; cut behaves the
    /// same way.
    fn prove_all_tabled(
        &self,
        ctx: &mut Context,
        tables: &mut Tables,
        goals: &Rc<[TermId]>,
        index: usize,
        parent: &Rc<Cont>,
        answer: &mut dyn FnMut(&mut Context) -> bool,
    ) -> bool {
        if tables.halted {
            return false;
        }
        let Some(&goal) = goals.get(index) else {
            return self.run_cont(ctx, tables, parent, answer);
        };
        if ctx.is_cut(goal) {
            self.prove_all_tabled(ctx, tables, goals, index + 1, parent, answer);
            return false;
        }
        let cont = Rc::new(Cont::Goals {
            goals: goals.clone(),
            index: index + 1,
            parent: parent.clone(),
        });
        self.solve_tabled(ctx, tables, goal, &cont, answer)
    }

    /// Execute a reified continuation.
    fn run_cont(
        &self,
        ctx: &mut Context,
        tables: &mut Tables,
        cont: &Rc<Cont>,
        answer: &mut dyn FnMut(&mut Context) -> bool,
    ) -> bool {
        match &**cont {
            Cont::Yield => {
                let keep_going = answer(ctx);
                if !keep_going {
                    tables.halted = true;
                }
                keep_going
            }
            Cont::Goals {
                goals,
                index,
                parent,
            } => self.prove_all_tabled(ctx, tables, goals, *index, parent, answer),
            Cont::Provide { key, goal, parent } => {
                self.provide(ctx, tables, key, *goal, parent, answer)
            }
        }
    }

    /// Solve a single sub-goal through its table.
    ///
    /// Returns `false` when the continuation chain asked to cancel the
    /// caller's enumeration (user halt, or a cut to the right of this
    /// sub-goal in the calling clause); a cut inside this goal's own
    /// clauses is consumed here, like in the untabled resolver.
    fn solve_tabled(
        &self,
        ctx: &mut Context,
        tables: &mut Tables,
        goal: TermId,
        cont: &Rc<Cont>,
        answer: &mut dyn FnMut(&mut Context) -> bool,
    ) -> bool {
        if tables.halted {
            return false;
        }
        let Some(signature) = ctx.signature_of(goal) else {
            // An unbound goal has no matching clauses and no table.
            return true;
        };
        let key: Rc<str> = ctx.table_key(goal).into();

        if tables.entries.contains_key(&key) {
            // Consumer: replay the answers stored so far. The loop re-reads
            // the length every round because a continuation may grow the
            // table while we are still replaying it.
            let mut index = 0;
            loop {
                let answer_term = {
                    let table = tables.get(&key);
                    if index >= table.answers.len() {
                        break;
                    }
                    table.answers[index].clone()
                };
                index += 1;
                let checkpoint = ctx.checkpoint();
                let answer_id = ctx.insert(&answer_term);
                let mut keep_going = true;
                if ctx.unify(goal, answer_id) {
                    keep_going = self.run_cont(ctx, tables, cont, answer);
                }
                ctx.backtrack(&checkpoint);
                if !keep_going {
                    // Cancelled; no point subscribing for more answers.
                    return false;
                }
            }
            // Historical answers done; subscribe for future ones under an
            // isolated copy of the bindings.
            tables.get_mut(&key).suspensions.push(Suspension {
                ctx: ctx.clone(),
                goal,
                cont: cont.clone(),
                delivered: index,
                active: true,
            });
            true
        } else {
            // Producer: register the table first so that recursive calls
            // with the same pattern become consumers instead of looping.
            tables.entries.insert(key.clone(), Table::default());
            let provide = Rc::new(Cont::Provide {
                key: key.clone(),
                goal,
                parent: cont.clone(),
            });
            for rule in self.rules_for(signature) {
                if tables.halted {
                    break;
                }
                let checkpoint = ctx.checkpoint();
                let mut next_rule = true;
                if let Some(body) = rule.activate(ctx, goal) {
                    let body: Rc<[TermId]> = body.into();
                    next_rule = self.prove_all_tabled(ctx, tables, &body, 0, &provide, answer);
                }
                ctx.backtrack(&checkpoint);
                if !next_rule {
                    break;
                }
            }
            !(tables.halted || tables.get(&key).pruned)
        }
    }

    /// Offer a fully proven clause head to its table, fan the answer out to
    /// the waiting suspensions, then continue the producer's own proof.
    fn provide(
        &self,
        ctx: &mut Context,
        tables: &mut Tables,
        key: &Rc<str>,
        goal: TermId,
        parent: &Rc<Cont>,
        answer: &mut dyn FnMut(&mut Context) -> bool,
    ) -> bool {
        let answer_term = ctx.ground(goal);
        let new = {
            let table = tables.get_mut(key);
            if table.answer_keys.insert(answer_key(&answer_term)) {
                table.answers.push(answer_term);
                true
            } else {
                false
            }
        };
        if !new {
            // Duplicate answer: ignored, keep searching.
            return true;
        }
        if !self.fan_out(tables, key, answer) {
            return false;
        }
        let keep_going = self.run_cont(ctx, tables, parent, answer);
        if !keep_going {
            tables.get_mut(key).pruned = true;
        }
        keep_going
    }

    /// Deliver pending answers to every active suspension of a table.
    ///
    /// Deliveries are made in subscription order, and each suspension sees
    /// answers in insertion order. A delivery may itself add answers and
    /// suspensions (to this or other tables); the cursor bookkeeping makes
    /// the loop converge once everything pending has been delivered.
    fn fan_out(
        &self,
        tables: &mut Tables,
        key: &Rc<str>,
        answer: &mut dyn FnMut(&mut Context) -> bool,
    ) -> bool {
        loop {
            let pending = {
                let table = tables.get_mut(key);
                let total = table.answers.len();
                let mut found = None;
                for (index, suspension) in table.suspensions.iter_mut().enumerate() {
                    if suspension.active && suspension.delivered < total {
                        let cursor = suspension.delivered;
                        suspension.delivered += 1;
                        found = Some((
                            index,
                            cursor,
                            suspension.ctx.clone(),
                            suspension.goal,
                            suspension.cont.clone(),
                        ));
                        break;
                    }
                }
                found
            };
            let Some((index, cursor, mut delivery_ctx, goal, cont)) = pending else {
                return true;
            };
            let answer_term = tables.get(key).answers[cursor].clone();
            let answer_id = delivery_ctx.insert(&answer_term);
            let mut live = true;
            if delivery_ctx.unify(goal, answer_id) {
                live = self.run_cont(&mut delivery_ctx, tables, &cont, answer);
            }
            if !live {
                tables.get_mut(key).suspensions[index].active = false;
                if tables.halted {
                    return false;
                }
            }
        }
    }
}
