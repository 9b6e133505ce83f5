//! # The backchaining resolver
//!
//! A depth-first, left-to-right proof search for a goal against a
//! [`Theory`], streaming every solution through a callback.
//!
//! For each goal, the clauses at the goal's signature are tried in
//! insertion order. A matching clause is activated (instantiated with fresh
//! variables, head unified with the goal), its body goals are proven left
//! to right, and the callback fires once the last goal of the outermost
//! conjunction has been proven. The callback returns a *continue* flag:
//! returning `false` stops the enumeration promptly, unwinding through
//! every active choice point.
//!
//! The same `false` signal implements cut. Proving the marker `@cut/0`
//! first explores the rest of the conjunction, then unconditionally reports
//! `false`, which cancels the remaining alternatives of every goal to its
//! left in the clause body and the remaining clauses of the invocation that
//! entered the clause. There it is consumed: the clause's caller proceeds
//! normally, which is the standard clause-local cut.
//!
//! This search is efficient for finite search spaces but incomplete:
//! left-recursive programs recurse without bound. The
//! [tabled resolver](crate::table) covers those.

#[cfg(test)]
mod test;

use crate::ast::{AppTerm, Query};
use crate::context::{Context, TermId};
use crate::theory::Theory;

impl Theory {
    /// Prove `goal` and invoke `answer` on every solution.
    ///
    /// The callback receives the context with the solution's bindings
    /// installed; they are undone again when it returns. Returning `false`
    /// from the callback ends the enumeration.
    pub fn infer(
        &self,
        ctx: &mut Context,
        goal: &AppTerm,
        mut answer: impl FnMut(&mut Context) -> bool,
    ) {
        let goal = ctx.insert_goal(goal);
        self.solve(ctx, goal, &mut answer);
    }

    /// Prove all goals of a query in order, invoking `answer` on every
    /// solution of the whole conjunction.
    pub fn query(
        &self,
        ctx: &mut Context,
        query: &Query,
        mut answer: impl FnMut(&mut Context) -> bool,
    ) {
        let goals: Vec<TermId> = query.goals.iter().map(|goal| ctx.insert(goal)).collect();
        self.prove_all(ctx, &goals, 0, &mut answer);
    }

    /// Enumerate every solution of a query into a vector of assignments of
    /// the query's variables.
    pub fn solutions(&self, query: &Query) -> Vec<Vec<Option<crate::ast::Term>>> {
        let vars = query.var_slots();
        let mut ctx = Context::new();
        let mut found = Vec::new();
        self.query(&mut ctx, query, |ctx| {
            found.push(ctx.solution(vars));
            true
        });
        found
    }

    /// Try each clause at the goal's signature in order.
    fn solve(&self, ctx: &mut Context, goal: TermId, answer: &mut dyn FnMut(&mut Context) -> bool) {
        let Some(signature) = ctx.signature_of(goal) else {
            // An unbound goal has no matching clauses.
            return;
        };
        for rule in self.rules_for(signature) {
            let checkpoint = ctx.checkpoint();
            let mut next_rule = true;
            if let Some(body) = rule.activate(ctx, goal) {
                next_rule = self.prove_all(ctx, &body, 0, answer);
            }
            ctx.backtrack(&checkpoint);
            if !next_rule {
                break;
            }
        }
    }

    /// Prove `goals[index..]` left to right, reporting whether enumeration
    /// should continue.
    fn prove_all(
        &self,
        ctx: &mut Context,
        goals: &[TermId],
        index: usize,
        answer: &mut dyn FnMut(&mut Context) -> bool,
    ) -> bool {
        let Some(&goal) = goals.get(index) else {
            return answer(ctx);
        };
        if ctx.is_cut(goal) {
            // Explore the rest of the conjunction, then cancel all
            // alternatives at this level regardless of its outcome.
            self.prove_all(ctx, goals, index + 1, answer);
            return false;
        }
        let mut keep_going = true;
        self.solve(ctx, goal, &mut |ctx| {
            let cont = self.prove_all(ctx, goals, index + 1, answer);
            if !cont {
                keep_going = false;
            }
            cont
        });
        keep_going
    }
}
