use crate::ast::{exists, forall, Query, Rule};
use crate::context::Context;
use crate::symbols::SymbolStore;
use crate::textual::TextualTheory;
use crate::theory::Theory;

#[track_caller]
fn assert_solutions(tt: &mut TextualTheory, query: &str, expected: &[&[Option<&str>]]) {
    let query = tt.prepare_query(query).unwrap();
    let pretty = tt.pretty();
    let found: Vec<Vec<Option<String>>> = tt
        .theory()
        .solutions(&query)
        .into_iter()
        .map(|solution| {
            solution
                .into_iter()
                .map(|binding| {
                    binding.map(|term| pretty.term_to_string(&term, query.scope.as_ref()))
                })
                .collect()
        })
        .collect();
    let expected: Vec<Vec<Option<String>>> = expected
        .iter()
        .map(|solution| {
            solution
                .iter()
                .map(|binding| binding.map(str::to_string))
                .collect()
        })
        .collect();
    assert_eq!(found, expected);
}

#[test]
fn ground_fact_lookup() {
    let mut tt = TextualTheory::new();
    tt.load_str("parent(alice, bob).").unwrap();
    assert_solutions(&mut tt, "parent(alice, $X).", &[&[Some("bob")]]);
    assert_solutions(&mut tt, "parent(alice, bob).", &[&[]]);
    assert_solutions(&mut tt, "parent(bob, $X).", &[]);
}

#[test]
fn transitive_closure() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        parent(a, b).
        parent(b, c).
        ancestor($X, $Y) :- parent($X, $Y).
        ancestor($X, $Y) :- parent($X, $Z), ancestor($Z, $Y).
        ",
    )
    .unwrap();
    // depth-first, rules in insertion order
    assert_solutions(&mut tt, "ancestor(a, $W).", &[&[Some("b")], &[Some("c")]]);
    assert_solutions(&mut tt, "ancestor($W, c).", &[&[Some("b")], &[Some("a")]]);
}

#[test]
fn cut_commits_to_first_answer() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        first($X) :- a($X), !.
        a(1).
        a(2).
        ",
    )
    .unwrap();
    assert_solutions(&mut tt, "first($X).", &[&[Some("1")]]);
}

#[test]
fn cut_prunes_caller_alternatives() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        p :- q, !.
        p :- r.
        q.
        r.
        ",
    )
    .unwrap();
    // only the first clause of p succeeds; the second is never tried
    assert_solutions(&mut tt, "p.", &[&[]]);
}

#[test]
fn cut_is_clause_local() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        foo(hello).
        foo(world).
        world_or_baz(world).
        world_or_baz(baz).
        bar($X) :- foo($X), !.
        bar(baz).
        ",
    )
    .unwrap();
    assert_solutions(&mut tt, "bar($X).", &[&[Some("hello")]]);
    assert_solutions(&mut tt, "bar(baz).", &[&[]]);
    // the cut inside bar does not prune the caller's alternatives
    assert_solutions(
        &mut tt,
        "world_or_baz($X), bar($X).",
        &[&[Some("world")], &[Some("baz")]],
    );
}

#[test]
fn cut_at_query_level() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        foo(hello).
        foo(world).
        ",
    )
    .unwrap();
    assert_solutions(&mut tt, "foo($X), !.", &[&[Some("hello")]]);
}

#[test]
fn early_termination_stops_enumeration() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        parent(a, b).
        parent(b, c).
        ancestor($X, $Y) :- parent($X, $Y).
        ancestor($X, $Y) :- parent($X, $Z), ancestor($Z, $Y).
        ",
    )
    .unwrap();
    let query = tt.prepare_query("ancestor(a, $W).").unwrap();
    let vars = query.var_slots();

    let mut ctx = Context::new();
    let mut answers = Vec::new();
    tt.theory().query(&mut ctx, &query, |ctx| {
        answers.push(ctx.solution(vars));
        false
    });

    let pretty = tt.pretty();
    let rendered: Vec<_> = answers
        .iter()
        .map(|solution| {
            pretty.term_to_string(solution[0].as_ref().unwrap(), query.scope.as_ref())
        })
        .collect();
    assert_eq!(rendered, vec!["b"]);
}

#[test]
fn genealogy_with_programmatic_api() {
    let mut syms = SymbolStore::new();
    let mut theory = Theory::new();

    let alice = syms.get_or_insert_named("alice");
    let bob = syms.get_or_insert_named("bob");
    let carol = syms.get_or_insert_named("carol");
    let parent = syms.get_or_insert_named("parent");
    let grandparent = syms.get_or_insert_named("grandparent");

    theory.add_rule(Rule::fact(parent, vec![alice.into(), bob.into()]));
    theory.add_rule(Rule::fact(parent, vec![bob.into(), carol.into()]));
    theory.add_rule(forall(|[x, y, z]| {
        Rule::fact(grandparent, vec![x.into(), y.into()])
            .when(parent, vec![x.into(), z.into()])
            .when(parent, vec![z.into(), y.into()])
    }));

    let solutions = theory.solutions(&exists(|[x]| {
        Query::single_app(grandparent, vec![alice.into(), x.into()])
    }));
    assert_eq!(solutions, vec![vec![Some(carol.into())]]);
}

#[test]
fn infer_streams_answers_and_restores_the_context() {
    use crate::ast::{AppTerm, Var};

    let mut syms = SymbolStore::new();
    let mut theory = Theory::new();
    let a = syms.get_or_insert_named("a");
    let b = syms.get_or_insert_named("b");
    let parent = syms.get_or_insert_named("parent");
    theory.add_rule(Rule::fact(parent, vec![a.into(), b.into()]));

    let mut ctx = Context::new();
    let goal = AppTerm::new(parent, vec![a.into(), Var::from_ord(0).into()]);
    let mut seen = Vec::new();
    theory.infer(&mut ctx, &goal, |ctx| {
        seen.push(ctx.binding(Var::from_ord(0)));
        true
    });
    assert_eq!(seen, vec![Some(b.into())]);
    // all bindings are undone once inference returns
    assert_eq!(ctx.binding(Var::from_ord(0)), None);
}

#[test]
fn unbound_goal_has_no_solutions() {
    let mut tt = TextualTheory::new();
    tt.load_str("p(a).").unwrap();
    // a bare variable goal matches no clauses
    assert_solutions(&mut tt, "p($X), $Y.", &[]);
}
