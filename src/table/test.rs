use crate::context::Context;
use crate::textual::TextualTheory;

/// Render every solution of a tabled query as the bindings of its
/// variables.
fn tabled_answers(tt: &mut TextualTheory, query: &str) -> Vec<Vec<Option<String>>> {
    let query = tt.prepare_query(query).unwrap();
    let pretty = tt.pretty();
    tt.theory()
        .solutions_tabled(&query)
        .into_iter()
        .map(|solution| {
            solution
                .into_iter()
                .map(|binding| {
                    binding.map(|term| pretty.term_to_string(&term, query.scope.as_ref()))
                })
                .collect()
        })
        .collect()
}

fn untabled_answers(tt: &mut TextualTheory, query: &str) -> Vec<Vec<Option<String>>> {
    let query = tt.prepare_query(query).unwrap();
    let pretty = tt.pretty();
    tt.theory()
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
        .collect()
}

const CYCLE: &str = r"
    e(1, 2).
    e(2, 3).
    e(3, 1).
    path($X, $Y) :- e($X, $Y).
    path($X, $Y) :- path($X, $Z), e($Z, $Y).
";

#[test]
fn left_recursion_terminates() {
    let mut tt = TextualTheory::new();
    tt.load_str(CYCLE).unwrap();

    let mut found: Vec<String> = tabled_answers(&mut tt, "path(1, $Y).")
        .into_iter()
        .map(|mut solution| solution.remove(0).unwrap())
        .collect();
    // every node is reachable from 1, each reported exactly once
    found.sort();
    assert_eq!(found, vec!["1", "2", "3"]);
}

#[test]
fn recursive_clause_first_also_terminates() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        e(1, 2).
        e(2, 3).
        e(3, 1).
        path($X, $Y) :- path($X, $Z), e($Z, $Y).
        path($X, $Y) :- e($X, $Y).
        ",
    )
    .unwrap();

    let mut found: Vec<String> = tabled_answers(&mut tt, "path(1, $Y).")
        .into_iter()
        .map(|mut solution| solution.remove(0).unwrap())
        .collect();
    found.sort();
    assert_eq!(found, vec!["1", "2", "3"]);
}

#[test]
fn agrees_with_untabled_search_on_terminating_programs() {
    let program = r"
        parent(a, b).
        parent(b, c).
        parent(b, d).
        ancestor($X, $Y) :- parent($X, $Y).
        ancestor($X, $Y) :- parent($X, $Z), ancestor($Z, $Y).
    ";
    let mut tt = TextualTheory::new();
    tt.load_str(program).unwrap();

    let mut tabled: Vec<_> = tabled_answers(&mut tt, "ancestor(a, $W).");
    let mut untabled: Vec<_> = untabled_answers(&mut tt, "ancestor(a, $W).");
    tabled.sort();
    untabled.sort();
    untabled.dedup();
    assert_eq!(tabled, untabled);
}

#[test]
fn ground_query_succeeds_once() {
    let mut tt = TextualTheory::new();
    tt.load_str(CYCLE).unwrap();
    assert_eq!(tabled_answers(&mut tt, "path(1, 1)."), vec![Vec::new()]);
    assert_eq!(tabled_answers(&mut tt, "path(1, 4)."), Vec::<Vec<_>>::new());
}

#[test]
fn sibling_subgoals_share_the_memo() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        e(1, 2).
        e(2, 3).
        e(3, 1).
        path($X, $Y) :- e($X, $Y).
        path($X, $Y) :- path($X, $Z), e($Z, $Y).
        pair($Y, $Z) :- path(1, $Y), path(1, $Z).
        ",
    )
    .unwrap();

    let mut found: Vec<(String, String)> = tabled_answers(&mut tt, "pair($Y, $Z).")
        .into_iter()
        .map(|mut solution| {
            let first = solution.remove(0).unwrap();
            let second = solution.remove(0).unwrap();
            (first, second)
        })
        .collect();
    // full cartesian product of reachable nodes, each pair exactly once
    assert_eq!(found.len(), 9);
    found.sort();
    found.dedup();
    assert_eq!(found.len(), 9);
}

#[test]
fn early_termination_stops_tabled_enumeration() {
    let mut tt = TextualTheory::new();
    tt.load_str(CYCLE).unwrap();
    let query = tt.prepare_query("path(1, $Y).").unwrap();
    let vars = query.var_slots();

    let mut ctx = Context::new();
    let mut deliveries = 0;
    tt.theory().query_tabled(&mut ctx, &query, |ctx| {
        assert!(ctx.solution(vars)[0].is_some());
        deliveries += 1;
        false
    });
    assert_eq!(deliveries, 1);
}

#[test]
fn cut_prunes_tabled_alternatives() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        first($X) :- a($X), !.
        a(1).
        a(2).
        ",
    )
    .unwrap();
    assert_eq!(tabled_answers(&mut tt, "first($X)."), vec![vec![Some("1".to_string())]]);
}

#[test]
fn mutual_recursion_through_two_tables() {
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        p($X) :- q($X).
        q($X) :- p($X).
        q(1).
        ",
    )
    .unwrap();
    assert_eq!(tabled_answers(&mut tt, "p($X)."), vec![vec![Some("1".to_string())]]);
}

#[test]
fn duplicate_derivations_are_reported_once() {
    // two clauses derive the same fact through different paths
    let mut tt = TextualTheory::new();
    tt.load_str(
        r"
        e(1, 2).
        d(1, 2).
        link($X, $Y) :- e($X, $Y).
        link($X, $Y) :- d($X, $Y).
        ",
    )
    .unwrap();
    assert_eq!(
        tabled_answers(&mut tt, "link(1, $Y)."),
        vec![vec![Some("2".to_string())]]
    );
}
