//! Enumerate ancestors in a small family tree, once with the plain
//! depth-first resolver and once tabled.

use hornlog::{Context, TextualTheory};

fn main() {
    let mut tt = TextualTheory::from_source(
        r#"
        # facts
        parent(alice, bob).
        parent(bob, carol).
        parent(carol, dave).

        # transitive closure, deliberately left-recursive
        ancestor($X, $Y) :- ancestor($X, $Z), parent($Z, $Y).
        ancestor($X, $Y) :- parent($X, $Y).
        "#,
    )
    .expect("the program parses");

    let query = tt.prepare_query("ancestor(alice, $Who).").unwrap();
    let vars = query.var_slots();
    let pretty = tt.pretty();

    // The left-recursive first clause would send the plain resolver into
    // unbounded recursion; the tabled resolver terminates.
    println!("Descendants of alice:");
    let mut ctx = Context::new();
    tt.theory().query_tabled(&mut ctx, &query, |ctx| {
        for (index, binding) in ctx.solution(vars).into_iter().enumerate() {
            match binding {
                Some(term) => println!(
                    "  ${} = {}",
                    index,
                    pretty.term_to_string(&term, query.scope.as_ref())
                ),
                None => println!("  ${} = <any>", index),
            }
        }
        true
    });
}
