use criterion::{criterion_group, criterion_main, Criterion};
use hornlog::TextualTheory;

macro_rules! sanity_check {
    ($computation:expr,$result:expr) => {{
        let r = $computation;
        assert_eq!(r, $result);
        r
    }};
}

/// A linear ancestry chain of `len` generations.
fn prepare_chain(len: usize) -> TextualTheory {
    let mut program = String::new();
    for i in 0..len {
        program.push_str(&format!("parent(n{}, n{}).\n", i, i + 1));
    }
    program.push_str("ancestor($X, $Y) :- parent($X, $Y).\n");
    program.push_str("ancestor($X, $Y) :- parent($X, $Z), ancestor($Z, $Y).\n");
    TextualTheory::from_source(&program).unwrap()
}

fn ancestor_chain(tt: &mut TextualTheory, len: usize) -> usize {
    let query = tt.prepare_query("ancestor(n0, $X).").unwrap();
    sanity_check!(tt.theory().solutions(&query).len(), len)
}

/// A ring of `len` edges; reachability over it only terminates tabled.
fn prepare_ring(len: usize) -> TextualTheory {
    let mut program = String::new();
    for i in 0..len {
        program.push_str(&format!("e(n{}, n{}).\n", i, (i + 1) % len));
    }
    program.push_str("path($X, $Y) :- e($X, $Y).\n");
    program.push_str("path($X, $Y) :- path($X, $Z), e($Z, $Y).\n");
    TextualTheory::from_source(&program).unwrap()
}

fn tabled_reachability(tt: &mut TextualTheory, len: usize) -> usize {
    let query = tt.prepare_query("path(n0, $X).").unwrap();
    sanity_check!(tt.theory().solutions_tabled(&query).len(), len)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut chain = prepare_chain(64);
    let mut ring = prepare_ring(64);

    c.bench_function("ancestor chain", |b| {
        b.iter(|| ancestor_chain(&mut chain, 64))
    });
    c.bench_function("tabled ring reachability", |b| {
        b.iter(|| tabled_reachability(&mut ring, 64))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
