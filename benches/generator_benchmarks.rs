use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipegen_rust::{generate, parse_description, GeneratorConfig};

fn superscalar_description() -> String {
    // A superscalar-ish machine: two decoders, three pipes, a slow divider.
    let mut text = String::from(
        "unit d0, d1\n\
         unit alu0, alu1, mem, div\n",
    );
    text.push_str("insn add0 1 = d0, alu0\n");
    text.push_str("insn add1 1 = d1, alu1\n");
    text.push_str("insn load 3 = d0, mem, mem\n");
    text.push_str("insn store 1 = d1, mem\n");
    text.push_str("insn idiv 20 = d0, div * 8\n");
    text.push_str("bypass 1 load add0\n");
    text.push_str("bypass 1 load add1\n");
    text
}

fn generation_benchmark(c: &mut Criterion) {
    let text = superscalar_description();
    let decls = parse_description(&text).unwrap();
    let config = GeneratorConfig::new().with_progress(false);

    c.bench_function("deterministic_generation", |b| {
        b.iter(|| {
            let generation = generate(black_box(&decls), &config).unwrap();
            black_box(generation.dfa.generated().automata.len())
        })
    });
}

fn ndfa_generation_benchmark(c: &mut Criterion) {
    let mut text = superscalar_description();
    text.push_str("insn flexible 1 = alu0 | alu1 | mem\n");
    let decls = parse_description(&text).unwrap();
    let config = GeneratorConfig::new().with_ndfa(true).with_progress(false);

    c.bench_function("ndfa_generation", |b| {
        b.iter(|| {
            let generation = generate(black_box(&decls), &config).unwrap();
            black_box(generation.dfa.generated().automata.len())
        })
    });
}

fn query_benchmark(c: &mut Criterion) {
    let text = superscalar_description();
    let decls = parse_description(&text).unwrap();
    let config = GeneratorConfig::new().with_progress(false);
    let generation = generate(&decls, &config).unwrap();
    let dfa = &generation.dfa;

    c.bench_function("state_transition_queries", |b| {
        b.iter(|| {
            let mut state = dfa.new_state();
            for insn in 0..5usize {
                black_box(dfa.state_transition(&mut state, black_box(insn)));
                dfa.advance_cycle(&mut state);
            }
        })
    });
}

criterion_group!(
    benches,
    generation_benchmark,
    ndfa_generation_benchmark,
    query_benchmark
);
criterion_main!(benches);
