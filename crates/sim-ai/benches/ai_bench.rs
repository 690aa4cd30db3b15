use catalog::Catalog;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_core::{Rival, Style};

fn build_rivals(n: usize) -> Vec<Rival> {
    (0..n)
        .map(|i| {
            let style = Style::ALL[i % Style::ALL.len()];
            Rival::project_maker(format!("R{i}"), style, 60_000 + (i as i64 % 50) * 5_000)
        })
        .collect()
}

fn bench_plan(c: &mut Criterion) {
    let catalog = Catalog::default();
    let rivals = build_rivals(1_000);
    c.bench_function("plan 1000 rivals", |b| {
        b.iter(|| {
            for r in &rivals {
                black_box(sim_ai::plan_project(r, &catalog));
            }
        })
    });
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
