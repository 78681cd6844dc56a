use RustedBladeGrid::blade::{PropertyTable, SectionSelectionConfig, discretize, select_sections};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

/// densely sampled 60 m blade with a root flange step and a spar cap ply drop
fn dense_blade(n: usize) -> PropertyTable {
    let radius: Vec<f64> = (0..n).map(|i| 60.0 * i as f64 / (n - 1) as f64).collect();
    let ea = radius
        .iter()
        .map(|r| {
            let flange = if *r < 1.5 { 4.0 } else { 0.0 };
            flange + 3.0 * (-r / 20.0).exp() + 0.1 * (r / 3.0).sin()
        })
        .collect();
    let ejy = radius
        .iter()
        .map(|r| {
            let drop = if *r > 35.0 { -0.6 } else { 0.0 };
            2.0 * (-r / 15.0).exp() + drop
        })
        .collect();
    let dm = radius.iter().map(|r| 0.8 - 0.01 * r + 0.05 * (r / 5.0).cos()).collect();
    PropertyTable::new(radius, vec![("EA", ea), ("EJY", ejy), ("dM", dm)]).unwrap()
}

fn bench_select_sections(c: &mut Criterion) {
    let table = dense_blade(2000);
    let config = SectionSelectionConfig::default()
        .with_err_tol(0.005)
        .with_jump_tol(0.3)
        .with_dr_bounds(0.1, 2.0)
        .with_max_elems(120);
    c.bench_function("select_sections 2000 stations", |b| {
        b.iter(|| select_sections(black_box(&table), None, black_box(&config)))
    });
}

fn bench_discretize(c: &mut Criterion) {
    let table = Arc::new(dense_blade(500));
    let config = SectionSelectionConfig::default().with_max_elems(60);
    c.bench_function("discretize 500 stations", |b| {
        b.iter(|| discretize(black_box(table.clone()), None, black_box(&config)))
    });
}

criterion_group!(benches, bench_select_sections, bench_discretize);
criterion_main!(benches);
