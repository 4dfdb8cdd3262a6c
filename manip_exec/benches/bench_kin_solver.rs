//! # Geometric Solver Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use manip_lib::{
    kin_model::Pose,
    kin_solver::{GeomSolver, Params},
    manip_ctrl::build_chain,
};

fn kin_solver_benchmark(c: &mut Criterion) {
    // ---- Build the solver over the production chain ----

    let params = Params {
        base_radius_m: 0.1705,
        platform_radius_m: 0.045,
        proximal_link_m: 0.120,
        distal_link_m: 0.098,
        act_min_pos_rad: -1.8,
        act_max_pos_rad: 1.8,
    };

    let model = build_chain().unwrap();
    let solver = GeomSolver::new(params, &model).unwrap();

    // A target well inside the workspace, representative of trajectory
    // samples during normal running
    let target = Pose::from_position(0.03, 0.02, 0.0);
    let config = solver.inverse(&target).unwrap();

    c.bench_function("GeomSolver::inverse", |b| {
        b.iter(|| solver.inverse(&target).unwrap())
    });

    c.bench_function("GeomSolver::forward", |b| {
        b.iter(|| solver.forward(&config.act_pos_rad).unwrap())
    });
}

criterion_group!(benches, kin_solver_benchmark);
criterion_main!(benches);
