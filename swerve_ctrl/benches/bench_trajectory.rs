//! Benchmarks for path generation and trajectory construction

use criterion::{criterion_group, criterion_main, Criterion};

use swerve_ctrl::maths::{Rotation2, Vector2};
use swerve_ctrl::path::{Path, SplinePathGenerator, Waypoint};
use swerve_ctrl::traj::{
    CentripetalAccelerationConstraint, MaxAccelerationConstraint, MaxVelocityConstraint,
    Trajectory, TrajectoryConstraint,
};

fn waypoints() -> Vec<Waypoint> {
    vec![
        Waypoint::new(Vector2::new(0.0, 0.0), Rotation2::ZERO),
        Waypoint::new(Vector2::new(5.0, 100.0), Rotation2::from_degrees(90.0)),
        Waypoint::new(Vector2::new(-100.0, 80.0), Rotation2::from_degrees(180.0)),
        Waypoint::new(Vector2::new(-80.0, 110.0), Rotation2::from_degrees(45.0)),
        Waypoint::new(Vector2::new(-50.0, 200.0), Rotation2::from_degrees(90.0)),
    ]
}

fn constraints() -> Vec<Box<dyn TrajectoryConstraint>> {
    vec![
        Box::new(MaxVelocityConstraint::new(12.0)),
        Box::new(MaxAccelerationConstraint::new(5.5)),
        Box::new(CentripetalAccelerationConstraint::new(8.0)),
    ]
}

fn generate_path() -> Path {
    SplinePathGenerator::new().generate(&waypoints()).unwrap()
}

fn bench_path_generation(c: &mut Criterion) {
    c.bench_function("generate path", |b| b.iter(generate_path));
}

fn bench_trajectory_construction(c: &mut Criterion) {
    let constraints = constraints();

    c.bench_function("build trajectory", |b| {
        b.iter_with_setup(generate_path, |path| Trajectory::new(path, &constraints))
    });
}

fn bench_trajectory_sampling(c: &mut Criterion) {
    let trajectory = Trajectory::new(generate_path(), &constraints());
    let sample_dt = 0.02;

    c.bench_function("sample trajectory", |b| {
        b.iter(|| {
            let mut time = 0.0;
            while time < trajectory.duration() {
                criterion::black_box(trajectory.calculate_segment(time));
                time += sample_dt;
            }
        })
    });
}

criterion_group!(
    benches,
    bench_path_generation,
    bench_trajectory_construction,
    bench_trajectory_sampling
);
criterion_main!(benches);
