use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use mazewalker::cells::GridCoordinate;
use mazewalker::generators;
use mazewalker::pathing;
use mazewalker::units::GridSize;

fn bench_distances(c: &mut Criterion) {
    c.bench_function("distances", |b| {
        let g = generators::recursive_backtracker(GridSize(350), &mut rand::weak_rng()).unwrap();
        let start_coord = GridCoordinate::new(250, 250);
        b.iter(|| pathing::Distances::new(&g, start_coord))
    });
}

fn bench_shortest_path(c: &mut Criterion) {
    c.bench_function("shortest_path", |b| {
        let g = generators::recursive_backtracker(GridSize(350), &mut rand::weak_rng()).unwrap();
        let distances = pathing::Distances::new(&g, GridCoordinate::new(0, 0)).unwrap();
        let goal = GridCoordinate::new(349, 349);
        b.iter(|| pathing::shortest_path(&g, &distances, goal))
    });
}

criterion_group!(benches, bench_distances, bench_shortest_path);
criterion_main!(benches);
