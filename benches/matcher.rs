use criterion::{black_box, criterion_group, criterion_main, Criterion};
use moldrop::core::{find_best_match, parse_graph, Board, EngineConfig, GameEngine, SimpleRng};
use moldrop::types::Cell;

fn dense_board(seed: u32) -> Board {
    let mut rng = SimpleRng::new(seed);
    let mut board = Board::default();
    for y in 4..12 {
        for x in 0..10 {
            let cell = match rng.next_range(4) {
                0 => Cell::Oxygen,
                1 => Cell::Empty,
                _ => Cell::Carbon,
            };
            board.set(x, y, cell);
        }
    }
    board
}

fn bench_match_small(c: &mut Criterion) {
    let board = dense_board(1);
    let graph = parse_graph("CCO");

    c.bench_function("match_ethanol_dense", |b| {
        b.iter(|| find_best_match(black_box(&graph), black_box(&board)))
    });
}

fn bench_match_branched(c: &mut Criterion) {
    let board = dense_board(2);
    let graph = parse_graph("OCC(O)CO");

    c.bench_function("match_glycerol_dense", |b| {
        b.iter(|| find_best_match(black_box(&graph), black_box(&board)))
    });
}

fn bench_no_match(c: &mut Criterion) {
    let board = dense_board(3);
    let graph = parse_graph("CC(C)(C)C(=O)OCC");

    c.bench_function("match_absent_large", |b| {
        b.iter(|| find_best_match(black_box(&graph), black_box(&board)))
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_lactic_acid", |b| {
        b.iter(|| parse_graph(black_box("CC(O)C(=O)O")))
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut engine = GameEngine::new(EngineConfig::default().with_seed(12345)).unwrap();
    engine.start();

    c.bench_function("engine_tick", |b| {
        b.iter(|| {
            if engine.is_running() {
                engine.tick();
            } else if engine.phase() == moldrop::types::EnginePhase::Clearing {
                engine.finish_clear();
            } else {
                engine.reset();
                engine.start();
            }
        })
    });
}

criterion_group!(
    benches,
    bench_match_small,
    bench_match_branched,
    bench_no_match,
    bench_parse,
    bench_tick
);
criterion_main!(benches);
