use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use early_expand::board::{Board, TileSet};
use early_expand::expand::{
    find_launch_segment, optimize_expansion, PlannerConfig, SegmentRequest,
};
use early_expand::knapsack::{solve_multiple_choice_knapsack, DEFAULT_RUNTIME_THRESHOLD};
use early_expand::search::frontier::DEFAULT_MAX_ITERATIONS;
use early_expand::search::{distance_map, opposite_weight_map};

fn open_board(size: usize, turn: u32, army: i32) -> (Board, usize) {
    let mut board = Board::new(size, size, turn);
    let root = board.index(size / 2, size / 2).unwrap_or(0);
    board.set_general(root, 0, army);
    (board, root)
}

fn bench_knapsack(c: &mut Criterion) {
    let n = 200;
    let items: Vec<usize> = (0..n).collect();
    let weights: Vec<usize> = (0..n).map(|i| 1 + i % 7).collect();
    let values: Vec<i64> = (0..n).map(|i| ((i * 37) % 23) as i64).collect();
    let groups: Vec<usize> = (0..n).map(|i| i / 4).collect();

    c.bench_function("mck_200_items_cap_100", |b| {
        b.iter(|| {
            solve_multiple_choice_knapsack(
                black_box(&items),
                100,
                &weights,
                &values,
                &groups,
                f64::MAX,
            )
        })
    });

    c.bench_function("mck_200_items_cap_50_default_threshold", |b| {
        b.iter(|| {
            solve_multiple_choice_knapsack(
                black_box(&items),
                50,
                &weights,
                &values,
                &groups,
                DEFAULT_RUNTIME_THRESHOLD,
            )
        })
    });
}

fn bench_segment_search(c: &mut Criterion) {
    let (board, root) = open_board(15, 24, 13);
    let distances = distance_map(&board, &[root]);
    let weights = opposite_weight_map(&board, root);
    let owned = TileSet::from_tiles(board.len(), [root]);

    c.bench_function("launch_segment_13_army_open_15x15", |b| {
        b.iter(|| {
            let request = SegmentRequest {
                root,
                army: 13,
                turns_left: 26,
                target_waste: 0,
                owned: &owned,
                skip: None,
                distances: &distances,
                weights: &weights,
                deadline: None,
                max_iterations: DEFAULT_MAX_ITERATIONS,
            };
            find_launch_segment(black_box(&board), &request)
        })
    });
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    let (late, late_root) = open_board(9, 40, 21);
    let late_weights = opposite_weight_map(&late, late_root);
    let config = PlannerConfig::exhaustive();
    group.bench_function("late_cycle_9x9", |b| {
        b.iter(|| optimize_expansion(black_box(&late), late_root, &late_weights, &config))
    });

    let (early, early_root) = open_board(13, 1, 1);
    let early_weights = opposite_weight_map(&early, early_root);
    let timed = PlannerConfig {
        time_limit_ms: Some(100),
        ..PlannerConfig::default()
    };
    group.bench_function("turn_one_13x13_100ms", |b| {
        b.iter(|| optimize_expansion(black_box(&early), early_root, &early_weights, &timed))
    });

    group.finish();
}

criterion_group!(benches, bench_knapsack, bench_segment_search, bench_optimize);
criterion_main!(benches);
