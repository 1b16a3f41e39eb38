use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cozy_chess::Board;

use rookbot::board::{CanonicalGrid, Position};
use rookbot::inference::infer;
use rookbot::oracle::LegalityOracle;
use rookbot::search::{SearchParams, Searcher};

fn bench_infer(c: &mut Criterion) {
    let before = Position::startpos();
    let mut after = before.clone();
    let mv = before.parse_uci("g1f3").expect("legal");
    after.push(&mv).expect("legal");
    let (prev, next) = (CanonicalGrid::from_oracle(&before), CanonicalGrid::from_oracle(&after));
    c.bench_function("infer_knight_hop", |b| b.iter(|| infer(black_box(&prev), black_box(&next), &before)));

    let castle_pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("fen");
    let mut castled = castle_pos.clone();
    castled.push(&castle_pos.parse_uci("e1g1").expect("legal")).expect("legal");
    let (prev, next) = (CanonicalGrid::from_oracle(&castle_pos), CanonicalGrid::from_oracle(&castled));
    c.bench_function("infer_castle", |b| b.iter(|| infer(black_box(&prev), black_box(&next), &castle_pos)));
}

fn bench_search(c: &mut Criterion) {
    let b = Board::default();
    c.bench_function("search_depth_3_startpos", |ben| {
        ben.iter(|| {
            let mut s = Searcher::default();
            let p = SearchParams { depth: 3, ..SearchParams::default() };
            let r = s.search_with_params(black_box(&b), p);
            black_box(r.nodes)
        })
    });
}

criterion_group!(benches, bench_infer, bench_search);
criterion_main!(benches);
