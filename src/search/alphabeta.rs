use cozy_chess::{Board, Move};
use log::debug;
use rayon::prelude::*;
use std::sync::Arc;

use crate::search::eval::{eval_cp, piece_value, DRAW_SCORE, MATE_SCORE};
use crate::search::tt::{Bound, Entry, Tt};

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub depth: u32,
    pub threads: usize,
    pub max_nodes: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self { Self { depth: 3, threads: 1, max_nodes: None } }
}

#[derive(Default, Debug, Clone)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    pub score_cp: i32,
    pub nodes: u64,
}

/// Iterative-deepening negamax with quiescence and a shared transposition table.
pub struct Searcher {
    tt: Arc<Tt>,
    pub(crate) nodes: u64,
    node_limit: u64,
}

impl Default for Searcher {
    fn default() -> Self { Self { tt: Arc::new(Tt::default()), nodes: 0, node_limit: u64::MAX } }
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    board.generate_moves(|ml| {
        moves.extend(ml);
        false
    });
    moves
}

fn is_capture(board: &Board, m: Move) -> bool {
    board.colors(!board.side_to_move()).has(m.to)
}

// Most valuable victim, least valuable attacker.
fn mvv_lva(board: &Board, m: Move) -> i32 {
    let victim = board.piece_on(m.to).map(piece_value).unwrap_or(0);
    let attacker = board.piece_on(m.from).map(piece_value).unwrap_or(0);
    victim * 10 - attacker
}

fn terminal_score(board: &Board, ply: i32) -> i32 {
    if board.checkers().is_empty() { DRAW_SCORE } else { -MATE_SCORE + ply }
}

impl Searcher {
    pub fn search_depth(&mut self, board: &Board, depth: u32) -> SearchResult {
        self.search_with_params(board, SearchParams { depth, ..SearchParams::default() })
    }

    pub fn search_with_params(&mut self, board: &Board, params: SearchParams) -> SearchResult {
        self.nodes = 0;
        self.node_limit = params.max_nodes.unwrap_or(u64::MAX);
        let mut result = SearchResult::default();
        for d in 1..=params.depth.max(1) {
            let r = if params.threads > 1 && d > 1 {
                self.root_parallel(board, d, params.threads)
            } else {
                self.root(board, d)
            };
            // an iteration cut short by the node limit only counts if it still found a move
            if r.bestmove.is_some() || result.bestmove.is_none() {
                result = r;
            }
            debug!("depth {} best {:?} score {} nodes {}", d, result.bestmove, result.score_cp, self.nodes);
            if self.nodes >= self.node_limit {
                break;
            }
        }
        result.nodes = self.nodes;
        result
    }

    fn root(&mut self, board: &Board, depth: u32) -> SearchResult {
        let mut moves = legal_moves(board);
        if moves.is_empty() {
            return SearchResult { bestmove: None, score_cp: terminal_score(board, 0), nodes: self.nodes };
        }
        let tt_move = self.tt.get(board.hash()).and_then(|e| e.best);
        order_moves(board, &mut moves, tt_move);
        let mut alpha = -MATE_SCORE;
        let beta = MATE_SCORE;
        let mut best: Option<(Move, i32)> = None;
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, 1);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((m, score));
            }
            alpha = alpha.max(score);
        }
        self.finish_root(board, depth, best)
    }

    // Every root move gets a full window on its own worker; the table is shared.
    fn root_parallel(&mut self, board: &Board, depth: u32, threads: usize) -> SearchResult {
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(p) => p,
            Err(e) => {
                debug!("falling back to serial root search: {e}");
                return self.root(board, depth);
            }
        };
        let mut moves = legal_moves(board);
        if moves.is_empty() {
            return SearchResult { bestmove: None, score_cp: terminal_score(board, 0), nodes: self.nodes };
        }
        let tt_move = self.tt.get(board.hash()).and_then(|e| e.best);
        order_moves(board, &mut moves, tt_move);
        let tt = self.tt.clone();
        let node_limit = self.node_limit;
        let results: Vec<(Move, i32, u64)> = pool.install(|| {
            moves
                .par_iter()
                .map(|&m| {
                    let mut child = board.clone();
                    child.play(m);
                    let mut w = Searcher { tt: tt.clone(), nodes: 0, node_limit };
                    let score = -w.alphabeta(&child, depth - 1, -MATE_SCORE, MATE_SCORE, 1);
                    (m, score, w.nodes)
                })
                .collect()
        });
        let mut best: Option<(Move, i32)> = None;
        for (m, s, n) in results {
            self.nodes += n;
            if best.map_or(true, |(_, bs)| s > bs) {
                best = Some((m, s));
            }
        }
        self.finish_root(board, depth, best)
    }

    fn finish_root(&mut self, board: &Board, depth: u32, best: Option<(Move, i32)>) -> SearchResult {
        match best {
            Some((m, score)) => {
                self.tt.put(Entry { key: board.hash(), depth, score, best: Some(m), bound: Bound::Exact });
                SearchResult { bestmove: Some(m), score_cp: score, nodes: self.nodes }
            }
            None => SearchResult { bestmove: None, score_cp: terminal_score(board, 0), nodes: self.nodes },
        }
    }

    fn alphabeta(&mut self, board: &Board, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.nodes += 1;
        let mut moves = legal_moves(board);
        if moves.is_empty() {
            return terminal_score(board, ply);
        }
        if board.halfmove_clock() >= 100 {
            return DRAW_SCORE;
        }
        if depth == 0 || self.nodes >= self.node_limit {
            return self.qsearch(board, alpha, beta);
        }

        let key = board.hash();
        let mut tt_move = None;
        if let Some(en) = self.tt.get(key) {
            tt_move = en.best;
            if en.depth >= depth {
                match en.bound {
                    Bound::Exact => return en.score,
                    Bound::Lower if en.score >= beta => return en.score,
                    Bound::Upper if en.score <= alpha => return en.score,
                    _ => {}
                }
            }
        }
        order_moves(board, &mut moves, tt_move);

        let orig_alpha = alpha;
        let mut best = -MATE_SCORE;
        let mut best_move = None;
        for m in moves {
            let mut child = board.clone();
            child.play(m);
            let score = -self.alphabeta(&child, depth - 1, -beta, -alpha, ply + 1);
            if score > best {
                best = score;
                best_move = Some(m);
            }
            if best > alpha {
                alpha = best;
            }
            if alpha >= beta {
                break;
            }
        }
        let bound = if best <= orig_alpha { Bound::Upper } else if best >= beta { Bound::Lower } else { Bound::Exact };
        self.tt.put(Entry { key, depth, score: best, best: best_move, bound });
        best
    }

    fn qsearch(&mut self, board: &Board, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        let stand = eval_cp(board);
        if stand >= beta {
            return beta;
        }
        if stand > alpha {
            alpha = stand;
        }
        let mut caps: Vec<Move> = legal_moves(board).into_iter().filter(|&m| is_capture(board, m)).collect();
        caps.sort_by_key(|&m| -mvv_lva(board, m));
        for m in caps {
            let mut child = board.clone();
            child.play(m);
            let score = -self.qsearch(&child, -beta, -alpha);
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }

    pub fn tt_len(&self) -> usize { self.tt.len() }
}

// TT move first, then captures by MVV-LVA, then quiet moves in generation order.
fn order_moves(board: &Board, moves: &mut [Move], tt_move: Option<Move>) {
    moves.sort_by_key(|&m| {
        if Some(m) == tt_move {
            i32::MIN
        } else if is_capture(board, m) {
            -mvv_lva(board, m) - 10_000
        } else {
            0
        }
    });
}
