//! 静止探索 (Quiescence Search)
//!
//! 駒取り・成りだけを延長し、局面が安定するまで探索を続ける。
//! 王手されている局面では全合法手（回避手）を生成する。

use shakmaty::{Chess, Move, Position};

use super::SearchWorker;
use crate::eval::{evaluate, piece_value};
use crate::types::{value_from_tt, value_to_tt, Bound, Value, MAX_PLY};

/// デルタ枝刈りのマージン
const DELTA_MARGIN: i32 = 200;

/// MVV-LVA による並べ替えキー（大きいほど先に読む）
fn capture_order(mv: &Move) -> i32 {
    let victim = mv.capture().map_or(0, piece_value);
    let promotion = mv.promotion().map_or(0, piece_value);
    victim * 16 + promotion - piece_value(mv.role()) / 10
}

/// 静止探索（fail-soft）
pub(super) fn qsearch(
    w: &mut SearchWorker,
    pos: &Chess,
    mut alpha: Value,
    beta: Value,
    ply: usize,
) -> Value {
    w.nodes += 1;
    let in_check = pos.is_check();

    if ply >= MAX_PLY {
        return if in_check {
            Value::ZERO
        } else {
            evaluate(pos, &mut w.pawn_hash)
        };
    }

    let key = SearchWorker::key(pos);
    if let Some(tt_data) = w.tt.probe(key) {
        let tt_value = value_from_tt(tt_data.value, ply);
        if tt_data.bound.can_cutoff(tt_value, alpha, beta) {
            return tt_value;
        }
    }

    let alpha_orig = alpha;
    let mut moves = pos.legal_moves();
    let mut best;
    let stand_pat;

    if in_check {
        if moves.is_empty() {
            return Value::mated_in(ply);
        }
        stand_pat = Value::NONE;
        best = -Value::INFINITE;
    } else {
        // ply 0 は呼び出し側が設定した静的評価を使う
        stand_pat = match w.stack[ply].static_eval {
            v if v == Value::NONE => {
                let v = evaluate(pos, &mut w.pawn_hash);
                w.stack[ply].static_eval = v;
                v
            }
            v => v,
        };

        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        best = stand_pat;
        moves.retain(|m| m.is_capture() || m.is_promotion());
    }

    moves.sort_unstable_by_key(|m| -capture_order(m));

    for mv in moves.iter() {
        if !in_check && mv.promotion().is_none() {
            let gain = mv.capture().map_or(0, piece_value);
            if stand_pat + (gain + DELTA_MARGIN) <= alpha {
                continue;
            }
        }

        let mut child = pos.clone();
        child.play_unchecked(mv);
        w.stack[ply + 1].static_eval = Value::NONE;

        let value = -qsearch(w, &child, -beta, -alpha, ply + 1);

        if value > best {
            best = value;
            if value > alpha {
                alpha = value;
                if value >= beta {
                    break;
                }
            }
        }
    }

    let bound = if best >= beta {
        Bound::Lower
    } else if best > alpha_orig {
        Bound::Exact
    } else {
        Bound::Upper
    };
    w.tt.store(key, value_to_tt(best, ply), bound);

    best
}
