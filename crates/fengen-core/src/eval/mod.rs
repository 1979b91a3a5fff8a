//! 静的評価
//!
//! 駒価値 + 駒位置テーブルを中盤/終盤でテーパーし、
//! ポーン構造項（`PawnHashTable` でキャッシュ）とビショップペアを加える。
//! 戻り値は手番側視点。

pub mod pawn_hash;
mod pst;

use shakmaty::{Chess, Color, Piece, Position};

use crate::types::Value;

pub use pawn_hash::{PawnHashTable, PawnScore};
pub use pst::role_index;
use pst::{pst_index, EG_PST, EG_VALUE, MG_PST, MG_VALUE, PHASE_INC, PHASE_MAX, ROLES};

/// ビショップペアボーナス（中盤, 終盤）
const BISHOP_PAIR: (i32, i32) = (30, 50);

/// 局面を評価する（手番側視点）
pub fn evaluate(pos: &Chess, pawn_hash: &mut PawnHashTable) -> Value {
    let board = pos.board();
    let mut mg = 0i32;
    let mut eg = 0i32;
    let mut phase = 0i32;

    for color in [Color::White, Color::Black] {
        let sign = match color {
            Color::White => 1,
            Color::Black => -1,
        };
        for role in ROLES {
            let r = role_index(role);
            let pieces = board.by_piece(Piece { color, role });
            for sq in pieces {
                let i = pst_index(sq, color);
                mg += sign * (MG_VALUE[r] + MG_PST[r][i]);
                eg += sign * (EG_VALUE[r] + EG_PST[r][i]);
                phase += PHASE_INC[r];
            }
        }
        if board.by_piece(Piece { color, role: shakmaty::Role::Bishop }).count() >= 2 {
            mg += sign * BISHOP_PAIR.0;
            eg += sign * BISHOP_PAIR.1;
        }
    }

    let pawns = pawn_hash.probe(board);
    mg += pawns.mg;
    eg += pawns.eg;

    // 昇格で PHASE_MAX を超えることがある
    let phase = phase.min(PHASE_MAX);
    let score = (mg * phase + eg * (PHASE_MAX - phase)) / PHASE_MAX;

    match pos.turn() {
        Color::White => Value::new(score),
        Color::Black => Value::new(-score),
    }
}

/// 探索用の駒価値（デルタ枝刈り・MVV-LVA）
#[inline]
pub fn piece_value(role: shakmaty::Role) -> i32 {
    const VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];
    VALUES[role_index(role)]
}
