//! 局面評価器の契約
//!
//! 教師データ抽出パイプラインが評価器に要求する操作の集合。
//! 実装は 1 レーンに 1 つ所有され、スレッド間で共有されない。

use shakmaty::fen::{Fen, ParseFenError};
use shakmaty::{CastlingMode, Chess};
use thiserror::Error;

use crate::types::Value;

#[derive(Debug, Error)]
pub enum FenError {
    #[error("invalid FEN '{fen}': {source}")]
    Syntax {
        fen: String,
        #[source]
        source: ParseFenError,
    },
    #[error("illegal position '{fen}': {reason}")]
    Illegal { fen: String, reason: String },
}

/// FEN 文字列から局面を構築する
pub fn parse_fen(fen: &str) -> Result<Chess, FenError> {
    let parsed: Fen = fen.parse().map_err(|source| FenError::Syntax {
        fen: fen.to_string(),
        source,
    })?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| FenError::Illegal {
            fen: fen.to_string(),
            reason: e.to_string(),
        })
}

/// 評価器キャッシュの使用状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// 置換表の使用率（パーミル）
    pub tt_hashfull: usize,
    pub pawn_hits: u64,
    pub pawn_misses: u64,
}

/// 局面評価器
///
/// 評価値はすべて手番側視点。
pub trait Evaluator {
    /// FEN から局面を再構築して内部局面に設定する
    fn set_position(&mut self, fen: &str) -> Result<(), FenError>;

    /// 手番側が王手されているか
    fn in_check(&self) -> bool;

    /// 探索用の作業状態（スタック・ノード数）をリセットする
    ///
    /// 冪等で軽量であること。キャッシュ（置換表・ポーンハッシュ）は保持してよい。
    fn clear_for_search(&mut self);

    /// 探索なしの静的評価
    fn static_eval(&mut self) -> Value;

    /// 指定 ply の静的評価スロットに値を設定する
    fn set_static_eval(&mut self, ply: usize, value: Value);

    /// 窓 (alpha, beta) で ply から静止探索する
    fn quiescence(&mut self, alpha: Value, beta: Value, ply: usize) -> Value;

    /// キャッシュの使用状況（キャッシュを持たない評価器は `None`）
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}
