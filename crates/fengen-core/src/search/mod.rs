//! 探索モジュール
//!
//! `SearchWorker` は 1 レーンが専有する評価器インスタンス。
//! 置換表・ポーンハッシュ・探索スタックを所有し、[`Evaluator`] を実装する。

mod qsearch;

use log::debug;
use serde::{Deserialize, Serialize};
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, EnPassantMode, Position};

use crate::eval::{evaluate, PawnHashTable};
use crate::evaluator::{parse_fen, CacheStats, Evaluator, FenError};
use crate::tt::TranspositionTable;
use crate::types::{Value, MAX_PLY};

/// 評価器のキャッシュサイズ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// 置換表サイズ（MiB）
    pub tt_mb: usize,
    /// ポーン構造ハッシュサイズ（MiB）
    pub pawn_hash_mb: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            tt_mb: 1,
            pawn_hash_mb: 2,
        }
    }
}

/// 探索スタックの 1 ply 分
#[derive(Debug, Clone, Copy)]
struct StackEntry {
    /// この ply の静的評価（未設定なら `Value::NONE`）
    static_eval: Value,
}

impl Default for StackEntry {
    fn default() -> Self {
        Self {
            static_eval: Value::NONE,
        }
    }
}

/// レーン専有の評価器
pub struct SearchWorker {
    pos: Chess,
    tt: TranspositionTable,
    pawn_hash: PawnHashTable,
    stack: Vec<StackEntry>,
    /// 直近の探索で訪れたノード数
    nodes: u64,
}

impl SearchWorker {
    pub fn new(config: &EvaluatorConfig) -> Self {
        let tt = TranspositionTable::new(config.tt_mb);
        let pawn_hash = PawnHashTable::new(config.pawn_hash_mb);
        debug!(
            "evaluator caches: tt {} entries, pawn hash {} entries",
            tt.len(),
            pawn_hash.len()
        );
        Self {
            pos: Chess::default(),
            tt,
            pawn_hash,
            stack: vec![StackEntry::default(); MAX_PLY + 1],
            nodes: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    #[inline]
    fn key(pos: &Chess) -> u64 {
        let hash: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
        hash.0
    }
}

impl Evaluator for SearchWorker {
    fn set_position(&mut self, fen: &str) -> Result<(), FenError> {
        self.pos = parse_fen(fen)?;
        Ok(())
    }

    fn in_check(&self) -> bool {
        self.pos.is_check()
    }

    fn clear_for_search(&mut self) {
        self.stack.fill(StackEntry::default());
        self.nodes = 0;
        self.tt.new_search();
    }

    fn static_eval(&mut self) -> Value {
        evaluate(&self.pos, &mut self.pawn_hash)
    }

    fn set_static_eval(&mut self, ply: usize, value: Value) {
        if let Some(entry) = self.stack.get_mut(ply) {
            entry.static_eval = value;
        }
    }

    fn quiescence(&mut self, alpha: Value, beta: Value, ply: usize) -> Value {
        let pos = self.pos.clone();
        qsearch::qsearch(self, &pos, alpha, beta, ply)
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        let (pawn_hits, pawn_misses) = self.pawn_hash.stats();
        Some(CacheStats {
            tt_hashfull: self.tt.hashfull(),
            pawn_hits,
            pawn_misses,
        })
    }
}
