//! TranspositionTable本体
//!
//! - probe/store操作
//! - 世代管理と使用率（hashfull）

use super::entry::{TTData, TTEntry};
use crate::types::{Bound, Value};

/// 置換表
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    /// インデックス用マスク（エントリ数 - 1）
    mask: usize,
    /// 現在の世代
    generation: u8,
}

impl TranspositionTable {
    /// 新しい置換表を作成（サイズはMB単位）
    pub fn new(mb_size: usize) -> Self {
        let count = Self::entry_count(mb_size);
        Self {
            entries: vec![TTEntry::new(); count],
            mask: count - 1,
            generation: 0,
        }
    }

    fn entry_count(mb_size: usize) -> usize {
        let bytes = mb_size.max(1).saturating_mul(1024 * 1024);
        let count = (bytes / std::mem::size_of::<TTEntry>()).max(2);
        // 2のべき乗に切り下げ
        1usize << (usize::BITS - 1 - count.leading_zeros())
    }

    /// 探索開始時に世代を進める
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        // 上位32bitと下位32bitを畳み込んでインデックスにする
        ((key >> 32) ^ key) as usize & self.mask
    }

    /// 置換表を引く
    pub fn probe(&self, key: u64) -> Option<TTData> {
        let entry = &self.entries[self.index(key)];
        if !entry.is_empty() && entry.key == key {
            Some(TTData {
                value: entry.value,
                bound: entry.bound,
            })
        } else {
            None
        }
    }

    /// 値を格納する
    ///
    /// 同一キーの Exact エントリは、同じ世代のうちは境界値で上書きしない。
    pub fn store(&mut self, key: u64, value: Value, bound: Bound) {
        let idx = self.index(key);
        let generation = self.generation;
        let entry = &mut self.entries[idx];

        if entry.key == key
            && entry.bound == Bound::Exact
            && bound != Bound::Exact
            && entry.generation == generation
        {
            return;
        }

        *entry = TTEntry {
            key,
            value,
            bound,
            generation,
        };
    }

    /// 使用率（パーミル）。先頭 1000 エントリのうち現世代のものを数える。
    pub fn hashfull(&self) -> usize {
        self.entries
            .iter()
            .take(1000)
            .filter(|e| !e.is_empty() && e.generation == self.generation)
            .count()
            * 1000
            / self.entries.len().min(1000)
    }
}
