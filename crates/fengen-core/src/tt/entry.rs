//! 置換表エントリ

use crate::types::{Bound, Value};

/// 置換表エントリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub(super) key: u64,
    pub(super) value: Value,
    pub(super) bound: Bound,
    pub(super) generation: u8,
}

impl TTEntry {
    pub const fn new() -> Self {
        Self {
            key: 0,
            value: Value::NONE,
            bound: Bound::None,
            generation: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bound == Bound::None
    }
}

impl Default for TTEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// probe の結果として返すデータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTData {
    /// 格納時の値（`value_from_tt` で ply 補正して使う）
    pub value: Value,
    pub bound: Bound,
}
