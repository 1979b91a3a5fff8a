//! 置換表モジュール
//!
//! 静止探索の結果をキャッシュする置換表（Transposition Table）。
//!
//! - `TTEntry`: エントリ（64bitキー、値、境界、世代）
//! - `TranspositionTable`: テーブル本体
//! - 世代管理（`new_search` ごとに進める）
//!
//! レーンごとに1つ所有され、スレッド間で共有しないため atomics は使わない。

mod entry;
mod table;

pub use entry::{TTData, TTEntry};
pub use table::TranspositionTable;
