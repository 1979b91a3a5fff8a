//! 教師データ生成ツール群
//!
//! 注釈付き PGN 棋譜から静かな局面を抽出し、学習用サンプル（EPD 行）を出力する。

pub mod common;
pub mod fengen;
pub mod pgn;
