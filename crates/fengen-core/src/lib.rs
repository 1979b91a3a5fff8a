//! fengen-core: チェス局面評価コア
//!
//! 静的評価（駒価値 + 駒位置 + ポーン構造）、ポーン構造ハッシュ、置換表、静止探索を提供する。
//! 教師データ抽出パイプラインからは [`Evaluator`] トレイト越しに使う。

pub mod eval;
mod evaluator;
pub mod search;
pub mod tt;
pub mod types;

pub use evaluator::{parse_fen, CacheStats, Evaluator, FenError};
pub use search::{EvaluatorConfig, SearchWorker};
pub use types::Value;
