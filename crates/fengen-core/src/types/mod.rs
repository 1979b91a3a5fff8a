//! 基本型

mod bound;
mod value;

pub use bound::Bound;
pub use value::{value_from_tt, value_to_tt, Value};

/// 静止探索の最大 ply（探索スタックの長さ）
pub const MAX_PLY: usize = 128;
