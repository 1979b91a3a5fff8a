//! 評価値（Value）
//!
//! 値のスケールはセンチポーン。`Value::MATE` 付近を詰みスコアとして予約している。
//! 通常の評価値は主に [-MATE_IN_MAX_PLY, MATE_IN_MAX_PLY] の範囲で用いる。

use std::fmt;
use std::ops::{Add, Neg, Sub};

use super::MAX_PLY;

/// 評価値
///
/// 静的評価・静止探索の結果と、詰み表現（`mate_in` / `mated_in` 系）を同一の整数スケールで扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Value(i32);

impl Value {
    /// ゼロ
    pub const ZERO: Value = Value(0);
    /// 詰み（勝ち側の最大スコア）
    pub const MATE: Value = Value(32000);
    /// 無限大
    pub const INFINITE: Value = Value(32001);
    /// 無効値（スタックの静的評価スロットが未設定であることを表す）
    pub const NONE: Value = Value(32002);

    /// 最大探索深度内での詰みスコア
    pub const MATE_IN_MAX_PLY: Value = Value(Self::MATE.0 - MAX_PLY as i32);
    /// 最大探索深度内での詰まされスコア
    pub const MATED_IN_MAX_PLY: Value = Value(-Self::MATE_IN_MAX_PLY.0);

    /// 値から生成
    #[inline]
    pub const fn new(v: i32) -> Value {
        Value(v)
    }

    /// ply手で詰ますスコア
    #[inline]
    pub const fn mate_in(ply: usize) -> Value {
        Value(Self::MATE.0 - ply as i32)
    }

    /// ply手で詰まされるスコア
    #[inline]
    pub const fn mated_in(ply: usize) -> Value {
        Value(-Self::MATE.0 + ply as i32)
    }

    /// 勝ちスコアかどうか
    #[inline]
    pub const fn is_win(self) -> bool {
        self.0 >= Self::MATE_IN_MAX_PLY.0
    }

    /// 負けスコアかどうか
    #[inline]
    pub const fn is_loss(self) -> bool {
        self.0 <= Self::MATED_IN_MAX_PLY.0
    }

    /// 生の値を取得
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::ZERO
    }
}

impl Neg for Value {
    type Output = Value;

    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl Add<i32> for Value {
    type Output = Value;

    #[inline]
    fn add(self, rhs: i32) -> Value {
        Value(self.0 + rhs)
    }
}

impl Sub for Value {
    type Output = Value;

    #[inline]
    fn sub(self, rhs: Value) -> Value {
        Value(self.0 - rhs.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 置換表に格納する値に変換（詰みスコアを ply 非依存にする）
#[inline]
pub fn value_to_tt(v: Value, ply: usize) -> Value {
    if v.is_win() {
        Value(v.0 + ply as i32)
    } else if v.is_loss() {
        Value(v.0 - ply as i32)
    } else {
        v
    }
}

/// 置換表から取り出した値を現在の ply 基準に戻す
#[inline]
pub fn value_from_tt(v: Value, ply: usize) -> Value {
    if v.is_win() {
        Value(v.0 - ply as i32)
    } else if v.is_loss() {
        Value(v.0 + ply as i32)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores_are_symmetric() {
        assert_eq!(Value::mate_in(3), -Value::mated_in(3));
        assert!(Value::mate_in(3).is_win());
        assert!(Value::mated_in(3).is_loss());
        assert!(!Value::new(1500).is_win());
        assert!(!Value::new(-1500).is_loss());
    }

    #[test]
    fn test_tt_conversion_roundtrip_keeps_mate_distance() {
        let v = Value::mated_in(7);
        let stored = value_to_tt(v, 4);
        // 格納値は ply=0 基準の詰み手数になる
        assert_eq!(stored, Value::mated_in(3));
        assert_eq!(value_from_tt(stored, 4), v);
        assert_eq!(value_to_tt(Value::new(42), 9), Value::new(42));
    }

    #[test]
    fn test_sentinels_order() {
        assert!(Value::INFINITE > Value::MATE);
        assert!(-Value::INFINITE < Value::mated_in(0));
    }
}
