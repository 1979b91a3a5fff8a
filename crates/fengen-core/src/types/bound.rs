//! 置換表エントリの境界種別

use super::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Bound {
    #[default]
    None = 0,
    /// fail-low（真の値はこれ以下）
    Upper = 1,
    /// fail-high（真の値はこれ以上）
    Lower = 2,
    Exact = 3,
}

impl Bound {
    /// 格納値 `value` で現在の窓 (alpha, beta) をカットできるか
    #[inline]
    pub fn can_cutoff(self, value: Value, alpha: Value, beta: Value) -> bool {
        match self {
            Bound::None => false,
            Bound::Exact => true,
            Bound::Lower => value >= beta,
            Bound::Upper => value <= alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_cutoff() {
        let alpha = Value::new(-10);
        let beta = Value::new(10);
        assert!(Bound::Exact.can_cutoff(Value::ZERO, alpha, beta));
        assert!(Bound::Lower.can_cutoff(Value::new(10), alpha, beta));
        assert!(!Bound::Lower.can_cutoff(Value::new(9), alpha, beta));
        assert!(Bound::Upper.can_cutoff(Value::new(-10), alpha, beta));
        assert!(!Bound::Upper.can_cutoff(Value::new(0), alpha, beta));
        assert!(!Bound::None.can_cutoff(Value::ZERO, alpha, beta));
    }
}
