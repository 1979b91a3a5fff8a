//! 学習サンプルと出力
//!
//! 1 サンプル 1 行: `<fen>;score:<int>;eval:<int>;qs:<int>;outcome:<1.0|0.0|0.5>`

use std::fmt;
use std::io::{self, Write};

use crate::pgn::GameOutcome;

/// 白から見た対局結果ラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeLabel {
    WhiteWin,
    BlackWin,
    Draw,
}

impl OutcomeLabel {
    /// 決着していない対局は `None`
    pub fn from_outcome(outcome: GameOutcome) -> Option<Self> {
        match outcome {
            GameOutcome::WhiteWon => Some(OutcomeLabel::WhiteWin),
            GameOutcome::BlackWon => Some(OutcomeLabel::BlackWin),
            GameOutcome::Draw => Some(OutcomeLabel::Draw),
            GameOutcome::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeLabel::WhiteWin => "1.0",
            OutcomeLabel::BlackWin => "0.0",
            OutcomeLabel::Draw => "0.5",
        }
    }
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 選別を通過した局面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub fen: String,
    /// 注釈の評価値（センチポーン）
    pub score: i32,
    /// 静的評価
    pub static_eval: i32,
    /// 静止探索値
    pub qeval: i32,
    pub outcome: OutcomeLabel,
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};score:{};eval:{};qs:{};outcome:{}",
            self.fen, self.score, self.static_eval, self.qeval, self.outcome
        )
    }
}

/// レーン専用のサンプル出力
///
/// 1 局分をまとめて書き、局ごとにフラッシュする。
pub struct SampleWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> SampleWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// 1 局分のサンプルを書いてフラッシュする
    pub fn write_game(&mut self, samples: &[Sample]) -> io::Result<()> {
        for sample in samples {
            writeln!(self.out, "{sample}")?;
        }
        self.written += samples.len() as u64;
        self.out.flush()
    }

    /// これまでに書いたサンプル数
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: i32, outcome: OutcomeLabel) -> Sample {
        Sample {
            fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string(),
            score,
            static_eval: -12,
            qeval: -12,
            outcome,
        }
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            sample(-25, OutcomeLabel::WhiteWin).to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1;score:-25;eval:-12;qs:-12;outcome:1.0"
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(OutcomeLabel::WhiteWin.as_str(), "1.0");
        assert_eq!(OutcomeLabel::BlackWin.as_str(), "0.0");
        assert_eq!(OutcomeLabel::Draw.as_str(), "0.5");
        assert_eq!(OutcomeLabel::from_outcome(GameOutcome::Unknown), None);
        assert_eq!(
            OutcomeLabel::from_outcome(GameOutcome::BlackWon),
            Some(OutcomeLabel::BlackWin)
        );
    }

    #[test]
    fn test_writer_counts_and_flushes() {
        let mut w = SampleWriter::new(Vec::new());
        w.write_game(&[sample(1, OutcomeLabel::Draw), sample(2, OutcomeLabel::Draw)])
            .unwrap();
        w.write_game(&[]).unwrap();
        assert_eq!(w.written(), 2);
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("outcome:0.5\n"));
    }
}
