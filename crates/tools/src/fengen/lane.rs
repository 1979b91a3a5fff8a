//! レーン（ワーカー）
//!
//! 各レーンは評価器を 1 つ専有し、自分のキューに届いた棋譜を到着順に処理する。
//! キューが閉じて空になったら終了し、集計用の [`LaneReport`] を返す。

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Receiver;
use fengen_core::Evaluator;
use log::{debug, info};
use serde::Serialize;

use super::config::QualifierConfig;
use super::error::FengenError;
use super::qualifier::PositionQualifier;
use super::sample::SampleWriter;
use crate::pgn::GameRecord;

/// キューで受け渡す棋譜
#[derive(Debug)]
pub struct QueuedGame {
    /// 全入力を通した通し番号（0 始まり）
    pub index: u64,
    pub game: GameRecord,
}

/// レーンの処理結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LaneReport {
    pub lane: usize,
    pub games: u64,
    /// 結果未確定で丸ごと飛ばした局数
    pub unlabeled_games: u64,
    pub samples: u64,
    pub malformed_skipped: u64,
}

pub struct LaneWorker<'a, E: Evaluator, W: Write> {
    lane: usize,
    evaluator: E,
    writer: SampleWriter<W>,
    qualifier: PositionQualifier<'a>,
    /// 実行全体の中断フラグ
    abort: &'a AtomicBool,
}

impl<'a, E: Evaluator, W: Write> LaneWorker<'a, E, W> {
    pub fn new(
        lane: usize,
        evaluator: E,
        out: W,
        config: &'a QualifierConfig,
        abort: &'a AtomicBool,
    ) -> Self {
        Self {
            lane,
            evaluator,
            writer: SampleWriter::new(out),
            qualifier: PositionQualifier::new(config),
            abort,
        }
    }

    /// キューが閉じるまで処理し、結果と出力先を返す
    ///
    /// 自身が失敗したときは中断フラグを立てる。他所の失敗で止まったときは
    /// [`FengenError::Aborted`] を返す。
    pub fn run(mut self, queue: Receiver<QueuedGame>) -> Result<(LaneReport, W), FengenError> {
        match self.process(&queue) {
            Ok(report) => {
                info!(
                    "lane {}: {} games, {} samples",
                    self.lane + 1,
                    report.games,
                    report.samples
                );
                if let Some(stats) = self.evaluator.cache_stats() {
                    debug!(
                        "lane {}: tt hashfull {}/1000, pawn hash {} hits / {} misses",
                        self.lane + 1,
                        stats.tt_hashfull,
                        stats.pawn_hits,
                        stats.pawn_misses
                    );
                }
                Ok((report, self.writer.into_inner()))
            }
            Err(e) => {
                if !e.is_abort() {
                    self.abort.store(true, Ordering::SeqCst);
                }
                Err(e)
            }
        }
    }

    fn process(&mut self, queue: &Receiver<QueuedGame>) -> Result<LaneReport, FengenError> {
        let mut report = LaneReport {
            lane: self.lane,
            ..LaneReport::default()
        };

        for QueuedGame { index, game } in queue.iter() {
            if self.abort.load(Ordering::SeqCst) {
                return Err(FengenError::Aborted(self.lane));
            }

            let result = self.qualifier.qualify(&game, index + 1, &mut self.evaluator)?;
            self.writer
                .write_game(&result.samples)
                .map_err(|source| FengenError::Write {
                    lane: self.lane,
                    source,
                })?;

            report.games += 1;
            report.samples += result.samples.len() as u64;
            report.malformed_skipped += result.malformed_skipped;
            if result.unlabeled {
                report.unlabeled_games += 1;
            }
            debug!(
                "lane {}: game {} -> {} samples",
                self.lane + 1,
                index + 1,
                result.samples.len()
            );
        }

        debug_assert_eq!(report.samples, self.writer.written());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::{GameSource, PgnGameSource};
    use fengen_core::{EvaluatorConfig, SearchWorker};
    use std::io::Cursor;

    fn games(text: &str) -> Vec<GameRecord> {
        let mut src = PgnGameSource::new("lane-test", Cursor::new(text.as_bytes().to_vec()));
        let mut out = Vec::new();
        while let Some(g) = src.next_game().unwrap() {
            out.push(g);
        }
        out
    }

    fn queue_of(games: Vec<GameRecord>) -> Receiver<QueuedGame> {
        let (tx, rx) = crossbeam_channel::unbounded();
        for (index, game) in games.into_iter().enumerate() {
            tx.send(QueuedGame {
                index: index as u64,
                game,
            })
            .unwrap();
        }
        rx
    }

    const PGN: &str = "[Result \"1-0\"]\n\n1. e4 {0.30/10} e5 {0.25/10} 1-0\n\n\
                       [Result \"*\"]\n\n1. d4 {0.10/10} *\n";

    #[test]
    fn test_lane_processes_queue_with_real_evaluator() {
        let config = QualifierConfig {
            limit: 1000,
            ..QualifierConfig::default()
        };
        let abort = AtomicBool::new(false);
        let worker = LaneWorker::new(
            0,
            SearchWorker::new(&EvaluatorConfig::default()),
            Vec::new(),
            &config,
            &abort,
        );
        let (report, out) = worker.run(queue_of(games(PGN))).unwrap();

        assert_eq!(report.games, 2);
        assert_eq!(report.unlabeled_games, 1);
        assert_eq!(report.samples, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1;score:30;"));
        assert!(lines.iter().all(|l| l.ends_with(";outcome:1.0")));
        assert!(!abort.load(Ordering::SeqCst));
    }

    #[test]
    fn test_lane_failure_raises_abort_flag() {
        let config = QualifierConfig {
            limit: 1000,
            ..QualifierConfig::default()
        };
        let abort = AtomicBool::new(false);
        let worker = LaneWorker::new(
            2,
            SearchWorker::new(&EvaluatorConfig::default()),
            Vec::new(),
            &config,
            &abort,
        );
        let bad = games("[Result \"1-0\"]\n\n1. e4 {xyz/3} 1-0\n");
        let err = worker.run(queue_of(bad)).unwrap_err();
        assert!(matches!(err, FengenError::Annotation { game: 1, ply: 0, .. }));
        assert!(abort.load(Ordering::SeqCst));
    }

    #[test]
    fn test_lane_stops_when_aborted_elsewhere() {
        let config = QualifierConfig::default();
        let abort = AtomicBool::new(true);
        let worker = LaneWorker::new(
            1,
            SearchWorker::new(&EvaluatorConfig::default()),
            Vec::new(),
            &config,
            &abort,
        );
        let err = worker.run(queue_of(games(PGN))).unwrap_err();
        assert!(matches!(err, FengenError::Aborted(1)));
    }

    #[test]
    fn test_empty_closed_queue_reports_zero() {
        let config = QualifierConfig::default();
        let abort = AtomicBool::new(false);
        let worker = LaneWorker::new(
            0,
            SearchWorker::new(&EvaluatorConfig::default()),
            Vec::new(),
            &config,
            &abort,
        );
        let (report, out) = worker.run(queue_of(Vec::new())).unwrap();
        assert_eq!(report, LaneReport::default());
        assert!(out.is_empty());
    }
}
