//! レーン結果の集計

use serde::Serialize;

use super::error::FengenError;
use super::lane::LaneReport;

/// 実行全体の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub games: u64,
    pub unlabeled_games: u64,
    pub samples: u64,
    pub malformed_skipped: u64,
    /// レーン番号順
    pub lanes: Vec<LaneReport>,
}

/// 全レーンの報告を受けて合計する
///
/// 失敗は最初の 1 件を保持する。ただし巻き込まれ停止（[`FengenError::Aborted`]）は
/// 原因となったエラーが後から届いたらそちらで置き換える。
#[derive(Debug, Default)]
pub struct Aggregator {
    summary: RunSummary,
    error: Option<FengenError>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: Result<LaneReport, FengenError>) {
        match result {
            Ok(report) => {
                self.summary.games += report.games;
                self.summary.unlabeled_games += report.unlabeled_games;
                self.summary.samples += report.samples;
                self.summary.malformed_skipped += report.malformed_skipped;
                self.summary.lanes.push(report);
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn fail(&mut self, error: FengenError) {
        let replace = match &self.error {
            None => true,
            Some(prev) => prev.is_abort() && !error.is_abort(),
        };
        if replace {
            self.error = Some(error);
        }
    }

    pub fn finish(mut self) -> Result<RunSummary, FengenError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.summary.lanes.sort_by_key(|r| r.lane);
        Ok(self.summary)
    }
}
