//! 棋譜の振り分け
//!
//! 入力ソースを指定順に、各ソース内の棋譜を記録順に読み、通し番号 `i` の棋譜を
//! レーン `i mod N` のキューに送る。全ソースを読み終えたら（または失敗したら）
//! 送信側を破棄してキューを閉じる。

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{self as chan, Receiver, Sender};
use log::{debug, info};

use super::config::QueueCapacity;
use super::error::FengenError;
use super::lane::QueuedGame;
use crate::pgn::GameSource;

/// 通し番号 `index` の棋譜を受け持つレーン
pub fn lane_for(index: u64, lanes: usize) -> usize {
    (index % lanes as u64) as usize
}

/// レーン数分のキューを作る
pub fn lane_queues(
    lanes: usize,
    capacity: QueueCapacity,
) -> (Vec<Sender<QueuedGame>>, Vec<Receiver<QueuedGame>>) {
    (0..lanes)
        .map(|_| match capacity {
            QueueCapacity::Bounded(cap) => chan::bounded(cap),
            QueueCapacity::Unbounded => chan::unbounded(),
        })
        .unzip()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistributionStats {
    /// 開いたソース数
    pub sources: usize,
    /// キューに送った局数
    pub games: u64,
    /// レーン側の失敗で途中で打ち切った
    pub interrupted: bool,
}

pub struct Distributor<'a> {
    queues: Vec<Sender<QueuedGame>>,
    abort: &'a AtomicBool,
    progress_interval: u64,
}

impl<'a> Distributor<'a> {
    pub fn new(queues: Vec<Sender<QueuedGame>>, abort: &'a AtomicBool, progress_interval: u64) -> Self {
        Self {
            queues,
            abort,
            progress_interval,
        }
    }

    /// すべてのソースを振り分ける。戻ると同時に全キューが閉じる
    ///
    /// 読み込みに失敗したときは中断フラグを立ててエラーを返す。
    pub fn run<I, S>(self, sources: I) -> Result<DistributionStats, FengenError>
    where
        I: IntoIterator<Item = Result<S, FengenError>>,
        S: GameSource,
    {
        let result = self.feed(sources);
        if result.is_err() {
            self.abort.store(true, Ordering::SeqCst);
        }
        result
    }

    fn feed<I, S>(&self, sources: I) -> Result<DistributionStats, FengenError>
    where
        I: IntoIterator<Item = Result<S, FengenError>>,
        S: GameSource,
    {
        let mut stats = DistributionStats::default();
        if self.queues.is_empty() {
            return Ok(stats);
        }

        for source in sources {
            let mut source = source?;
            stats.sources += 1;

            while let Some(game) = source.next_game()? {
                if self.abort.load(Ordering::SeqCst) {
                    stats.interrupted = true;
                    return Ok(stats);
                }

                let index = stats.games;
                let lane = lane_for(index, self.queues.len());
                // 受信側が先に終わっている = そのレーンが失敗している
                if self.queues[lane].send(QueuedGame { index, game }).is_err() {
                    debug!("lane {} is gone; stop distributing", lane + 1);
                    self.abort.store(true, Ordering::SeqCst);
                    stats.interrupted = true;
                    return Ok(stats);
                }
                stats.games += 1;

                if self.progress_interval > 0 && stats.games % self.progress_interval == 0 {
                    info!("{} games queued ({} sources opened)", stats.games, stats.sources);
                }
            }
        }

        info!("read {} games from {} sources", stats.games, stats.sources);
        Ok(stats)
    }
}
