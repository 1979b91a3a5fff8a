//! 抽出パイプライン全体の実行
//!
//! 呼び出しスレッドが振り分けを担当し、レーンごとにスコープ付きスレッドを立てる。
//! 評価器はレーンのスレッド内でファクトリから作るため、レーン間で共有されない。

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::Local;
use fengen_core::{Evaluator, EvaluatorConfig};
use log::{debug, info};
use serde::Serialize;

use super::aggregator::{Aggregator, RunSummary};
use super::config::{MalformedPolicy, RunConfig, SignConvention};
use super::distributor::{lane_queues, Distributor};
use super::error::FengenError;
use super::lane::LaneWorker;
use crate::pgn::GameSource;

/// 実行結果。`writers` はレーン番号順に返す（閉じるのは呼び出し側）
pub struct RunOutput<W> {
    pub summary: RunSummary,
    pub writers: Vec<W>,
}

/// パイプラインを実行する
///
/// レーン数は `writers` の数。`make_evaluator` はレーン番号を受け取り、
/// そのレーンのスレッド上で 1 度だけ呼ばれる。
pub fn run<I, S, E, F, W>(
    config: &RunConfig,
    sources: I,
    make_evaluator: F,
    writers: Vec<W>,
) -> Result<RunOutput<W>, FengenError>
where
    I: IntoIterator<Item = Result<S, FengenError>>,
    S: GameSource,
    E: Evaluator,
    F: Fn(usize) -> E + Sync,
    W: Write + Send,
{
    let lanes = writers.len();
    debug_assert_eq!(lanes, config.lanes);
    let abort = AtomicBool::new(false);
    let (queues, receivers) = lane_queues(lanes, config.queue);
    info!("starting {lanes} lanes (queue: {:?})", config.queue);

    thread::scope(|scope| {
        let handles: Vec<_> = receivers
            .into_iter()
            .zip(writers)
            .enumerate()
            .map(|(lane, (queue, out))| {
                let abort = &abort;
                let make_evaluator = &make_evaluator;
                let qualifier = &config.qualifier;
                scope.spawn(move || {
                    let evaluator = make_evaluator(lane);
                    LaneWorker::new(lane, evaluator, out, qualifier, abort).run(queue)
                })
            })
            .collect();

        let mut aggregator = Aggregator::new();
        match Distributor::new(queues, &abort, config.progress_interval).run(sources) {
            Ok(stats) => debug!("distribution finished: {stats:?}"),
            Err(e) => aggregator.fail(e),
        }

        let mut outputs = Vec::with_capacity(lanes);
        for (lane, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok((report, out))) => {
                    aggregator.add(Ok(report));
                    outputs.push(out);
                }
                Ok(Err(e)) => aggregator.add(Err(e)),
                Err(_) => {
                    abort.store(true, Ordering::SeqCst);
                    aggregator.fail(FengenError::LanePanicked(lane));
                }
            }
        }

        let summary = aggregator.finish()?;
        Ok(RunOutput {
            summary,
            writers: outputs,
        })
    })
}

/// ディレクトリ出力に添えるメタ情報
#[derive(Debug, Serialize)]
pub struct RunMeta {
    pub created_at: String,
    pub inputs: Vec<String>,
    pub lanes: usize,
    pub limit: i32,
    pub sign_convention: SignConvention,
    pub on_malformed: MalformedPolicy,
    pub max_abs_score: Option<f64>,
    pub ignore_players: Vec<String>,
    pub evaluator: EvaluatorConfig,
    pub summary: RunSummary,
}

impl RunMeta {
    pub fn new(config: &RunConfig, summary: RunSummary) -> Self {
        let mut ignore_players: Vec<String> =
            config.qualifier.ignore_players.iter().cloned().collect();
        ignore_players.sort();
        Self {
            created_at: Local::now().to_rfc3339(),
            inputs: config.inputs.iter().map(|p| p.display().to_string()).collect(),
            lanes: config.lanes,
            limit: config.qualifier.limit,
            sign_convention: config.qualifier.sign_convention,
            on_malformed: config.qualifier.on_malformed,
            max_abs_score: config.qualifier.max_abs_score,
            ignore_players,
            evaluator: config.evaluator,
            summary,
        }
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n")
    }
}
