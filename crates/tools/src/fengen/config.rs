//! 抽出処理の設定
//!
//! TOML ファイル（任意）を [`FengenConfig`] として読み込み、CLI の指定で上書きしてから
//! [`FengenConfig::validate`] で [`RunConfig`] に確定させる。検証は処理開始前に行う。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clap::ValueEnum;
use fengen_core::EvaluatorConfig;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::common::io::is_stdio;

/// 評価値の符号をそろえる規約
///
/// 注釈の評価値は着手側視点、評価器の値は手番側視点で与えられる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SignConvention {
    /// すべて白視点にそろえる。
    /// 白番（黒が指した直後）なら注釈を反転、黒番なら静的評価と静止探索値を反転する。
    #[default]
    WhitePov,
    /// 白番なら静的評価と静止探索値を反転、黒番なら注釈を反転する。
    SwappedPov,
}

/// 解釈できない注釈に出会ったときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// 実行全体を中断する
    #[default]
    Abort,
    /// その局面を飛ばして件数を数える
    Skip,
}

/// レーンごとの入力キューの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCapacity {
    /// 容量付き。0 は受け渡し（ランデブー）
    Bounded(usize),
    Unbounded,
}

impl Default for QueueCapacity {
    fn default() -> Self {
        QueueCapacity::Bounded(DEFAULT_QUEUE_CAPACITY)
    }
}

pub const DEFAULT_QUEUE_CAPACITY: usize = 16;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;
/// 置換表・ポーンハッシュに指定できる最大サイズ（MiB）
pub const MAX_HASH_MB: usize = 1 << 20;

/// 設定ファイルの内容（未検証）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FengenConfig {
    /// |静的評価 - 静止探索値| の許容幅
    pub limit: i32,
    /// 入力 PGN（カンマ/改行区切り、glob 可）
    pub input: Vec<String>,
    /// 出力先（ディレクトリ、単一ファイル、または `-`）
    pub output: Option<PathBuf>,
    /// レーン数（省略時はディレクトリ出力なら利用可能な並列度、ストリーム出力なら 1）
    pub lanes: Option<usize>,
    /// この名前のプレイヤーが指した直後の局面を除外する。1 要素が 1 人（`Last, First` 可）
    pub ignore_players: Vec<String>,
    pub queue_capacity: usize,
    pub unbounded_queue: bool,
    /// 注釈の絶対値がこれを超える局面を除外する（注釈エンジンの単位）
    pub max_abs_score: Option<f64>,
    pub sign_convention: SignConvention,
    pub on_malformed: MalformedPolicy,
    /// ディレクトリ出力を gzip 圧縮する
    pub gzip: bool,
    /// 進捗ログの間隔（局数、0 で無効）
    pub progress_interval: u64,
    pub evaluator: EvaluatorConfig,
}

impl Default for FengenConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            input: Vec::new(),
            output: None,
            lanes: None,
            ignore_players: Vec::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            unbounded_queue: false,
            max_abs_score: None,
            sign_convention: SignConvention::default(),
            on_malformed: MalformedPolicy::default(),
            gzip: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            evaluator: EvaluatorConfig::default(),
        }
    }
}

/// 出力先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// レーンごとに `part-<n>.epd` を作る
    Directory(PathBuf),
    /// 単一ファイル（1 レーン時のみ）
    File(PathBuf),
    /// 標準出力（1 レーン時のみ）
    Stdout,
}

/// 局面選別の設定
#[derive(Debug, Clone, PartialEq)]
pub struct QualifierConfig {
    pub limit: i32,
    pub ignore_players: HashSet<String>,
    pub max_abs_score: Option<f64>,
    pub sign_convention: SignConvention,
    pub on_malformed: MalformedPolicy,
}

impl Default for QualifierConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            ignore_players: HashSet::new(),
            max_abs_score: None,
            sign_convention: SignConvention::default(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

/// 検証済みの実行設定
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inputs: Vec<PathBuf>,
    pub output: OutputTarget,
    pub lanes: usize,
    pub queue: QueueCapacity,
    pub qualifier: QualifierConfig,
    pub gzip: bool,
    pub progress_interval: u64,
    pub evaluator: EvaluatorConfig,
}

impl FengenConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        if self.limit < 0 {
            return Err(ConfigError::NegativeLimit(self.limit));
        }
        if let Some(cutoff) = self.max_abs_score {
            if !cutoff.is_finite() || cutoff <= 0.0 {
                return Err(ConfigError::InvalidScoreCutoff(cutoff));
            }
        }
        for (name, mb) in [
            ("tt_mb", self.evaluator.tt_mb),
            ("pawn_hash_mb", self.evaluator.pawn_hash_mb),
        ] {
            if mb > MAX_HASH_MB {
                return Err(ConfigError::HashSize {
                    name,
                    mb,
                    max: MAX_HASH_MB,
                });
            }
        }

        let inputs = expand_inputs(&self.input)?;
        if inputs.is_empty() {
            return Err(ConfigError::MissingInput);
        }
        let output = classify_output(self.output.ok_or(ConfigError::MissingOutput)?);
        let lanes = match (self.lanes, &output) {
            (Some(0), _) => return Err(ConfigError::ZeroLanes),
            (Some(n), _) => n,
            (None, OutputTarget::Directory(_)) => {
                thread::available_parallelism().map_or(1, |n| n.get())
            }
            (None, OutputTarget::File(_) | OutputTarget::Stdout) => 1,
        };
        if let OutputTarget::File(path) = &output {
            if lanes != 1 {
                return Err(ConfigError::StreamNeedsSingleLane {
                    path: path.clone(),
                    lanes,
                });
            }
        }
        if output == OutputTarget::Stdout && lanes != 1 {
            return Err(ConfigError::StreamNeedsSingleLane {
                path: PathBuf::from("-"),
                lanes,
            });
        }

        let queue = if self.unbounded_queue {
            QueueCapacity::Unbounded
        } else {
            QueueCapacity::Bounded(self.queue_capacity)
        };

        let ignore_players = self
            .ignore_players
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(RunConfig {
            inputs,
            output,
            lanes,
            queue,
            qualifier: QualifierConfig {
                limit: self.limit,
                ignore_players,
                max_abs_score: self.max_abs_score,
                sign_convention: self.sign_convention,
                on_malformed: self.on_malformed,
            },
            gzip: self.gzip,
            progress_interval: self.progress_interval,
            evaluator: self.evaluator,
        })
    }
}

/// カンマ/改行区切りのリストを分割する（空要素は捨てる）
pub fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// 入力リストを展開する。glob パターンは一致したファイルを名前順に並べる
pub fn expand_inputs(entries: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut inputs = Vec::new();
    let mut seen_stdin = false;
    for item in entries.iter().flat_map(|e| split_list(e)) {
        if is_stdio(&item) {
            if seen_stdin {
                return Err(ConfigError::RepeatedStdin);
            }
            seen_stdin = true;
            inputs.push(PathBuf::from(item));
        } else if is_glob_pattern(&item) {
            let paths = glob::glob(&item).map_err(|source| ConfigError::Pattern {
                pattern: item.clone(),
                source,
            })?;
            let mut matched = paths.collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                return Err(ConfigError::NoMatch(item));
            }
            matched.sort();
            inputs.extend(matched);
        } else {
            inputs.push(PathBuf::from(item));
        }
    }
    Ok(inputs)
}

/// `-` は標準出力、既存ディレクトリはディレクトリ、拡張子付きのパスは単一ファイル、
/// それ以外は（作成予定の）ディレクトリとみなす
fn classify_output(path: PathBuf) -> OutputTarget {
    if is_stdio(&path) {
        OutputTarget::Stdout
    } else if path.is_dir() {
        OutputTarget::Directory(path)
    } else if path.extension().is_some() {
        OutputTarget::File(path)
    } else {
        OutputTarget::Directory(path)
    }
}
