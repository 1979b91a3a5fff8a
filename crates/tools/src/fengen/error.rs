//! fengen のエラー型

use std::io;
use std::path::PathBuf;

use fengen_core::FenError;
use thiserror::Error;

use crate::fengen::annotation::MalformedAnnotation;

/// 抽出処理中の致命的エラー
#[derive(Debug, Error)]
pub enum FengenError {
    #[error("failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write samples for lane {lane}")]
    Write {
        lane: usize,
        #[source]
        source: io::Error,
    },

    #[error("illegal move '{san}' in game {game} of '{source_name}'")]
    IllegalMove {
        source_name: String,
        game: u64,
        san: String,
    },

    #[error("invalid FEN tag in game {game} of '{source_name}'")]
    StartPosition {
        source_name: String,
        game: u64,
        #[source]
        source: FenError,
    },

    #[error("game {game}, ply {ply}: {source}")]
    Annotation {
        game: u64,
        ply: usize,
        #[source]
        source: MalformedAnnotation,
    },

    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("lane {0} stopped because another part of the run failed")]
    Aborted(usize),

    #[error("lane {0} panicked")]
    LanePanicked(usize),
}

impl FengenError {
    /// 他の失敗に巻き込まれて停止しただけのエラーか
    pub fn is_abort(&self) -> bool {
        matches!(self, FengenError::Aborted(_))
    }
}

/// 設定エラー（処理開始前に検出される）
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no input given (use --input)")]
    MissingInput,

    #[error("no output given (use --output)")]
    MissingOutput,

    #[error("limit must be non-negative, got {0}")]
    NegativeLimit(i32),

    #[error("lanes must be at least 1")]
    ZeroLanes,

    #[error("max-abs-score must be a positive finite number, got {0}")]
    InvalidScoreCutoff(f64),

    #[error("{name} must be at most {max} MiB, got {mb}")]
    HashSize {
        name: &'static str,
        mb: usize,
        max: usize,
    },

    #[error("invalid input pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to expand input pattern")]
    Glob(#[from] glob::GlobError),

    #[error("input pattern '{0}' matched no files")]
    NoMatch(String),

    #[error("output '{}' is a single stream; it requires --lanes 1 (got {lanes})", path.display())]
    StreamNeedsSingleLane { path: PathBuf, lanes: usize },

    #[error("stdin '-' can appear only once in the input list")]
    RepeatedStdin,
}
