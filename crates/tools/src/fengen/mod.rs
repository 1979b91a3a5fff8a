//! 注釈付き棋譜からの学習サンプル抽出
//!
//! 振り分け（[`distributor`]）→ レーン（[`lane`]）→ 局面選別（[`qualifier`]）→
//! サンプル出力（[`sample`]）→ 集計（[`aggregator`]）の順に流れる。

pub mod aggregator;
pub mod annotation;
pub mod config;
pub mod distributor;
mod error;
pub mod lane;
pub mod pipeline;
pub mod qualifier;
pub mod sample;

pub use aggregator::RunSummary;
pub use annotation::{parse_annotation, Annotation, MalformedAnnotation};
pub use config::{
    FengenConfig, MalformedPolicy, OutputTarget, QueueCapacity, RunConfig, SignConvention,
};
pub use error::{ConfigError, FengenError};
pub use pipeline::{run, RunMeta, RunOutput};
pub use sample::{OutcomeLabel, Sample};
