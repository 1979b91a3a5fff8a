//! fengen - 注釈付き PGN から学習用サンプルを抽出する
//!
//! 各手のコメントに書かれた評価値（`0.25/12` 形式）を教師値として、静的評価と
//! 静止探索値の差が `--limit` 以内の静かな局面を EPD 風の 1 行形式で出力する。
//!
//! 出力先がディレクトリならレーンごとに `part-<n>.epd` を書き、`fengen-meta.json` を添える。
//! 1 レーンなら単一ファイルや標準出力（`-`）も指定できる。
//!
//! ```text
//! fengen --input "games/*.pgn.gz" --output out/ --lanes 8 --limit 30
//! fengen --config fengen.toml --on-malformed skip
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fengen_core::SearchWorker;
use log::info;
use tools::common::io::{lane_output_path, open_writer, Writer};
use tools::fengen::{
    self, FengenConfig, MalformedPolicy, OutputTarget, RunConfig, RunMeta, SignConvention,
};
use tools::pgn::PgnGameSource;

const META_FILE: &str = "fengen-meta.json";

#[derive(Parser, Debug)]
#[command(name = "fengen")]
#[command(about = "Extract quiet, annotated positions from PGN files as training samples")]
struct Cli {
    /// TOML 設定ファイル（以下のフラグで上書きできる）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 許容する |静的評価 - 静止探索値|（センチポーン）
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i32>,

    /// 入力 PGN（カンマ/改行区切り、glob 可、.gz 可、`-` で標準入力）
    #[arg(long)]
    input: Option<String>,

    /// 出力先ディレクトリ（1 レーンならファイルまたは `-` も可）
    #[arg(long)]
    output: Option<PathBuf>,

    /// 並列レーン数（省略時はディレクトリ出力なら利用可能な並列度、ストリーム出力なら 1）
    #[arg(long)]
    lanes: Option<usize>,

    /// 除外するプレイヤー名。1 回の指定で 1 人（`"Carlsen, Magnus"` も 1 人）、繰り返し指定可
    #[arg(long)]
    ignore_players: Vec<String>,

    /// レーンごとのキュー容量（0 で受け渡しのみ）
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// キュー容量を無制限にする
    #[arg(long)]
    unbounded_queue: bool,

    /// 注釈の絶対値がこれを超える局面を除外する（ポーン単位）
    #[arg(long)]
    max_abs_score: Option<f64>,

    /// 評価値の符号の規約
    #[arg(long, value_enum)]
    sign_convention: Option<SignConvention>,

    /// 解釈できない注釈の扱い
    #[arg(long, value_enum)]
    on_malformed: Option<MalformedPolicy>,

    /// 置換表サイズ（MiB、レーンごと）
    #[arg(long)]
    tt_mb: Option<usize>,

    /// ポーン構造ハッシュサイズ（MiB、レーンごと）
    #[arg(long)]
    pawn_hash_mb: Option<usize>,

    /// ディレクトリ出力を gzip 圧縮する
    #[arg(long)]
    gzip: bool,

    /// 進捗ログの間隔（局数、0 で無効）
    #[arg(long)]
    progress_interval: Option<u64>,
}

impl Cli {
    /// 設定ファイルの値にフラグを重ねる
    fn merge_into(self, mut cfg: FengenConfig) -> FengenConfig {
        if let Some(v) = self.limit {
            cfg.limit = v;
        }
        if let Some(v) = self.input {
            cfg.input = vec![v];
        }
        if let Some(v) = self.output {
            cfg.output = Some(v);
        }
        if let Some(v) = self.lanes {
            cfg.lanes = Some(v);
        }
        if !self.ignore_players.is_empty() {
            cfg.ignore_players = self.ignore_players;
        }
        if let Some(v) = self.queue_capacity {
            cfg.queue_capacity = v;
        }
        cfg.unbounded_queue |= self.unbounded_queue;
        if let Some(v) = self.max_abs_score {
            cfg.max_abs_score = Some(v);
        }
        if let Some(v) = self.sign_convention {
            cfg.sign_convention = v;
        }
        if let Some(v) = self.on_malformed {
            cfg.on_malformed = v;
        }
        if let Some(v) = self.tt_mb {
            cfg.evaluator.tt_mb = v;
        }
        if let Some(v) = self.pawn_hash_mb {
            cfg.evaluator.pawn_hash_mb = v;
        }
        cfg.gzip |= self.gzip;
        if let Some(v) = self.progress_interval {
            cfg.progress_interval = v;
        }
        cfg
    }
}

/// レーンごとの出力先を開く
fn open_outputs(config: &RunConfig) -> Result<Vec<Writer>> {
    match &config.output {
        OutputTarget::Directory(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
            (0..config.lanes)
                .map(|lane| {
                    let path = lane_output_path(dir, lane, config.gzip);
                    open_writer(&path)
                        .with_context(|| format!("failed to create {}", path.display()))
                })
                .collect()
        }
        OutputTarget::File(path) => {
            let w = open_writer(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(vec![w])
        }
        OutputTarget::Stdout => Ok(vec![open_writer("-")?]),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut cli = Cli::parse();
    let file_config = match cli.config.take() {
        Some(path) => FengenConfig::load(&path)?,
        None => FengenConfig::default(),
    };
    let config = cli.merge_into(file_config).validate()?;
    info!(
        "inputs: {}, lanes: {}, limit: {}",
        config.inputs.len(),
        config.lanes,
        config.qualifier.limit
    );

    let writers = open_outputs(&config)?;
    let sources = config.inputs.iter().map(|path| PgnGameSource::open(path));
    let evaluator_config = config.evaluator;
    let output = fengen::run(
        &config,
        sources,
        |_lane| SearchWorker::new(&evaluator_config),
        writers,
    )?;

    for w in output.writers {
        w.close().context("failed to finalize output")?;
    }

    let summary = output.summary;
    info!(
        "games: {}, unlabeled: {}, malformed skipped: {}",
        summary.games, summary.unlabeled_games, summary.malformed_skipped
    );
    let samples = summary.samples;
    if let OutputTarget::Directory(dir) = &config.output {
        let meta_path = dir.join(META_FILE);
        RunMeta::new(&config, summary)
            .write(&meta_path)
            .with_context(|| format!("failed to write {}", meta_path.display()))?;
    }

    eprintln!("Wrote {samples} FENs");
    Ok(())
}
