//! 局面の選別
//!
//! 1 局分の局面列を走査し、静的評価と静止探索値の差が許容幅に収まる「静かな」局面だけを
//! サンプルにする。評価器は呼び出し側のレーンが専有するものを借りる。

use fengen_core::{Evaluator, Value};
use log::{trace, warn};
use shakmaty::fen::Fen;
use shakmaty::{Color, EnPassantMode, Position};

use super::annotation::{parse_annotation, Annotation, MalformedAnnotation};
use super::config::{MalformedPolicy, QualifierConfig, SignConvention};
use super::error::FengenError;
use super::sample::{OutcomeLabel, Sample};
use crate::pgn::{GameRecord, Termination};

/// 1 局分の選別結果
#[derive(Debug, Default)]
pub struct GameSamples {
    pub samples: Vec<Sample>,
    /// 結果が決着していないため丸ごと飛ばした
    pub unlabeled: bool,
    /// 注釈が壊れていて飛ばした局面数（`MalformedPolicy::Skip` のときのみ）
    pub malformed_skipped: u64,
}

impl SignConvention {
    /// 注釈（センチポーン）・静的評価・静止探索値の符号をそろえる。`turn` は局面の手番
    pub fn normalize(self, turn: Color, score: i32, static_eval: Value, qeval: Value) -> (i32, Value, Value) {
        let negate_score = match self {
            SignConvention::WhitePov => turn == Color::White,
            SignConvention::SwappedPov => turn == Color::Black,
        };
        if negate_score {
            (-score, static_eval, qeval)
        } else {
            (score, -static_eval, -qeval)
        }
    }
}

/// 注釈の評価値（ポーン単位）をセンチポーンの整数にする
///
/// 四捨五入は 0 から遠い側。`i32` に収まらない値は `None`。
pub fn to_centipawns(score: f64) -> Option<i32> {
    let centipawns = (score * 100.0).round();
    (centipawns.abs() <= f64::from(i32::MAX)).then_some(centipawns as i32)
}

pub struct PositionQualifier<'a> {
    config: &'a QualifierConfig,
}

impl<'a> PositionQualifier<'a> {
    pub fn new(config: &'a QualifierConfig) -> Self {
        Self { config }
    }

    /// 1 局を選別する。`game_index` はエラー表示用の通し番号
    pub fn qualify<E: Evaluator>(
        &self,
        game: &GameRecord,
        game_index: u64,
        evaluator: &mut E,
    ) -> Result<GameSamples, FengenError> {
        let mut result = GameSamples::default();
        let Some(outcome) = OutcomeLabel::from_outcome(game.outcome) else {
            result.unlabeled = true;
            return Ok(result);
        };

        let last = game.positions.len().saturating_sub(1);
        for (index, pos) in game.positions.iter().enumerate().skip(1) {
            // 詰んだ局面は評価対象にしない
            if index == last && game.termination == Termination::Checkmate {
                continue;
            }

            let turn = pos.turn();
            if let Some(mover) = game.player(!turn) {
                if self.config.ignore_players.contains(mover) {
                    continue;
                }
            }

            let fen = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
            evaluator.set_position(&fen)?;
            if evaluator.in_check() {
                continue;
            }

            evaluator.clear_for_search();
            let static_eval = evaluator.static_eval();
            evaluator.set_static_eval(0, static_eval);
            let qeval = evaluator.quiescence(-Value::INFINITE, Value::INFINITE, 0);

            let gap = (i64::from(static_eval.raw()) - i64::from(qeval.raw())).abs();
            if gap > i64::from(self.config.limit) {
                trace!("game {game_index} ply {index}: not quiet (gap {gap})");
                continue;
            }

            let (pawns, score) = match self.annotated_score(game, index - 1) {
                Ok(Some(score)) => score,
                Ok(None) => continue,
                Err(source) => match self.config.on_malformed {
                    MalformedPolicy::Abort => {
                        return Err(FengenError::Annotation {
                            game: game_index,
                            ply: index - 1,
                            source,
                        });
                    }
                    MalformedPolicy::Skip => {
                        warn!("game {game_index} ply {}: skipped {source}", index - 1);
                        result.malformed_skipped += 1;
                        continue;
                    }
                },
            };

            if let Some(cutoff) = self.config.max_abs_score {
                if pawns.abs() > cutoff {
                    continue;
                }
            }

            let (score, static_eval, qeval) =
                self.config.sign_convention.normalize(turn, score, static_eval, qeval);
            result.samples.push(Sample {
                fen,
                score,
                static_eval: static_eval.raw(),
                qeval: qeval.raw(),
                outcome,
            });
        }
        Ok(result)
    }

    /// `ply` 番目の手に付いた評価値を（ポーン単位, センチポーン）で返す。定跡・詰み表記は `None`
    ///
    /// コメントがない、またはセンチポーンが `i32` に収まらない注釈は壊れた注釈として扱う。
    fn annotated_score(
        &self,
        game: &GameRecord,
        ply: usize,
    ) -> Result<Option<(f64, i32)>, MalformedAnnotation> {
        let text = game.comment_text(ply).unwrap_or_default();
        match parse_annotation(&text)? {
            Annotation::Score(pawns) => match to_centipawns(pawns) {
                Some(centipawns) => Ok(Some((pawns, centipawns))),
                None => Err(MalformedAnnotation { comment: text }),
            },
            Annotation::Book | Annotation::Mate => Ok(None),
        }
    }
}
