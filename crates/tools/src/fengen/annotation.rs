//! 手ごとのコメントから評価値を読み取る
//!
//! 注釈エンジンは `<score>/<depth>` 形式（例: `0.25/12`、`-1.40/18 1.2s`）で
//! 着手直後の局面の評価値を書き込む。先頭トークンだけを見る。

use thiserror::Error;

/// 定跡手を表すトークン
const BOOK_TOKEN: &str = "book";
/// 詰み表記（`M5`, `-M3` など）に含まれる文字
const MATE_MARKER: char = 'M';

/// コメントの解釈結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Annotation {
    /// 注釈エンジンの評価値（ポーン単位、着手側視点）
    Score(f64),
    /// 定跡手
    Book,
    /// 詰み表記
    Mate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed annotation {comment:?}")]
pub struct MalformedAnnotation {
    pub comment: String,
}

/// コメントを解釈する
///
/// 定跡・詰み表記は [`Annotation::Book`] / [`Annotation::Mate`] を返す（エラーではない）。
/// 空コメント、数値として読めないトークン、非有限値はエラー。
pub fn parse_annotation(comment: &str) -> Result<Annotation, MalformedAnnotation> {
    let malformed = || MalformedAnnotation {
        comment: comment.to_string(),
    };

    let token = comment.split_whitespace().next().ok_or_else(malformed)?;
    let value = token.split_once('/').map_or(token, |(v, _)| v);

    if value == BOOK_TOKEN {
        return Ok(Annotation::Book);
    }
    if value.contains(MATE_MARKER) {
        return Ok(Annotation::Mate);
    }

    match value.parse::<f64>() {
        Ok(score) if score.is_finite() => Ok(Annotation::Score(score)),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_with_depth() {
        assert_eq!(parse_annotation("0.25/12"), Ok(Annotation::Score(0.25)));
        assert_eq!(parse_annotation("-1.40/18 1.2s"), Ok(Annotation::Score(-1.40)));
        assert_eq!(parse_annotation("+0.07/9"), Ok(Annotation::Score(0.07)));
    }

    #[test]
    fn test_score_without_depth() {
        assert_eq!(parse_annotation("  3.5  "), Ok(Annotation::Score(3.5)));
        assert_eq!(parse_annotation("0"), Ok(Annotation::Score(0.0)));
    }

    #[test]
    fn test_book_and_mate_are_not_errors() {
        assert_eq!(parse_annotation("book"), Ok(Annotation::Book));
        assert_eq!(parse_annotation("book/0"), Ok(Annotation::Book));
        assert_eq!(parse_annotation("M5"), Ok(Annotation::Mate));
        assert_eq!(parse_annotation("-M3/20 0.5s"), Ok(Annotation::Mate));
        assert_eq!(parse_annotation("+M1/1"), Ok(Annotation::Mate));
    }

    #[test]
    fn test_malformed() {
        for comment in ["xyz/3", "", "   ", "Book", "nan/4", "inf", "0.25x/3", "/12"] {
            let err = parse_annotation(comment).unwrap_err();
            assert_eq!(err.comment, comment, "comment {comment:?}");
        }
    }

    #[test]
    fn test_only_first_token_matters() {
        assert_eq!(parse_annotation("1.00/10 xyz"), Ok(Annotation::Score(1.0)));
        assert!(parse_annotation("xyz 1.00/10").is_err());
    }
}
