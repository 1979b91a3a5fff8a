//! pgn-reader による PGN 読み込み
//!
//! 本譜のみを辿り、変化手順は読み飛ばす。手の直後のコメントはその手に付ける。
//! 最初の手より前のコメントは捨てる。

use std::io::Read;
use std::path::Path;

use fengen_core::parse_fen;
use pgn_reader::{BufferedReader, Outcome, RawComment, RawHeader, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position};

use super::{GameOutcome, GameRecord, GameSource};
use crate::common::io::open_reader;
use crate::fengen::FengenError;

/// PGN ストリームから棋譜を読み出すソース
pub struct PgnGameSource<R: Read> {
    reader: BufferedReader<R>,
    builder: GameBuilder,
}

impl<R: Read> PgnGameSource<R> {
    /// `name` はエラーメッセージ用のソース名
    pub fn new(name: impl Into<String>, read: R) -> Self {
        Self {
            reader: BufferedReader::new(read),
            builder: GameBuilder::new(name.into()),
        }
    }
}

impl PgnGameSource<Box<dyn std::io::BufRead + Send>> {
    /// ファイル（`.gz` 可、`-` は標準入力）を開く
    pub fn open(path: &Path) -> Result<Self, FengenError> {
        let read = open_reader(path).map_err(|source| FengenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), read))
    }
}

impl<R: Read> GameSource for PgnGameSource<R> {
    fn next_game(&mut self) -> Result<Option<GameRecord>, FengenError> {
        let read = self.reader.read_game(&mut self.builder).map_err(|source| FengenError::Read {
            path: self.builder.source_name.clone().into(),
            source,
        })?;
        read.transpose()
    }
}

/// 1 局分の状態を組み立てる Visitor
struct GameBuilder {
    source_name: String,
    /// 現在読んでいる局の番号（1 始まり）
    game: u64,
    tags: Vec<(String, String)>,
    pos: Chess,
    positions: Vec<Chess>,
    comments: Vec<Vec<String>>,
    outcome: Option<Outcome>,
    error: Option<FengenError>,
}

impl GameBuilder {
    fn new(source_name: String) -> Self {
        Self {
            source_name,
            game: 0,
            tags: Vec::new(),
            pos: Chess::default(),
            positions: Vec::new(),
            comments: Vec::new(),
            outcome: None,
            error: None,
        }
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Visitor for GameBuilder {
    type Result = Result<GameRecord, FengenError>;

    fn begin_game(&mut self) {
        self.game += 1;
        self.tags.clear();
        self.pos = Chess::default();
        self.positions.clear();
        self.comments.clear();
        self.outcome = None;
        self.error = None;
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let key = String::from_utf8_lossy(key).into_owned();
        let value = String::from_utf8_lossy(&value.decode()).into_owned();
        self.tags.push((key, value));
    }

    fn end_headers(&mut self) -> Skip {
        if let Some(fen) = self.tag("FEN") {
            match parse_fen(fen) {
                Ok(pos) => self.pos = pos,
                Err(source) => {
                    self.error = Some(FengenError::StartPosition {
                        source_name: self.source_name.clone(),
                        game: self.game,
                        source,
                    });
                }
            }
        }
        self.positions.push(self.pos.clone());
        Skip(self.error.is_some())
    }

    fn san(&mut self, san_plus: SanPlus) {
        if self.error.is_some() {
            return;
        }
        match san_plus.san.to_move(&self.pos) {
            Ok(mv) => {
                self.pos.play_unchecked(&mv);
                self.positions.push(self.pos.clone());
                self.comments.push(Vec::new());
            }
            Err(_) => {
                self.error = Some(FengenError::IllegalMove {
                    source_name: self.source_name.clone(),
                    game: self.game,
                    san: san_plus.to_string(),
                });
            }
        }
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        if let Some(last) = self.comments.last_mut() {
            let text = String::from_utf8_lossy(comment.as_bytes()).trim().to_string();
            last.push(text);
        }
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true)
    }

    fn outcome(&mut self, outcome: Option<Outcome>) {
        self.outcome = outcome;
    }

    fn end_game(&mut self) -> Self::Result {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        // 指し手部の終局記号を優先し、なければ Result タグを見る
        let outcome = match self.outcome {
            Some(o) => GameOutcome::from_outcome(Some(o)),
            None => self
                .tag("Result")
                .map_or(GameOutcome::Unknown, GameOutcome::from_result_tag),
        };
        Ok(GameRecord::new(
            std::mem::take(&mut self.tags),
            outcome,
            std::mem::take(&mut self.positions),
            std::mem::take(&mut self.comments),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::Termination;
    use shakmaty::Color;
    use std::io::Cursor;

    const TWO_GAMES: &str = r#"[Event "Test"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 {+0.30/14 0.5s} e5 {-0.25/13} 2. Nf3 (2. f4 {gambit} exf4) {0.40/15} Nc6 {book} 1-0

[Event "Test"]
[White "Carol"]
[Black "Dave"]
[Result "*"]

{opening comment} 1. d4 d5 *
"#;

    fn source(text: &str) -> PgnGameSource<Cursor<Vec<u8>>> {
        PgnGameSource::new("test.pgn", Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_reads_games_in_order() {
        let mut src = source(TWO_GAMES);

        let first = src.next_game().unwrap().unwrap();
        assert_eq!(first.outcome, GameOutcome::WhiteWon);
        assert_eq!(first.termination, Termination::Other);
        assert_eq!(first.player(Color::White), Some("Alice"));
        assert_eq!(first.positions.len(), 5);
        assert_eq!(first.comments.len(), 4);
        assert_eq!(first.comments[0], vec!["+0.30/14 0.5s".to_string()]);
        assert_eq!(first.comments[2], vec!["0.40/15".to_string()]);
        assert_eq!(first.comments[3], vec!["book".to_string()]);

        let second = src.next_game().unwrap().unwrap();
        assert_eq!(second.outcome, GameOutcome::Unknown);
        assert_eq!(second.player(Color::Black), Some("Dave"));
        assert_eq!(second.positions.len(), 3);
        assert!(second.comments.iter().all(Vec::is_empty));

        assert!(src.next_game().unwrap().is_none());
    }

    #[test]
    fn test_variation_is_skipped() {
        let mut src = source(TWO_GAMES);
        let game = src.next_game().unwrap().unwrap();
        // 本譜 2. Nf3 の後の局面に変化 2. f4 が混ざらない
        let after_nf3 = &game.positions[3];
        assert!(after_nf3.board().piece_at(shakmaty::Square::F3).is_some());
        assert!(after_nf3.board().piece_at(shakmaty::Square::F4).is_none());
    }

    #[test]
    fn test_checkmate_termination() {
        let mut src = source("[Result \"0-1\"]\n\n1. f3 e5 2. g4 Qh4# 0-1\n");
        let game = src.next_game().unwrap().unwrap();
        assert_eq!(game.outcome, GameOutcome::BlackWon);
        assert_eq!(game.termination, Termination::Checkmate);
    }

    #[test]
    fn test_result_tag_fallback() {
        let mut src = source("[Result \"1/2-1/2\"]\n\n1. e4 e5\n\n");
        let game = src.next_game().unwrap().unwrap();
        assert_eq!(game.outcome, GameOutcome::Draw);
    }

    #[test]
    fn test_fen_tag_sets_start_position() {
        let text = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n[Result \"*\"]\n\n1. e4 {0.10/5} *\n";
        let mut src = source(text);
        let game = src.next_game().unwrap().unwrap();
        assert_eq!(game.positions.len(), 2);
        assert_eq!(game.positions[0].board().occupied().count(), 3);
    }

    #[test]
    fn test_illegal_move_is_an_error() {
        let mut src = source("[Result \"1-0\"]\n\n1. e5 e5 1-0\n");
        let err = src.next_game().unwrap_err();
        assert!(matches!(err, FengenError::IllegalMove { game: 1, .. }), "{err}");
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = PgnGameSource::open(Path::new("/nonexistent/games.pgn")).err().unwrap();
        assert!(matches!(err, FengenError::Read { .. }));
    }
}
