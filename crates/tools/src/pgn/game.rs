use shakmaty::{Chess, Color, Outcome, Position};

/// 対局結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWon,
    BlackWon,
    Draw,
    /// `*` や結果なし
    Unknown,
}

impl GameOutcome {
    pub fn from_outcome(outcome: Option<Outcome>) -> Self {
        match outcome {
            Some(Outcome::Decisive {
                winner: Color::White,
            }) => GameOutcome::WhiteWon,
            Some(Outcome::Decisive {
                winner: Color::Black,
            }) => GameOutcome::BlackWon,
            Some(Outcome::Draw) => GameOutcome::Draw,
            None => GameOutcome::Unknown,
        }
    }

    /// `Result` タグの値から判定する
    pub fn from_result_tag(value: &str) -> Self {
        match value.trim() {
            "1-0" => GameOutcome::WhiteWon,
            "0-1" => GameOutcome::BlackWon,
            "1/2-1/2" => GameOutcome::Draw,
            _ => GameOutcome::Unknown,
        }
    }
}

/// 終局の仕方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Other,
}

/// 1 局分の棋譜
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// タグ（出現順）
    pub tags: Vec<(String, String)>,
    pub outcome: GameOutcome,
    pub termination: Termination,
    /// 到達局面。`positions[0]` は開始局面
    pub positions: Vec<Chess>,
    /// 手ごとのコメント。`comments[i]` は `positions[i + 1]` を生んだ手に付く
    pub comments: Vec<Vec<String>>,
}

impl GameRecord {
    /// 開始局面と以降の局面列から棋譜を組み立てる。終局の仕方は最終局面から決める
    pub fn new(
        tags: Vec<(String, String)>,
        outcome: GameOutcome,
        positions: Vec<Chess>,
        comments: Vec<Vec<String>>,
    ) -> Self {
        let termination = match positions.last() {
            Some(last) if positions.len() > 1 && last.is_checkmate() => Termination::Checkmate,
            _ => Termination::Other,
        };
        Self {
            tags,
            outcome,
            termination,
            positions,
            comments,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 指定した手番のプレイヤー名（`White` / `Black` タグ）
    pub fn player(&self, color: Color) -> Option<&str> {
        self.tag(color.fold_wb("White", "Black"))
    }

    /// `ply` 番目（0 始まり）の手に付いたコメントを空白でつないだもの
    pub fn comment_text(&self, ply: usize) -> Option<String> {
        let comments = self.comments.get(ply)?;
        if comments.is_empty() {
            return None;
        }
        Some(comments.join(" "))
    }
}
