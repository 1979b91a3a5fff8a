//! 棋譜ソース
//!
//! 1 局分の棋譜を [`GameRecord`] として順に取り出す。

mod game;
mod reader;

pub use game::{GameOutcome, GameRecord, Termination};
pub use reader::PgnGameSource;

use crate::fengen::FengenError;

/// 棋譜を 1 局ずつ返すソース
pub trait GameSource {
    /// 次の棋譜。ソースが尽きたら `Ok(None)`
    fn next_game(&mut self) -> Result<Option<GameRecord>, FengenError>;
}

impl<S: GameSource + ?Sized> GameSource for Box<S> {
    fn next_game(&mut self) -> Result<Option<GameRecord>, FengenError> {
        (**self).next_game()
    }
}
