//! ポーン構造ハッシュ（Pawn Hash Table）
//!
//! ポーン配置だけで決まる評価項（二重歩・孤立歩・パスポーン）を、
//! 両陣営のポーンビットボードから作ったキーでキャッシュする。
//! スコアは常に白視点で格納する。

use shakmaty::{Board, Color, Piece, Role};

const FILE_A: u64 = 0x0101_0101_0101_0101;

/// 二重歩ペナルティ（1本あたり）
const DOUBLED: (i32, i32) = (-10, -20);
/// 孤立歩ペナルティ
const ISOLATED: (i32, i32) = (-12, -16);
/// パスポーンボーナス（自陣から数えた段）
const PASSED_MG: [i32; 8] = [0, 5, 10, 15, 25, 40, 60, 0];
const PASSED_EG: [i32; 8] = [0, 10, 20, 35, 55, 80, 110, 0];

/// ポーン構造評価（白視点、中盤/終盤）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PawnScore {
    pub mg: i32,
    pub eg: i32,
}

#[derive(Clone, Copy, Default)]
struct PawnEntry {
    key: u64,
    score: PawnScore,
    used: bool,
}

/// ポーン構造ハッシュテーブル
pub struct PawnHashTable {
    entries: Vec<PawnEntry>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl PawnHashTable {
    /// 新しいテーブルを作成（サイズはMB単位、エントリ数は2のべき乗に切り下げ）
    pub fn new(mb_size: usize) -> Self {
        let bytes = mb_size.max(1).saturating_mul(1024 * 1024);
        let count = (bytes / std::mem::size_of::<PawnEntry>()).max(2);
        let count = 1usize << (usize::BITS - 1 - count.leading_zeros());
        Self {
            entries: vec![PawnEntry::default(); count],
            mask: count - 1,
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// キャッシュを引き、無ければ計算して格納する
    pub fn probe(&mut self, board: &Board) -> PawnScore {
        let white = board.by_piece(Piece { color: Color::White, role: Role::Pawn }).0;
        let black = board.by_piece(Piece { color: Color::Black, role: Role::Pawn }).0;
        let key = pawn_key(white, black);
        let idx = (key as usize) & self.mask;

        let entry = &mut self.entries[idx];
        if entry.used && entry.key == key {
            self.hits += 1;
            return entry.score;
        }

        self.misses += 1;
        let score = evaluate_pawns(white, black);
        *entry = PawnEntry { key, score, used: true };
        score
    }
}

#[inline]
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn pawn_key(white: u64, black: u64) -> u64 {
    mix64(white) ^ mix64(black).rotate_left(32)
}

#[inline]
fn file_mask(file: usize) -> u64 {
    FILE_A << file
}

#[inline]
fn adjacent_files(file: usize) -> u64 {
    let mut mask = 0;
    if file > 0 {
        mask |= file_mask(file - 1);
    }
    if file < 7 {
        mask |= file_mask(file + 1);
    }
    mask
}

/// `rank` より前方（`color` の進行方向）にある段のマスク
#[inline]
fn ranks_ahead(color: Color, rank: usize) -> u64 {
    match color {
        Color::White if rank >= 7 => 0,
        Color::White => !0u64 << (8 * (rank + 1)),
        Color::Black => (1u64 << (8 * rank)) - 1,
    }
}

fn side_score(color: Color, own: u64, enemy: u64) -> PawnScore {
    let mut score = PawnScore::default();

    for file in 0..8 {
        let count = (own & file_mask(file)).count_ones() as i32;
        if count > 1 {
            score.mg += DOUBLED.0 * (count - 1);
            score.eg += DOUBLED.1 * (count - 1);
        }
    }

    let mut bb = own;
    while bb != 0 {
        let sq = bb.trailing_zeros() as usize;
        bb &= bb - 1;
        let (file, rank) = (sq % 8, sq / 8);

        if own & adjacent_files(file) == 0 {
            score.mg += ISOLATED.0;
            score.eg += ISOLATED.1;
        }

        let span = (file_mask(file) | adjacent_files(file)) & ranks_ahead(color, rank);
        if enemy & span == 0 {
            let relative = match color {
                Color::White => rank,
                Color::Black => 7 - rank,
            };
            score.mg += PASSED_MG[relative];
            score.eg += PASSED_EG[relative];
        }
    }
    score
}

/// ポーン構造を白視点で評価する
pub fn evaluate_pawns(white: u64, black: u64) -> PawnScore {
    let w = side_score(Color::White, white, black);
    let b = side_score(Color::Black, black, white);
    PawnScore { mg: w.mg - b.mg, eg: w.eg - b.eg }
}
