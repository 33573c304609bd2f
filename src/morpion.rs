//! A richer single-player demo board than [`crate::board::LineWalk`] (ambient
//! addition, A2): a simplified variant of Morpion Solitaire, historically the
//! environment NRPA was first demonstrated on. A move draws a straight line
//! of five consecutive grid points in one of four directions, filling the
//! one currently-empty point in that line; a given (start point, direction)
//! line may be drawn at most once. The game ends when no such line exists;
//! the score is the number of lines drawn.
//!
//! This is not a full implementation of tournament Morpion Solitaire (it
//! skips the "touching" adjacency rule of the 5T variant) — it exists to
//! give the search a board with a large, collision-prone move-code space to
//! exercise against, not to be a competitive solver.

use crate::board::Board;
use crate::policy::MoveCode;

pub const GRID: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagUp,
    DiagDown,
}

const DIRECTIONS: [Direction; 4] = [
    Direction::Horizontal,
    Direction::Vertical,
    Direction::DiagUp,
    Direction::DiagDown,
];

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
            Self::DiagUp => (1, -1),
            Self::DiagDown => (1, 1),
        }
    }

    fn index(self) -> u32 {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
            Self::DiagUp => 2,
            Self::DiagDown => 3,
        }
    }
}

/// A line-draw move: the line's lowest-indexed point, its direction, and
/// which of the five points along it is the one being filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MorpionMove {
    start: (i32, i32),
    dir: Direction,
    fill: (i32, i32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MorpionBoard {
    occupied: Vec<bool>,
    drawn_lines: Vec<bool>,
    plies: usize,
}

fn in_bounds(p: (i32, i32)) -> bool {
    p.0 >= 0 && p.0 < GRID as i32 && p.1 >= 0 && p.1 < GRID as i32
}

fn cell_index(p: (i32, i32)) -> usize {
    p.1 as usize * GRID + p.0 as usize
}

fn line_index(start: (i32, i32), dir: Direction) -> usize {
    cell_index(start) * DIRECTIONS.len() + dir.index() as usize
}

impl MorpionBoard {
    fn occupied_at(&self, p: (i32, i32)) -> bool {
        in_bounds(p) && self.occupied[cell_index(p)]
    }

    fn line_drawn(&self, start: (i32, i32), dir: Direction) -> bool {
        self.drawn_lines[line_index(start, dir)]
    }

    /// Seeds the board with a small filled cross at the centre of the grid,
    /// the minimal starting shape that leaves room for lines in all four
    /// directions.
    fn seed_cross() -> Vec<bool> {
        let mut occupied = vec![false; GRID * GRID];
        let centre = GRID as i32 / 2;
        for d in -2..=2 {
            for &p in &[(centre + d, centre), (centre, centre + d)] {
                if in_bounds(p) {
                    occupied[cell_index(p)] = true;
                }
            }
        }
        occupied
    }
}

impl Default for MorpionBoard {
    fn default() -> Self {
        Self {
            occupied: Self::seed_cross(),
            drawn_lines: vec![false; GRID * GRID * DIRECTIONS.len()],
            plies: 0,
        }
    }
}

impl Board for MorpionBoard {
    type Move = MorpionMove;

    fn terminal(&self) -> bool {
        let mut scratch = Vec::new();
        self.generate_moves(&mut scratch);
        scratch.is_empty()
    }

    fn score(&self) -> f64 {
        self.plies as f64
    }

    fn length(&self) -> usize {
        self.plies
    }

    fn generate_moves(&self, out: &mut Vec<Self::Move>) {
        for y in 0..GRID as i32 {
            for x in 0..GRID as i32 {
                for &dir in &DIRECTIONS {
                    let (dx, dy) = dir.delta();
                    let start = (x, y);
                    let points: Vec<(i32, i32)> =
                        (0..5).map(|i| (x + dx * i, y + dy * i)).collect();
                    if !points.iter().all(|&p| in_bounds(p)) {
                        continue;
                    }
                    if self.line_drawn(start, dir) {
                        continue;
                    }
                    let empty: Vec<(i32, i32)> = points
                        .iter()
                        .copied()
                        .filter(|&p| !self.occupied_at(p))
                        .collect();
                    if empty.len() == 1 {
                        out.push(MorpionMove {
                            start,
                            dir,
                            fill: empty[0],
                        });
                    }
                }
            }
        }
    }

    fn play(&mut self, m: Self::Move) {
        self.occupied[cell_index(m.fill)] = true;
        self.drawn_lines[line_index(m.start, m.dir)] = true;
        self.plies += 1;
    }

    fn code(&self, m: Self::Move) -> MoveCode {
        line_index(m.start, m.dir) as MoveCode
    }

    fn max_legal_moves() -> usize {
        GRID * GRID * DIRECTIONS.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_board_has_legal_moves() {
        let board = MorpionBoard::default();
        let mut moves = Vec::new();
        board.generate_moves(&mut moves);
        assert!(!moves.is_empty());
        assert!(!board.terminal());
    }

    #[test]
    fn playing_a_move_increments_score_and_plies() {
        let mut board = MorpionBoard::default();
        let mut moves = Vec::new();
        board.generate_moves(&mut moves);
        let m = moves[0];
        let code_before = board.code(m);
        board.play(m);
        assert_eq!(board.length(), 1);
        assert_eq!(board.score(), 1.0);
        // the same (start, dir) line cannot be drawn twice
        let mut moves_after = Vec::new();
        board.generate_moves(&mut moves_after);
        assert!(moves_after
            .iter()
            .all(|&m2| board.code(m2) != code_before || m2.fill != m.fill));
    }

    #[test]
    fn playout_terminates() {
        let mut board = MorpionBoard::default();
        let mut moves = Vec::new();
        let mut guard = 0;
        while !board.terminal() {
            board.generate_moves(&mut moves);
            board.play(moves[0]);
            guard += 1;
            assert!(guard < GRID * GRID * DIRECTIONS.len() * 5, "runaway playout");
        }
    }
}
