use serde::{Serialize, Deserialize};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::constants::{
    TARGET_VALUE, DEFAULT_OPERATOR_PROBABILITY, DEFAULT_TILES_PER_TURN,
    DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    /// Evaluates the operator with `lhs` on the left and `rhs` on the right.
    /// Subtraction is the only non-commutative case, so operand order matters.
    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Operator::Add => lhs.saturating_add(rhs),
            Operator::Subtract => lhs.saturating_sub(rhs),
            Operator::Multiply => lhs.saturating_mul(rhs),
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Number(i64),
    Operator(Operator),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn is_operator(self) -> bool {
        matches!(self, Cell::Operator(_))
    }

    /// Renders the cell the way the transport layer expects it: "" for an
    /// empty cell, the digit string for a number, the operator character
    /// otherwise.
    pub fn token(self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Operator(op) => op.token().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Fixed-size 2D board of cells. Dimensions are set at construction and never
/// change; structural equality between two grids is what move validity is
/// built on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Creates a `rows x cols` grid with every cell empty. Zero dimensions
    /// are a caller bug and panic.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        Self {
            rows,
            cols,
            cells: vec![vec![Cell::Empty; cols]; rows],
        }
    }

    /// Builds a grid from explicit rows. Rows must be non-empty and
    /// rectangular.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        assert!(!rows.is_empty() && !rows[0].is_empty(), "grid dimensions must be positive");
        let cols = rows[0].len();
        assert!(rows.iter().all(|r| r.len() == cols), "grid rows must have equal length");
        Self {
            rows: rows.len(),
            cols,
            cells: rows,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// All coordinates currently holding an empty cell, row-major.
    pub fn blank_positions(&self) -> Vec<(usize, usize)> {
        let mut blanks = Vec::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                if self.cells[i][j].is_empty() {
                    blanks.push((i, j));
                }
            }
        }
        blanks
    }

    /// Row-major token grid for transport to a display or observation layer.
    pub fn tokens(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.token()).collect())
            .collect()
    }

    fn column(&self, col: usize) -> Vec<Cell> {
        (0..self.rows).map(|row| self.cells[row][col]).collect()
    }

    /// Returns the grid that sliding in `direction` would produce, without
    /// touching `self`. Pure and total: no randomness, no mutation.
    pub fn collapsed(&self, direction: Direction) -> Grid {
        let mut result = Grid::new(self.rows, self.cols);
        match direction {
            Direction::Left => {
                for i in 0..self.rows {
                    let line = collapse_toward_start(&self.cells[i]);
                    result.cells[i] = pad_line(line, self.cols, false);
                }
            }
            Direction::Right => {
                for i in 0..self.rows {
                    let line = collapse_toward_end(&self.cells[i]);
                    result.cells[i] = pad_line(line, self.cols, true);
                }
            }
            Direction::Up => {
                for j in 0..self.cols {
                    let line = collapse_toward_start(&self.column(j));
                    let column = pad_line(line, self.rows, false);
                    for i in 0..self.rows {
                        result.cells[i][j] = column[i];
                    }
                }
            }
            Direction::Down => {
                for j in 0..self.cols {
                    let line = collapse_toward_end(&self.column(j));
                    let column = pad_line(line, self.rows, true);
                    for i in 0..self.rows {
                        result.cells[i][j] = column[i];
                    }
                }
            }
        }
        result
    }
}

fn remove_blanks(line: &[Cell]) -> Vec<Cell> {
    line.iter().copied().filter(|cell| !cell.is_empty()).collect()
}

/// Collapses runs of the same operator into a single occurrence: several
/// identical operator tiles landing in sequence act as one.
fn collapse_operator_runs(line: Vec<Cell>) -> Vec<Cell> {
    let mut result: Vec<Cell> = Vec::with_capacity(line.len());
    for cell in line {
        if cell.is_operator() && result.last() == Some(&cell) {
            continue;
        }
        result.push(cell);
    }
    result
}

/// Collapses a line toward its start. The input may contain blanks; the
/// output is dense and the caller pads the trailing side back to length.
///
/// A single left-to-right pass: whenever the next three cells form
/// Number-Operator-Number, they merge into one number and the scan jumps past
/// the triplet, so merge results are never re-merged within the same slide.
fn collapse_toward_start(line: &[Cell]) -> Vec<Cell> {
    let dense = collapse_operator_runs(remove_blanks(line));
    let mut result = Vec::with_capacity(dense.len());
    let mut i = 0;
    while i < dense.len() {
        if i + 2 < dense.len() {
            if let (Cell::Number(lhs), Cell::Operator(op), Cell::Number(rhs)) =
                (dense[i], dense[i + 1], dense[i + 2])
            {
                result.push(Cell::Number(op.apply(lhs, rhs)));
                i += 3;
                continue;
            }
        }
        result.push(dense[i]);
        i += 1;
    }
    result
}

/// Collapses a line toward its end. Not a mirror of [`collapse_toward_start`]
/// on the reversed line: the scan runs from the end but still evaluates with
/// the line's original left-to-right operand order, so subtraction behaves
/// identically in both directions.
fn collapse_toward_end(line: &[Cell]) -> Vec<Cell> {
    let dense = collapse_operator_runs(remove_blanks(line));
    let mut result = Vec::with_capacity(dense.len());
    let mut i = dense.len();
    while i > 0 {
        if i >= 3 {
            if let (Cell::Number(lhs), Cell::Operator(op), Cell::Number(rhs)) =
                (dense[i - 3], dense[i - 2], dense[i - 1])
            {
                result.push(Cell::Number(op.apply(lhs, rhs)));
                i -= 3;
                continue;
            }
        }
        result.push(dense[i - 1]);
        i -= 1;
    }
    result.reverse();
    result
}

fn pad_line(line: Vec<Cell>, len: usize, pad_start: bool) -> Vec<Cell> {
    let mut padding = vec![Cell::Empty; len - line.len()];
    if pad_start {
        padding.extend(line);
        padding
    } else {
        let mut line = line;
        line.append(&mut padding);
        line
    }
}

/// Tile generation settings plus the win/loss thresholds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    pub operators: Vec<Operator>,
    pub digits: Vec<i64>,
    /// Probability that a generated tile is an operator instead of a digit.
    pub operator_probability: f64,
    pub tiles_per_turn: usize,
    pub target: i64,
    /// Inclusive magnitude bounds for numbers; any number outside them loses
    /// the game. `None` disables the bound check.
    pub bounds: Option<(i64, i64)>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            operators: vec![Operator::Add, Operator::Subtract, Operator::Multiply],
            digits: (0..=9).collect(),
            operator_probability: DEFAULT_OPERATOR_PROBABILITY,
            tiles_per_turn: DEFAULT_TILES_PER_TURN,
            target: TARGET_VALUE,
            bounds: Some((DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// The requested direction would not change the grid. Nothing was
    /// mutated; the caller may pick another direction.
    InvalidMove,
    /// The game has already been won or lost and accepts no further moves.
    Finished,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::InvalidMove => write!(f, "not a legal move"),
            MoveError::Finished => write!(f, "game is already over"),
        }
    }
}

impl std::error::Error for MoveError {}

/// One game of SixSeven: the grid, a cache of its blank positions, the round
/// counter and the generation config. The blank cache is recomputed after
/// every committed slide and shrunk in lock-step during tile generation, so
/// it always matches the set of empty coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SixSevenGame {
    grid: Grid,
    blank_spaces: Vec<(usize, usize)>,
    round: u32,
    status: GameStatus,
    config: GameConfig,
}

/// Public representation of a game for frontend consumption.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PublicSixSevenGame {
    pub grid: Vec<Vec<String>>,
    pub round: u32,
    pub status: GameStatus,
}

impl SixSevenGame {
    /// Creates a game with every cell empty, round 1, default config.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_config(rows, cols, GameConfig::default())
    }

    pub fn with_config(rows: usize, cols: usize, config: GameConfig) -> Self {
        assert!(!config.operators.is_empty(), "config needs at least one operator");
        assert!(!config.digits.is_empty(), "config needs at least one digit");
        assert!(
            (0.0..=1.0).contains(&config.operator_probability),
            "operator probability must be within [0, 1]"
        );
        let grid = Grid::new(rows, cols);
        let blank_spaces = grid.blank_positions();
        Self {
            grid,
            blank_spaces,
            round: 1,
            status: GameStatus::Active,
            config,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn blank_spaces(&self) -> &[(usize, usize)] {
        &self.blank_spaces
    }

    /// Replaces the board wholesale, refreshing the blank cache and the
    /// status. Dimensions must match the game's. Intended for test fixtures
    /// and scripted scenarios.
    pub fn set_grid(&mut self, grid: Grid) {
        assert!(
            grid.rows() == self.grid.rows() && grid.cols() == self.grid.cols(),
            "grid dimensions are fixed for the lifetime of a game"
        );
        self.grid = grid;
        self.blank_spaces = self.grid.blank_positions();
        self.refresh_status();
    }

    /// Places up to `tiles_per_turn` new tiles at distinct randomly chosen
    /// blank positions, drawing an operator with the configured probability
    /// and a digit otherwise. No-op when the board is full or the game is
    /// over.
    pub fn generate_tiles(&mut self, rng: &mut impl Rng) {
        if self.status != GameStatus::Active {
            return;
        }
        let count = self.config.tiles_per_turn.min(self.blank_spaces.len());
        for _ in 0..count {
            let index = rng.gen_range(0..self.blank_spaces.len());
            let (row, col) = self.blank_spaces.swap_remove(index);
            let cell = if rng.gen_bool(self.config.operator_probability) {
                Cell::Operator(*self.config.operators.choose(rng).unwrap())
            } else {
                Cell::Number(*self.config.digits.choose(rng).unwrap())
            };
            self.grid.set(row, col, cell);
        }
        self.refresh_status();
    }

    /// The grid that sliding in `direction` would produce. Does not commit.
    pub fn collapsed(&self, direction: Direction) -> Grid {
        self.grid.collapsed(direction)
    }

    /// Directions whose collapse actually changes the grid.
    pub fn valid_moves(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&direction| self.grid.collapsed(direction) != self.grid)
            .collect()
    }

    /// Performs one slide: validates the direction against the current grid,
    /// commits the collapsed grid, refreshes the blank cache and advances the
    /// round. Rejection leaves the game untouched.
    pub fn apply_move(&mut self, direction: Direction) -> Result<(), MoveError> {
        if self.status != GameStatus::Active {
            return Err(MoveError::Finished);
        }
        let candidate = self.grid.collapsed(direction);
        if candidate == self.grid {
            return Err(MoveError::InvalidMove);
        }
        self.grid = candidate;
        self.blank_spaces = self.grid.blank_positions();
        self.round += 1;
        self.refresh_status();
        Ok(())
    }

    /// True iff any cell holds the target number.
    pub fn is_won(&self) -> bool {
        let target = self.config.target;
        (0..self.grid.rows()).any(|i| {
            (0..self.grid.cols()).any(|j| self.grid.get(i, j) == Cell::Number(target))
        })
    }

    /// True iff the game is not won and either no slide changes the grid or
    /// some number sits outside the configured bounds. Operators never count
    /// toward the bound check.
    pub fn is_lost(&self) -> bool {
        if self.is_won() {
            return false;
        }
        if self.valid_moves().is_empty() {
            return true;
        }
        match self.config.bounds {
            Some((lower, upper)) => (0..self.grid.rows()).any(|i| {
                (0..self.grid.cols()).any(|j| match self.grid.get(i, j) {
                    Cell::Number(n) => n < lower || n > upper,
                    _ => false,
                })
            }),
            None => false,
        }
    }

    /// Token grid, row-major: "" / digit string / operator character.
    pub fn serialize(&self) -> Vec<Vec<String>> {
        self.grid.tokens()
    }

    pub fn to_public(&self) -> PublicSixSevenGame {
        PublicSixSevenGame {
            grid: self.serialize(),
            round: self.round,
            status: self.status,
        }
    }

    // Terminal states are sticky: once Won or Lost, nothing rewrites them.
    fn refresh_status(&mut self) {
        if self.status != GameStatus::Active {
            return;
        }
        if self.is_won() {
            self.status = GameStatus::Won;
        } else if self.is_lost() {
            self.status = GameStatus::Lost;
        }
    }
}

impl fmt::Display for SixSevenGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.grid.rows() {
            for j in 0..self.grid.cols() {
                write!(f, "| {:^3} ", self.grid.get(i, j).token())?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn num(n: i64) -> Cell {
        Cell::Number(n)
    }

    fn op(operator: Operator) -> Cell {
        Cell::Operator(operator)
    }

    const E: Cell = Cell::Empty;

    #[test]
    fn new_grid_is_all_empty() {
        let grid = Grid::new(6, 7);
        assert_eq!(grid.blank_positions().len(), 42);
    }

    #[test]
    #[should_panic(expected = "grid dimensions must be positive")]
    fn zero_dimension_grid_panics() {
        Grid::new(0, 4);
    }

    #[test]
    fn shift_without_triplet_preserves_tokens() {
        let line = vec![E, num(3), E, op(Operator::Add), E, E];
        let collapsed = collapse_toward_start(&line);
        assert_eq!(collapsed, vec![num(3), op(Operator::Add)]);
    }

    #[test]
    fn merge_toward_start() {
        let grid = Grid::from_rows(vec![vec![num(2), op(Operator::Add), num(3), E, E]]);
        let expected = Grid::from_rows(vec![vec![num(5), E, E, E, E]]);
        assert_eq!(grid.collapsed(Direction::Left), expected);
    }

    #[test]
    fn merge_toward_end() {
        let grid = Grid::from_rows(vec![vec![num(2), op(Operator::Add), num(3), E, E]]);
        let expected = Grid::from_rows(vec![vec![E, E, E, E, num(5)]]);
        assert_eq!(grid.collapsed(Direction::Right), expected);
    }

    #[test]
    fn operator_run_collapses_before_merging() {
        let grid = Grid::from_rows(vec![vec![num(6), op(Operator::Add), op(Operator::Add), num(1)]]);
        let expected = Grid::from_rows(vec![vec![num(7), E, E, E]]);
        assert_eq!(grid.collapsed(Direction::Left), expected);
    }

    #[test]
    fn distinct_adjacent_operators_do_not_collapse() {
        let line = vec![num(6), op(Operator::Add), op(Operator::Subtract), num(1)];
        let collapsed = collapse_toward_start(&line);
        // No Number-Operator-Number triplet exists, so nothing merges.
        assert_eq!(collapsed, line);
    }

    #[test]
    fn subtraction_keeps_operand_order_in_both_directions() {
        let grid = Grid::from_rows(vec![vec![num(9), op(Operator::Subtract), num(4), E]]);
        let left = Grid::from_rows(vec![vec![num(5), E, E, E]]);
        let right = Grid::from_rows(vec![vec![E, E, E, num(5)]]);
        assert_eq!(grid.collapsed(Direction::Left), left);
        assert_eq!(grid.collapsed(Direction::Right), right);
    }

    #[test]
    fn merge_results_are_not_rescanned_within_one_slide() {
        // 1+2 merges to 3; the 3 must not immediately merge with "*4".
        let grid = Grid::from_rows(vec![vec![
            num(1),
            op(Operator::Add),
            num(2),
            op(Operator::Multiply),
            num(4),
        ]]);
        let expected = Grid::from_rows(vec![vec![num(3), op(Operator::Multiply), num(4), E, E]]);
        assert_eq!(grid.collapsed(Direction::Left), expected);
    }

    #[test]
    fn blanks_inside_a_line_do_not_block_merging() {
        let grid = Grid::from_rows(vec![vec![num(2), E, op(Operator::Multiply), E, num(3)]]);
        let expected = Grid::from_rows(vec![vec![num(6), E, E, E, E]]);
        assert_eq!(grid.collapsed(Direction::Left), expected);
    }

    #[test]
    fn columns_collapse_for_vertical_moves() {
        let grid = Grid::from_rows(vec![
            vec![num(2), E],
            vec![op(Operator::Add), E],
            vec![num(3), num(8)],
        ]);
        let up = Grid::from_rows(vec![
            vec![num(5), num(8)],
            vec![E, E],
            vec![E, E],
        ]);
        let down = Grid::from_rows(vec![
            vec![E, E],
            vec![E, E],
            vec![num(5), num(8)],
        ]);
        assert_eq!(grid.collapsed(Direction::Up), up);
        assert_eq!(grid.collapsed(Direction::Down), down);
    }

    #[test]
    fn collapse_is_idempotent() {
        let grid = Grid::from_rows(vec![
            vec![num(2), op(Operator::Add), num(3), E],
            vec![E, num(7), E, op(Operator::Multiply)],
        ]);
        for direction in Direction::ALL {
            let once = grid.collapsed(direction);
            assert_eq!(once.collapsed(direction), once);
        }
    }

    #[test]
    fn valid_moves_match_structural_inequality() {
        let mut game = SixSevenGame::new(3, 3);
        let mut grid = Grid::new(3, 3);
        grid.set(0, 0, num(4));
        game.set_grid(grid);
        for direction in Direction::ALL {
            let valid = game.valid_moves().contains(&direction);
            assert_eq!(valid, game.collapsed(direction) != *game.grid());
        }
        // A single tile in the corner can only move right or down.
        assert_eq!(game.valid_moves(), vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn invalid_move_is_rejected_without_mutation() {
        let mut game = SixSevenGame::new(2, 2);
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, num(4));
        game.set_grid(grid);
        let before = game.clone();
        assert_eq!(game.apply_move(Direction::Left), Err(MoveError::InvalidMove));
        assert_eq!(game, before);
    }

    #[test]
    fn committed_move_updates_blanks_and_round() {
        let mut game = SixSevenGame::new(2, 3);
        let mut grid = Grid::new(2, 3);
        grid.set(0, 2, num(4));
        game.set_grid(grid);
        assert_eq!(game.round(), 1);
        game.apply_move(Direction::Left).unwrap();
        assert_eq!(game.round(), 2);
        assert_eq!(game.grid().get(0, 0), num(4));
        assert_eq!(game.blank_spaces().len(), 5);
        assert!(!game.blank_spaces().contains(&(0, 0)));
    }

    #[test]
    fn win_detected_anywhere_and_only_for_target() {
        let mut game = SixSevenGame::new(3, 3);
        let mut grid = Grid::new(3, 3);
        grid.set(2, 1, num(66));
        game.set_grid(grid.clone());
        assert!(!game.is_won());
        grid.set(2, 1, num(67));
        game.set_grid(grid);
        assert!(game.is_won());
        assert_eq!(game.status(), GameStatus::Won);
    }

    #[test]
    fn loss_by_exhaustion() {
        // Fully packed with operators only: no triplet, no blank, no shift.
        let grid = Grid::from_rows(vec![
            vec![op(Operator::Add), op(Operator::Subtract)],
            vec![op(Operator::Subtract), op(Operator::Add)],
        ]);
        let mut game = SixSevenGame::new(2, 2);
        game.set_grid(grid);
        assert!(game.valid_moves().is_empty());
        assert!(game.is_lost());
        assert_eq!(game.status(), GameStatus::Lost);
    }

    #[test]
    fn loss_by_bound() {
        let mut game = SixSevenGame::new(2, 2);
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, num(1500));
        game.set_grid(grid);
        assert!(!game.valid_moves().is_empty());
        assert!(game.is_lost());
    }

    #[test]
    fn operators_never_count_toward_the_bound_check() {
        let mut config = GameConfig::default();
        config.bounds = Some((0, 10));
        let mut game = SixSevenGame::with_config(2, 2, config);
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, op(Operator::Multiply));
        grid.set(1, 1, num(5));
        game.set_grid(grid);
        assert!(!game.is_lost());
    }

    #[test]
    fn unbounded_config_ignores_magnitude() {
        let mut config = GameConfig::default();
        config.bounds = None;
        let mut game = SixSevenGame::with_config(2, 2, config);
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, num(5000));
        game.set_grid(grid);
        assert!(!game.is_lost());
    }

    #[test]
    fn terminal_game_refuses_moves() {
        let mut game = SixSevenGame::new(2, 2);
        let mut grid = Grid::new(2, 2);
        grid.set(0, 1, num(67));
        grid.set(1, 0, num(3));
        game.set_grid(grid);
        assert_eq!(game.status(), GameStatus::Won);
        let before = game.clone();
        assert_eq!(game.apply_move(Direction::Left), Err(MoveError::Finished));
        assert_eq!(game, before);
        let mut rng = StdRng::seed_from_u64(1);
        game.generate_tiles(&mut rng);
        assert_eq!(game, before);
    }

    #[test]
    fn tile_generation_fills_distinct_blanks() {
        let mut game = SixSevenGame::new(4, 4);
        let mut rng = StdRng::seed_from_u64(67);
        game.generate_tiles(&mut rng);
        // Exactly tiles_per_turn cells were filled, at distinct positions.
        assert_eq!(game.grid().blank_positions().len(), 14);
        assert_eq!(game.blank_spaces().len(), 14);
        // Cache matches the grid exactly after generation.
        let mut cached = game.blank_spaces().to_vec();
        cached.sort_unstable();
        let mut actual = game.grid().blank_positions();
        actual.sort_unstable();
        assert_eq!(cached, actual);
    }

    #[test]
    fn tile_generation_on_full_grid_is_a_noop() {
        let grid = Grid::from_rows(vec![
            vec![num(1), num(2)],
            vec![num(3), num(4)],
        ]);
        let mut game = SixSevenGame::new(2, 2);
        game.set_grid(grid.clone());
        let mut rng = StdRng::seed_from_u64(2);
        game.generate_tiles(&mut rng);
        assert_eq!(*game.grid(), grid);
    }

    #[test]
    fn tile_generation_is_capped_by_remaining_blanks() {
        let mut config = GameConfig::default();
        config.tiles_per_turn = 4;
        config.bounds = None;
        let mut game = SixSevenGame::with_config(1, 3, config);
        let mut grid = Grid::new(1, 3);
        grid.set(0, 0, num(1));
        game.set_grid(grid);
        let mut rng = StdRng::seed_from_u64(3);
        game.generate_tiles(&mut rng);
        assert!(game.blank_spaces().is_empty());
        assert_eq!(game.grid().blank_positions().len(), 0);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let mut a = SixSevenGame::new(5, 5);
        let mut b = SixSevenGame::new(5, 5);
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        a.generate_tiles(&mut rng_a);
        b.generate_tiles(&mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn operator_probability_extremes() {
        let mut config = GameConfig::default();
        config.operator_probability = 1.0;
        config.tiles_per_turn = 5;
        let mut game = SixSevenGame::with_config(3, 3, config);
        let mut rng = StdRng::seed_from_u64(7);
        game.generate_tiles(&mut rng);
        let operators = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .filter(|&(i, j)| game.grid().get(i, j).is_operator())
            .count();
        assert_eq!(operators, 5);

        let mut config = GameConfig::default();
        config.operator_probability = 0.0;
        config.tiles_per_turn = 5;
        let mut game = SixSevenGame::with_config(3, 3, config);
        let mut rng = StdRng::seed_from_u64(7);
        game.generate_tiles(&mut rng);
        let numbers = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .filter(|&(i, j)| matches!(game.grid().get(i, j), Cell::Number(_)))
            .count();
        assert_eq!(numbers, 5);
    }

    #[test]
    fn serialization_tokens() {
        let grid = Grid::from_rows(vec![vec![E, num(8), op(Operator::Multiply), num(-3)]]);
        let mut game = SixSevenGame::new(1, 4);
        game.set_grid(grid);
        assert_eq!(
            game.serialize(),
            vec![vec!["".to_string(), "8".to_string(), "*".to_string(), "-3".to_string()]]
        );
    }

    #[test]
    fn public_state_mirrors_the_game() {
        let mut game = SixSevenGame::new(2, 2);
        let mut rng = StdRng::seed_from_u64(5);
        game.generate_tiles(&mut rng);
        let public = game.to_public();
        assert_eq!(public.grid, game.serialize());
        assert_eq!(public.round, game.round());
        assert_eq!(public.status, game.status());
    }

    #[test]
    #[should_panic(expected = "grid dimensions are fixed")]
    fn set_grid_rejects_mismatched_dimensions() {
        let mut game = SixSevenGame::new(2, 2);
        game.set_grid(Grid::new(3, 3));
    }
}
