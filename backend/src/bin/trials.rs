use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::constants::{DEFAULT_COLS, DEFAULT_ROWS};
use shared::shared_sixseven_game::{GameStatus, SixSevenGame};

const MAX_TURNS_PER_GAME: u32 = 1000;

/// Plays one game with a uniformly random bot. Returns whether it won and
/// how many rounds it took.
fn auto_play(rows: usize, cols: usize, rng: &mut impl Rng) -> (bool, u32) {
    let mut game = SixSevenGame::new(rows, cols);

    loop {
        game.generate_tiles(rng);
        match game.status() {
            GameStatus::Won => return (true, game.round()),
            GameStatus::Lost => return (false, game.round()),
            GameStatus::Active => {}
        }
        if game.round() >= MAX_TURNS_PER_GAME {
            return (false, game.round());
        }

        let valid_moves = game.valid_moves();
        // An active game always has at least one valid move.
        let direction = *valid_moves.choose(rng).expect("active game has a valid move");
        game.apply_move(direction).expect("validated move must apply");
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let num_trials: u32 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1000);
    let mut rng = match args.next().and_then(|arg| arg.parse::<u64>().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut total_rounds = 0u64;
    let mut win_rounds = 0u64;

    for _ in 0..num_trials {
        let (won, rounds) = auto_play(DEFAULT_ROWS, DEFAULT_COLS, &mut rng);
        if won {
            wins += 1;
            win_rounds += rounds as u64;
        } else {
            losses += 1;
        }
        total_rounds += rounds as u64;
    }

    println!(
        "Wins: {}, Losses: {}, Average number of rounds: {}, Total win rounds: {}",
        wins,
        losses,
        total_rounds as f64 / num_trials as f64,
        win_rounds
    );
}
