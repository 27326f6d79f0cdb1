use std::io::{self, BufRead, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::constants::{DEFAULT_COLS, DEFAULT_ROWS};
use shared::shared_sixseven_game::{Direction, GameStatus, SixSevenGame};

fn parse_direction(input: &str) -> Option<Direction> {
    match input.trim().to_lowercase().as_str() {
        "up" | "u" => Some(Direction::Up),
        "down" | "d" => Some(Direction::Down),
        "left" | "l" => Some(Direction::Left),
        "right" | "r" => Some(Direction::Right),
        _ => None,
    }
}

fn main() -> io::Result<()> {
    let mut game = SixSevenGame::new(DEFAULT_ROWS, DEFAULT_COLS);
    let mut rng = StdRng::from_entropy();
    let stdin = io::stdin();

    loop {
        game.generate_tiles(&mut rng);
        println!("{}", game);

        match game.status() {
            GameStatus::Won => {
                println!("Congratulations! You win after {} rounds.", game.round());
                return Ok(());
            }
            GameStatus::Lost => {
                println!("Game over after {} rounds.", game.round());
                return Ok(());
            }
            GameStatus::Active => {}
        }

        let valid_moves = game.valid_moves();
        loop {
            print!("Enter a move (up/down/left/right): ");
            io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            match parse_direction(&line) {
                Some(direction) if valid_moves.contains(&direction) => {
                    game.apply_move(direction).expect("validated move must apply");
                    break;
                }
                _ => println!("{} is not a legal move!", line.trim()),
            }
        }
    }
}
