pub mod constants;
pub mod shared_sixseven_game;
