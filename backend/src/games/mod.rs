pub mod backend_sixseven_game;
