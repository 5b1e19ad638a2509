//! Game engine for a community Battleship game, where anyone can fire one shot at a
//! shared board by opening an issue.
//!
//! The pieces fit together like this:
//!
//! - [`ships::generate_ships`] hides a fleet on an empty [`board::Board`].
//! - [`command::parse_move`] pulls the target cell out of the issue text.
//! - [`session::GameState::play_move`] runs the [`guard`] checks, resolves the shot with
//!   [`game::resolve`], and updates the [`stats`] and [`history`].
//! - Once every ship is sunk, [`session::close_round`] writes a [`archive::RoundArchive`]
//!   and hides a new fleet.
//! - [`store::FileStore`] keeps all of it on disk and [`render`] turns it into README
//!   sections and comments.

pub mod archive;
pub mod board;
pub mod command;
pub mod config;
pub mod game;
pub mod guard;
pub mod history;
pub mod render;
pub mod session;
pub mod ships;
pub mod stats;
pub mod store;
