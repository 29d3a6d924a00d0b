//! **mazewalker** generates perfect mazes and walks them with a right-hand wall follower,
//! pacing the walk at a fixed tick rate and starting over with a fresh maze when the goal is
//! reached.

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod grid_iterators;
pub mod navigator;
pub mod pathing;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod units;
mod utils;
