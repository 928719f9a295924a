mod finder;

pub use finder::{find_path, Viewport, CARDINAL_STEP_COST, DIAGONAL_STEP_COST};
