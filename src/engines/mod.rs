pub mod contest;
pub mod mutation;
pub mod population;

pub use contest::{point_advantage, SolvedGames};
pub use mutation::{get_child, mutate_once};
pub use population::{Population, StepRecord};
