// Public API - what other modules can use
pub use draw::{
    draw_polarity, DrawSource, RandomDrawSource, SeededDrawSource, SequenceDrawSource,
    POSITIVE_REACTION_CHANCE,
};
pub use simulator::{EngagementSimulator, ReactionTally, SimulationReport};

// Internal modules
pub mod draw;
pub mod simulator;
