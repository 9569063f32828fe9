pub mod engine;

pub use engine::{EngineAdapter, RandomEngine, ScriptedEngine};
