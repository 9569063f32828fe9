use crate::engine::board::STARTING_FEN;
use crate::engine::game::Game;
use crate::engine::types::Color;

/// Which engine adapter, if any, plays one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    None,
    Random,
}

impl EngineKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(EngineKind::None),
            "random" => Some(EngineKind::Random),
            _ => None,
        }
    }
}

/// Session configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Position the session starts from.
    pub start_fen: String,
    pub engine: EngineKind,
    /// Side the engine plays when one is configured.
    pub engine_side: Color,
    /// Fixed RNG seed for the random engine; entropy when unset.
    pub engine_seed: Option<u64>,
    pub white_name: String,
    pub black_name: String,
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Values that
    /// do not parse fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = SessionConfig::default();
        SessionConfig {
            start_fen: lookup("CHESS_START_FEN")
                .filter(|fen| Game::from_fen(fen).is_ok())
                .unwrap_or(defaults.start_fen),
            engine: lookup("CHESS_ENGINE")
                .and_then(|v| EngineKind::parse(&v))
                .unwrap_or(defaults.engine),
            engine_side: lookup("CHESS_ENGINE_SIDE")
                .and_then(|v| Color::from_str_loose(v.trim()))
                .unwrap_or(defaults.engine_side),
            engine_seed: lookup("CHESS_ENGINE_SEED").and_then(|v| v.trim().parse().ok()),
            white_name: lookup("CHESS_WHITE_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.white_name),
            black_name: lookup("CHESS_BLACK_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.black_name),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            start_fen: STARTING_FEN.to_string(),
            engine: EngineKind::None,
            engine_side: Color::Black,
            engine_seed: None,
            white_name: "Player".to_string(),
            black_name: "Player".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.start_fen, STARTING_FEN);
        assert_eq!(config.engine, EngineKind::None);
        assert_eq!(config.engine_side, Color::Black);
        assert_eq!(config.engine_seed, None);
        assert_eq!(config.white_name, "Player");
        assert_eq!(config.black_name, "Player");
    }

    #[test]
    fn reads_every_variable() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("CHESS_START_FEN", "4k3/8/8/8/8/8/8/4K3 b - - 0 1"),
            ("CHESS_ENGINE", "Random"),
            ("CHESS_ENGINE_SIDE", "white"),
            ("CHESS_ENGINE_SEED", "99"),
            ("CHESS_WHITE_NAME", "Ana"),
            ("CHESS_BLACK_NAME", "Ben"),
        ]));
        assert_eq!(config.start_fen, "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(config.engine, EngineKind::Random);
        assert_eq!(config.engine_side, Color::White);
        assert_eq!(config.engine_seed, Some(99));
        assert_eq!(config.white_name, "Ana");
        assert_eq!(config.black_name, "Ben");
    }

    #[test]
    fn bad_values_fall_back() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("CHESS_START_FEN", "not a fen"),
            ("CHESS_ENGINE", "stockfish"),
            ("CHESS_ENGINE_SIDE", "purple"),
            ("CHESS_ENGINE_SEED", "-3"),
            ("CHESS_WHITE_NAME", "  "),
        ]));
        assert_eq!(config.start_fen, STARTING_FEN);
        assert_eq!(config.engine, EngineKind::None);
        assert_eq!(config.engine_side, Color::Black);
        assert_eq!(config.engine_seed, None);
        assert_eq!(config.white_name, "Player");
    }

    #[test]
    fn from_env_without_variables() {
        let config = SessionConfig::from_lookup(|_| None);
        assert_eq!(config.start_fen, STARTING_FEN);
        assert_eq!(config.engine, EngineKind::None);
    }
}
