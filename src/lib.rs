//! Chess rules engine: board representation, legal move generation, game
//! state classification and FEN/SAN/square-pair notation, plus the relay
//! codec and session glue used by a networked client.

pub mod ai;
pub mod config;
pub mod engine;
pub mod relay;
pub mod session;
