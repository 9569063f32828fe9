//! A client-side game session.
//!
//! `Session` glues one [`Game`] to the relay wire and an optional engine
//! adapter. Inbound frames are decoded into a queue and applied one at a time
//! by [`Session::handle_next`]; everything the session wants to tell the relay
//! is queued outbound and collected with [`Session::drain_outbound`].

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::ai::engine::{EngineAdapter, RandomEngine};
use crate::config::{EngineKind, SessionConfig};
use crate::engine::game::{Commit, Game};
use crate::engine::pgn::{self, GameResult};
use crate::engine::transport::SquarePair;
use crate::engine::types::{ChessError, Color, PieceKind};
use crate::relay::messages::{Command, CommandKind, FrameBuffer, RelayMessage, Role, Verdict};

/// Whether a best-move request to the engine is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRequest {
    Idle,
    InFlight,
}

/// What handling one inbound message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PeerMoved(SquarePair),
    EngineMoved(SquarePair),
    PeerJoined(Role),
    /// The position was replaced by a sync; carries our side.
    Synced(Color),
    UndoTaken,
    Requested(CommandKind),
    Declined(CommandKind),
    GameEnded(GameResult),
    PeerLeft(Option<Role>),
    Rooms(Vec<(u32, u32)>),
    /// A client-to-relay message arrived here; nothing to do.
    Ignored,
}

pub struct Session {
    game: Game,
    engine: Option<Box<dyn EngineAdapter>>,
    engine_side: Color,
    request: EngineRequest,
    local_side: Color,
    frames: FrameBuffer,
    inbound: VecDeque<RelayMessage>,
    outbound: VecDeque<RelayMessage>,
    /// Set by resignation or an agreed draw.
    result: Option<GameResult>,
}

impl Session {
    /// A session over `game`. With an engine, the local side is the other
    /// colour; without one it is White until a sync says otherwise.
    pub fn new(game: Game, engine: Option<Box<dyn EngineAdapter>>, engine_side: Color) -> Self {
        let local_side = if engine.is_some() {
            !engine_side
        } else {
            Color::White
        };
        let mut session = Session {
            game,
            engine,
            engine_side,
            request: EngineRequest::Idle,
            local_side,
            frames: FrameBuffer::new(),
            inbound: VecDeque::new(),
            outbound: VecDeque::new(),
            result: None,
        };
        session.resync_engine();
        session
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, ChessError> {
        let mut game = Game::from_fen(&config.start_fen)?;
        game.white_player = config.white_name.clone();
        game.black_player = config.black_name.clone();
        let engine: Option<Box<dyn EngineAdapter>> = match config.engine {
            EngineKind::None => None,
            EngineKind::Random => Some(Box::new(match config.engine_seed {
                Some(seed) => RandomEngine::seeded(seed),
                None => RandomEngine::new(),
            })),
        };
        info!(
            engine = ?config.engine,
            engine_side = %config.engine_side,
            fen = %config.start_fen,
            "session created"
        );
        Ok(Self::new(game, engine, config.engine_side))
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn local_side(&self) -> Color {
        self.local_side
    }

    pub fn engine_request(&self) -> EngineRequest {
        self.request
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine.as_deref().map(|e| e.name())
    }

    /// True when an engine is attached, the game is live and it is the
    /// engine's turn.
    pub fn engine_to_move(&self) -> bool {
        self.engine.is_some()
            && !self.is_finished()
            && self.game.side_to_move() == self.engine_side
    }

    /// Explicit result if one was agreed, otherwise the board's verdict.
    pub fn result(&self) -> GameResult {
        self.result.unwrap_or_else(|| GameResult::from_game(&self.game))
    }

    pub fn is_finished(&self) -> bool {
        self.result() != GameResult::Ongoing
    }

    pub fn pgn(&self) -> String {
        pgn::to_pgn_with_result(&self.game, self.result())
    }

    // -----------------------------------------------------------------
    // Local input
    // -----------------------------------------------------------------

    /// Play a move typed locally, as a square pair or in SAN. The committed
    /// move is reported to the engine and queued for the peer.
    pub fn play_local(&mut self, text: &str) -> Result<Commit, ChessError> {
        self.ensure_live()?;
        let commit = match SquarePair::parse(text) {
            Ok(pair) => self
                .game
                .commit_move(pair.from, pair.to, pair.promotion)?,
            Err(_) => self.game.apply_san(text)?,
        };
        if let Commit::Played(record) = &commit {
            self.after_commit(record.pair);
            self.outbound.push_back(RelayMessage::PeerMove(record.pair));
        }
        Ok(commit)
    }

    /// Complete a pending promotion with `kind`.
    pub fn promote(&mut self, kind: PieceKind) -> Result<Commit, ChessError> {
        let (from, to) = self
            .game
            .pending_promotion()
            .ok_or_else(|| ChessError::RequestRefused("no promotion is pending".into()))?;
        self.play_local(&SquarePair::new(from, to, Some(kind)).to_string())
    }

    /// Take back moves without asking a peer: our last move, and the
    /// engine's reply first when the engine moved last. Returns how many
    /// plies were taken back.
    pub fn take_back(&mut self) -> Result<usize, ChessError> {
        let mut plies = 0;
        if self.engine.is_some()
            && self.request == EngineRequest::Idle
            && self.game.pending_promotion().is_none()
            && self.game.history().len() >= 2
            && self.game.side_to_move() == self.local_side
        {
            self.game.undo_last_move()?;
            plies += 1;
        }
        self.game.undo_last_move()?;
        plies += 1;
        self.result = None;
        self.resync_engine();
        Ok(plies)
    }

    pub fn request_undo(&mut self) {
        self.outbound
            .push_back(RelayMessage::Command(Command::RequestUndo));
    }

    pub fn offer_tie(&mut self) {
        self.outbound
            .push_back(RelayMessage::Command(Command::RequestTie));
    }

    pub fn forfeit(&mut self) {
        self.outbound
            .push_back(RelayMessage::Command(Command::RequestForfeit));
    }

    // -----------------------------------------------------------------
    // Engine
    // -----------------------------------------------------------------

    /// Ask the engine for a move. The suggestion is queued inbound as an
    /// `ai|` message and applied by [`Session::handle_next`]. Returns false
    /// without asking when no engine is attached or a request is already in
    /// flight.
    pub fn request_engine_move(&mut self) -> Result<bool, ChessError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(false);
        };
        if self.request == EngineRequest::InFlight {
            warn!(engine = engine.name(), "engine request already in flight");
            return Ok(false);
        }
        self.request = EngineRequest::InFlight;
        match engine.request_best_move() {
            Ok(pair) => {
                self.inbound.push_back(RelayMessage::EngineMove(pair));
                Ok(true)
            }
            Err(e) => {
                self.request = EngineRequest::Idle;
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------
    // Relay input
    // -----------------------------------------------------------------

    /// Feed raw relay text. Complete frames are decoded and queued; frames
    /// that do not decode are logged and dropped. Returns how many were
    /// queued.
    pub fn receive(&mut self, chunk: &str) -> usize {
        let mut queued = 0;
        for frame in self.frames.push(chunk) {
            match frame.parse::<RelayMessage>() {
                Ok(msg) => {
                    self.inbound.push_back(msg);
                    queued += 1;
                }
                Err(e) => warn!(%frame, error = %e, "dropping relay frame"),
            }
        }
        queued
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Apply the oldest inbound message. `None` when the queue is empty.
    pub fn handle_next(&mut self) -> Option<Result<SessionEvent, ChessError>> {
        let msg = self.inbound.pop_front()?;
        Some(self.handle(msg))
    }

    fn handle(&mut self, msg: RelayMessage) -> Result<SessionEvent, ChessError> {
        match msg {
            RelayMessage::PeerMove(pair) => {
                self.ensure_live()?;
                let played = self.game.apply_move(&pair.to_string())?;
                self.after_commit(played);
                Ok(SessionEvent::PeerMoved(played))
            }
            RelayMessage::EngineMove(pair) => {
                self.request = EngineRequest::Idle;
                self.ensure_live()?;
                let played = self.game.apply_move(&pair.to_string())?;
                self.after_commit(played);
                self.outbound.push_back(RelayMessage::PeerMove(played));
                Ok(SessionEvent::EngineMoved(played))
            }
            RelayMessage::Joined(role) => {
                self.outbound.push_back(RelayMessage::FenSync {
                    positions: self.game.position_history().to_vec(),
                    recipient_plays_white: self.local_side == Color::Black,
                });
                Ok(SessionEvent::PeerJoined(role))
            }
            RelayMessage::FenSync {
                positions,
                recipient_plays_white,
            } => {
                self.game.load_position_with_history(&positions)?;
                let fen = self.game.export_position();
                self.local_side = if recipient_plays_white {
                    Color::White
                } else {
                    Color::Black
                };
                self.result = None;
                self.request = EngineRequest::Idle;
                self.resync_engine();
                debug!(side = %self.local_side, %fen, "position synced");
                Ok(SessionEvent::Synced(self.local_side))
            }
            RelayMessage::Command(cmd) => self.handle_command(cmd),
            RelayMessage::Quit(role) => {
                info!(?role, "peer left");
                Ok(SessionEvent::PeerLeft(role))
            }
            RelayMessage::RoomInfo(table) => Ok(SessionEvent::Rooms(table)),
            other @ (RelayMessage::JoinRoom(_) | RelayMessage::Rooms) => {
                warn!(message = %other, "relay-bound message received");
                Ok(SessionEvent::Ignored)
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) -> Result<SessionEvent, ChessError> {
        match cmd {
            Command::Verdict(CommandKind::Undo, Verdict::Accepted(_)) => {
                self.game.undo_last_move()?;
                self.result = None;
                self.resync_engine();
                Ok(SessionEvent::UndoTaken)
            }
            Command::Verdict(CommandKind::Tie, Verdict::Accepted(_)) => {
                self.result = Some(GameResult::Draw);
                Ok(SessionEvent::GameEnded(GameResult::Draw))
            }
            Command::Verdict(kind, Verdict::Requested) => Ok(SessionEvent::Requested(kind)),
            Command::Verdict(kind, Verdict::Declined) => Ok(SessionEvent::Declined(kind)),
            Command::Forfeited(side) => {
                let result = GameResult::win_for(!side);
                self.result = Some(result);
                Ok(SessionEvent::GameEnded(result))
            }
            Command::RequestUndo | Command::RequestTie | Command::RequestForfeit => {
                warn!(command = ?cmd, "relay-bound command received");
                Ok(SessionEvent::Ignored)
            }
        }
    }

    // -----------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------

    /// Encoded frames for everything queued outbound, oldest first.
    pub fn drain_outbound(&mut self) -> Vec<String> {
        self.outbound.drain(..).map(|m| m.to_frame()).collect()
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    fn ensure_live(&self) -> Result<(), ChessError> {
        match self.result {
            Some(result) => Err(ChessError::RequestRefused(format!(
                "the game has ended ({})",
                result.as_str()
            ))),
            None => Ok(()),
        }
    }

    fn after_commit(&mut self, pair: SquarePair) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if let Err(e) = engine.notify_move(pair) {
            warn!(engine = engine.name(), %pair, error = %e, "engine rejected move; resyncing");
            self.resync_engine();
        }
    }

    fn resync_engine(&mut self) {
        let fen = self.game.export_position();
        if let Some(engine) = self.engine.as_mut()
            && let Err(e) = engine.set_position(&fen)
        {
            warn!(engine = engine.name(), %fen, error = %e, "engine refused position");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
