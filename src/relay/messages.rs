//! Relay wire messages.
//!
//! Messages are `|`-separated fields; on the wire each one is followed by a
//! `\` terminator. JSON payloads (position list, room table) go through
//! serde_json.

use std::fmt;
use std::str::FromStr;

use crate::engine::transport::SquarePair;
use crate::engine::types::{ChessError, Color};

/// Frame terminator.
pub const FRAME_END: char = '\\';

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

/// How a connection takes part in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    Spectator,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Player => "p",
            Role::Spectator => "s",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "p" => Some(Role::Player),
            "s" => Some(Role::Spectator),
            _ => None,
        }
    }
}

/// Room-level requests a player can make of the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Undo,
    Tie,
}

impl CommandKind {
    fn as_str(self) -> &'static str {
        match self {
            CommandKind::Undo => "undo",
            CommandKind::Tie => "tie",
        }
    }
}

/// The relay's answer to an undo or tie request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Both sides asked; undo carries the side whose request completed it.
    Accepted(Option<Color>),
    /// The opponent asked and is waiting for agreement.
    Requested,
    /// A move was played before the other side agreed.
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Client → relay: `command|/undo`, `command|/tie`, `command|/forfeit`.
    RequestUndo,
    RequestTie,
    RequestForfeit,
    /// Relay → clients.
    Verdict(CommandKind, Verdict),
    /// Relay → clients: `command|forfeit|<side that resigned>`.
    Forfeited(Color),
}

/// One relay message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// `p|<pair>`: a move played by the peer.
    PeerMove(SquarePair),
    /// `ai|<pair>`: a move suggested by the local engine.
    EngineMove(SquarePair),
    /// `join|<room id>`: ask the relay to place us in a room.
    JoinRoom(u32),
    /// `join|<role>`: someone joined our room.
    Joined(Role),
    /// `fen|<json list>|<bool>`: full position history and whether the
    /// recipient plays White.
    FenSync {
        positions: Vec<String>,
        recipient_plays_white: bool,
    },
    Command(Command),
    /// `quit` from a client, `quit|<role>` from the relay.
    Quit(Option<Role>),
    /// `rooms`: ask for the room table.
    Rooms,
    /// `room_info|<json [[index, occupants], ...]>`.
    RoomInfo(Vec<(u32, u32)>),
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn unsupported(text: &str, why: impl fmt::Display) -> ChessError {
    ChessError::UnsupportedNotation(format!("relay message '{text}': {why}"))
}

fn color_code(color: Color) -> &'static str {
    match color {
        Color::White => "w",
        Color::Black => "b",
    }
}

fn parse_color(text: &str, s: &str) -> Result<Color, ChessError> {
    match s {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(unsupported(text, format!("bad side '{s}'"))),
    }
}

fn parse_verdict(text: &str, fields: &[&str]) -> Result<Verdict, ChessError> {
    match fields {
        ["a"] => Ok(Verdict::Accepted(None)),
        ["a", side] => Ok(Verdict::Accepted(Some(parse_color(text, side)?))),
        ["r"] => Ok(Verdict::Requested),
        ["d"] => Ok(Verdict::Declined),
        _ => Err(unsupported(text, "bad verdict")),
    }
}

fn parse_command(text: &str, fields: &[&str]) -> Result<Command, ChessError> {
    match fields {
        ["/undo"] => Ok(Command::RequestUndo),
        ["/tie"] => Ok(Command::RequestTie),
        ["/forfeit"] => Ok(Command::RequestForfeit),
        ["undo", rest @ ..] => Ok(Command::Verdict(
            CommandKind::Undo,
            parse_verdict(text, rest)?,
        )),
        ["tie", rest @ ..] => Ok(Command::Verdict(
            CommandKind::Tie,
            parse_verdict(text, rest)?,
        )),
        ["forfeit", side] => Ok(Command::Forfeited(parse_color(text, side)?)),
        _ => Err(unsupported(text, "unknown command")),
    }
}

impl FromStr for RelayMessage {
    type Err = ChessError;

    /// Decode one message (without its terminator).
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = text.split('|').collect();
        match fields.as_slice() {
            ["p", pair] => Ok(RelayMessage::PeerMove(SquarePair::parse(pair)?)),
            ["ai", pair] => Ok(RelayMessage::EngineMove(SquarePair::parse(pair)?)),
            ["join", arg] => match Role::parse(arg) {
                Some(role) => Ok(RelayMessage::Joined(role)),
                None => arg
                    .parse()
                    .map(RelayMessage::JoinRoom)
                    .map_err(|e| unsupported(text, e)),
            },
            ["fen", list, flag] => {
                let positions: Vec<String> =
                    serde_json::from_str(list).map_err(|e| unsupported(text, e))?;
                let recipient_plays_white: bool =
                    serde_json::from_str(flag).map_err(|e| unsupported(text, e))?;
                Ok(RelayMessage::FenSync {
                    positions,
                    recipient_plays_white,
                })
            }
            ["command", rest @ ..] => Ok(RelayMessage::Command(parse_command(text, rest)?)),
            ["quit"] => Ok(RelayMessage::Quit(None)),
            ["quit", role] => Role::parse(role)
                .map(|r| RelayMessage::Quit(Some(r)))
                .ok_or_else(|| unsupported(text, "bad role")),
            ["rooms"] => Ok(RelayMessage::Rooms),
            ["room_info", table] => serde_json::from_str(table)
                .map(RelayMessage::RoomInfo)
                .map_err(|e| unsupported(text, e)),
            _ => Err(unsupported(text, "unknown message kind")),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

impl fmt::Display for RelayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayMessage::PeerMove(pair) => write!(f, "p|{pair}"),
            RelayMessage::EngineMove(pair) => write!(f, "ai|{pair}"),
            RelayMessage::JoinRoom(id) => write!(f, "join|{id}"),
            RelayMessage::Joined(role) => write!(f, "join|{}", role.as_str()),
            RelayMessage::FenSync {
                positions,
                recipient_plays_white,
            } => {
                let list = serde_json::to_string(positions).map_err(|_| fmt::Error)?;
                write!(f, "fen|{list}|{recipient_plays_white}")
            }
            RelayMessage::Command(cmd) => match cmd {
                Command::RequestUndo => write!(f, "command|/undo"),
                Command::RequestTie => write!(f, "command|/tie"),
                Command::RequestForfeit => write!(f, "command|/forfeit"),
                Command::Verdict(kind, verdict) => {
                    write!(f, "command|{}|", kind.as_str())?;
                    match verdict {
                        Verdict::Accepted(None) => write!(f, "a"),
                        Verdict::Accepted(Some(side)) => write!(f, "a|{}", color_code(*side)),
                        Verdict::Requested => write!(f, "r"),
                        Verdict::Declined => write!(f, "d"),
                    }
                }
                Command::Forfeited(side) => write!(f, "command|forfeit|{}", color_code(*side)),
            },
            RelayMessage::Quit(None) => write!(f, "quit"),
            RelayMessage::Quit(Some(role)) => write!(f, "quit|{}", role.as_str()),
            RelayMessage::Rooms => write!(f, "rooms"),
            RelayMessage::RoomInfo(table) => {
                let json = serde_json::to_string(table).map_err(|_| fmt::Error)?;
                write!(f, "room_info|{json}")
            }
        }
    }
}

impl RelayMessage {
    /// The message followed by the frame terminator.
    pub fn to_frame(&self) -> String {
        format!("{self}{FRAME_END}")
    }
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Accumulates raw text and yields complete frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received text and return every frame it completed. Empty
    /// frames are skipped; an unterminated tail is kept for the next call.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let mut frames = Vec::new();
        while let Some(end) = self.pending.find(FRAME_END) {
            let frame: String = self.pending.drain(..=end).collect();
            let body = &frame[..frame.len() - FRAME_END.len_utf8()];
            if !body.is_empty() {
                frames.push(body.to_string());
            }
        }
        frames
    }

    /// Text received after the last terminator.
    pub fn remainder(&self) -> &str {
        &self.pending
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
