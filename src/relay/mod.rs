pub mod messages;

pub use messages::{Command, CommandKind, FrameBuffer, RelayMessage, Role, Verdict};
