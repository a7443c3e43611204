use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Action, Board, Holes, Move, Position, Side};

/// Identifies one connected client.
///
/// Serialized as a number, but also accepted as a string, since it is used as
/// a JSON object key in [`ServerEvent::PlayerJoined`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = ConnectionId;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a connection id")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ConnectionId(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map(ConnectionId).map_err(E::custom)
            }
        }

        // Not deserialize_u64(), because map keys arrive as strings
        deserializer.deserialize_any(IdVisitor)
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The long, unguessable id of a game session.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of characters in a join code.
pub const GAME_CODE_LEN: usize = 6;

/// Events sent by a client.
///
/// Every event is a JSON object whose `"type"` field names the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Open a new session.
    ///
    /// The reply is a [`ServerEvent::GameCreated`].
    CreateGame,
    /// Take a seat in the session with the given join code.
    ///
    /// The reply is a [`ServerEvent::GameJoined`], or an [`ServerEvent::Error`].
    JoinGame { game_code: String },
    /// Signal that this connection wants to start.
    ///
    /// Once both seats are ready, everyone receives a [`ServerEvent::GameStarted`].
    PlayerReady { game_id: GameId },
    /// Play a move.
    ///
    /// Everyone receives a [`ServerEvent::MoveApplied`] or [`ServerEvent::GameOver`],
    /// unless it is rejected with an [`ServerEvent::InvalidMove`] to the sender.
    MakeMove {
        game_id: GameId,
        from: Position,
        to: Position,
        action: Action,
    },
}

impl ClientEvent {
    pub fn make_move(game_id: GameId, mv: Move) -> Self {
        ClientEvent::MakeMove {
            game_id,
            from: mv.from,
            to: mv.to,
            action: mv.action,
        }
    }
}

/// A seated player as listed in [`ServerEvent::PlayerJoined`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: ConnectionId,
    pub side: Side,
    pub ready: bool,
}

/// Events sent by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    GameCreated {
        game_id: GameId,
        game_code: String,
    },
    GameJoined {
        game_id: GameId,
        player_side: Side,
        board: Board,
    },
    /// Sent to every member of a session when its seats change.
    PlayerJoined {
        players: BTreeMap<ConnectionId, PlayerInfo>,
        can_start: bool,
    },
    GameStarted {
        board: Board,
        holes: Holes,
        current_turn: Side,
    },
    MoveApplied {
        board: Board,
        holes: Holes,
        current_turn: Side,
    },
    /// Replaces [`ServerEvent::MoveApplied`] for the move that ended the game.
    GameOver {
        winner: Side,
        board: Board,
        holes: Holes,
    },
    InvalidMove {
        message: String,
    },
    Error {
        message: String,
    },
    /// Another member left the session.
    PlayerLeft,
}

/// Writes one event as a single line of JSON.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Reads one line and decodes it.
///
/// Returns `Ok(None)` at the end of the stream. Blank lines are skipped.
/// `buf` is a re-usable buffer and is cleared before reading.
pub fn read_message<R: BufRead, T: DeserializeOwned>(
    reader: &mut R,
    buf: &mut String,
) -> anyhow::Result<Option<T>> {
    loop {
        buf.clear(); // because read_line() appends to the buffer
        if reader.read_line(buf)? == 0 {
            return Ok(None);
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        return Ok(Some(serde_json::from_str(line)?));
    }
}
