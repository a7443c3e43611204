use wombat::{GameId, IllegalMove};

/// Why the coordinator rejected an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No live session has this code.
    SessionNotFound { code: String },
    /// Both seats are taken, or the game already started.
    SessionFull,
    /// The sender has no seat in the session.
    NotSeated,
    IllegalMove(IllegalMove),
    /// The event names a session that no longer exists.
    StaleSession { game_id: GameId },
}

impl SessionError {
    /// Stale events are dropped without telling anyone.
    pub fn is_silent(&self) -> bool {
        matches!(self, SessionError::StaleSession { .. })
    }
}

impl From<IllegalMove> for SessionError {
    fn from(err: IllegalMove) -> Self {
        SessionError::IllegalMove(err)
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::IllegalMove(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::SessionNotFound { code } => write!(f, "Game {} not found", code),
            SessionError::SessionFull => write!(f, "Game is full"),
            SessionError::NotSeated => write!(f, "You are not playing in this game"),
            SessionError::IllegalMove(err) => write!(f, "Invalid move: {}", err),
            SessionError::StaleSession { game_id } => {
                write!(f, "Game {} does not exist anymore", game_id)
            }
        }
    }
}
