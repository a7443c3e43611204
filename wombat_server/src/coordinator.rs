use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use tracing::{debug, info, warn};
use wombat::{ClientEvent, ConnectionId, GameId, Move, ServerEvent, GAME_CODE_LEN};

use crate::{Config, GameSession, MoveOutcome, SessionError};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Events to deliver, in order, each to one connection.
pub type Deliveries = Vec<(ConnectionId, ServerEvent)>;

/// The authority over all sessions.
///
/// This is a plain state machine without any I/O: every inbound event is
/// handled to completion and produces the events to send out.
pub struct Coordinator {
    config: Config,
    sessions: BTreeMap<GameId, GameSession>,
    codes: HashMap<String, GameId>,
    /// Which session each connection is a member of.
    memberships: HashMap<ConnectionId, GameId>,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sessions: BTreeMap::new(),
            codes: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    pub fn session(&self, game_id: &GameId) -> Option<&GameSession> {
        self.sessions.get(game_id)
    }

    pub fn session_by_code(&self, code: &str) -> Option<&GameSession> {
        self.codes
            .get(&code.to_ascii_uppercase())
            .and_then(|id| self.sessions.get(id))
    }

    pub fn num_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Handles one event from `conn`.
    ///
    /// Failures are reported to the sender only, stale events are dropped.
    pub fn handle(&mut self, conn: ConnectionId, event: ClientEvent) -> Deliveries {
        let result = match event {
            ClientEvent::CreateGame => Ok(self.create_game(conn)),
            ClientEvent::JoinGame { game_code } => self.join_game(conn, &game_code),
            ClientEvent::PlayerReady { game_id } => self.player_ready(conn, &game_id),
            ClientEvent::MakeMove {
                game_id,
                from,
                to,
                action,
            } => self.make_move(conn, &game_id, Move { from, to, action }),
        };
        match result {
            Ok(deliveries) => deliveries,
            Err(err) if err.is_silent() => {
                debug!(%conn, %err, "Ignoring event");
                Vec::new()
            }
            Err(SessionError::IllegalMove(err)) => {
                debug!(%conn, %err, "Rejected move");
                vec![(
                    conn,
                    ServerEvent::InvalidMove {
                        message: err.to_string(),
                    },
                )]
            }
            Err(err) => {
                debug!(%conn, %err, "Rejected event");
                vec![(
                    conn,
                    ServerEvent::Error {
                        message: err.to_string(),
                    },
                )]
            }
        }
    }

    /// Opens a new session with `conn` as its first member.
    ///
    /// The creator is not seated; seats are taken with [`Self::join_game()`].
    pub fn create_game(&mut self, conn: ConnectionId) -> Deliveries {
        let mut deliveries = self.disconnect(conn);

        let code = self.fresh_code();
        let game_id = self.fresh_id();
        let mut session = GameSession::new(game_id.clone(), code.clone());
        session.add_member(conn);
        self.codes.insert(code.clone(), game_id.clone());
        self.sessions.insert(game_id.clone(), session);
        self.memberships.insert(conn, game_id.clone());
        info!(%conn, %game_id, %code, "Created game");

        deliveries.push((
            conn,
            ServerEvent::GameCreated {
                game_id,
                game_code: code,
            },
        ));
        deliveries
    }

    pub fn join_game(&mut self, conn: ConnectionId, code: &str) -> Result<Deliveries, SessionError> {
        let code = code.trim().to_ascii_uppercase();
        let game_id = self
            .codes
            .get(&code)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound { code: code.clone() })?;

        // Check before leaving the previous session, so a failed join changes nothing
        self.live_session(&game_id)?.side_for(conn)?;
        let mut deliveries = if self.memberships.get(&conn) != Some(&game_id) {
            self.disconnect(conn)
        } else {
            Vec::new()
        };

        let Some(session) = self.sessions.get_mut(&game_id) else {
            return Err(SessionError::StaleSession { game_id });
        };
        let already_seated = session.seat(conn).is_some();
        let side = session.take_seat(conn)?;
        self.memberships.insert(conn, game_id.clone());

        deliveries.push((
            conn,
            ServerEvent::GameJoined {
                game_id: game_id.clone(),
                player_side: side,
                board: session.state().board,
            },
        ));
        if !already_seated {
            info!(%conn, %game_id, %side, "Joined game");
            let event = ServerEvent::PlayerJoined {
                players: session.players(),
                can_start: session.can_start(),
            };
            deliveries.extend(broadcast(session, event));
        }
        Ok(deliveries)
    }

    pub fn player_ready(
        &mut self,
        conn: ConnectionId,
        game_id: &GameId,
    ) -> Result<Deliveries, SessionError> {
        let session = self.live_session(game_id)?;
        if !session.mark_ready(conn)? {
            debug!(%conn, %game_id, "Player ready");
            return Ok(Vec::new());
        }
        let state = *session.state();
        info!(%game_id, "Game started");
        let event = ServerEvent::GameStarted {
            board: state.board,
            holes: state.holes,
            current_turn: state.current_turn,
        };
        Ok(broadcast(session, event))
    }

    pub fn make_move(
        &mut self,
        conn: ConnectionId,
        game_id: &GameId,
        mv: Move,
    ) -> Result<Deliveries, SessionError> {
        let stalemate = self.config.stalemate;
        let session = self.live_session(game_id)?;
        let event = match session.play(conn, mv, stalemate)? {
            MoveOutcome::Continue(state) => {
                debug!(%conn, %game_id, %mv, "Move applied");
                ServerEvent::MoveApplied {
                    board: state.board,
                    holes: state.holes,
                    current_turn: state.current_turn,
                }
            }
            MoveOutcome::GameOver { winner, state } => {
                info!(%game_id, %winner, "Game over");
                ServerEvent::GameOver {
                    winner,
                    board: state.board,
                    holes: state.holes,
                }
            }
        };
        Ok(broadcast(session, event))
    }

    /// Detaches `conn` from its session, if any.
    ///
    /// The remaining members are told, and an empty session is discarded.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Deliveries {
        let Some(game_id) = self.memberships.remove(&conn) else {
            return Vec::new();
        };
        let Some(session) = self.sessions.get_mut(&game_id) else {
            warn!(%conn, %game_id, "Membership of a missing session");
            return Vec::new();
        };
        session.leave(conn);
        debug!(%conn, %game_id, "Left game");
        if session.is_empty() {
            info!(%game_id, "Discarding game");
            self.codes.remove(session.code());
            self.sessions.remove(&game_id);
            return Vec::new();
        }
        broadcast(session, ServerEvent::PlayerLeft)
    }

    fn live_session(&mut self, game_id: &GameId) -> Result<&mut GameSession, SessionError> {
        self.sessions
            .get_mut(game_id)
            .ok_or_else(|| SessionError::StaleSession {
                game_id: game_id.clone(),
            })
    }

    fn fresh_code(&mut self) -> String {
        loop {
            let code: String = (0..GAME_CODE_LEN)
                .map(|_| {
                    let idx = self.config.rng.gen_range(0..CODE_ALPHABET.len());
                    char::from(CODE_ALPHABET[idx])
                })
                .collect();
            if !self.codes.contains_key(&code) {
                break code;
            }
        }
    }

    fn fresh_id(&mut self) -> GameId {
        loop {
            let id = GameId(format!("{:032x}", self.config.rng.gen::<u128>()));
            if !self.sessions.contains_key(&id) {
                break id;
            }
        }
    }
}

fn broadcast(session: &GameSession, event: ServerEvent) -> Deliveries {
    session.members().map(|conn| (conn, event.clone())).collect()
}
