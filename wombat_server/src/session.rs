use std::collections::{BTreeMap, BTreeSet};

use wombat::{
    ConnectionId, GameId, GameState, IllegalMove, Move, PlayerInfo, Side, StalemateRule, SIDES,
};

use crate::SessionError;

/// The life cycle of a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Fewer than two seats are taken.
    Lobby,
    /// Both seats are taken, waiting for both players to be ready.
    AwaitingReady,
    InProgress,
    Finished,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Seat {
    pub side: Side,
    pub ready: bool,
}

/// What a successful move led to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Continue(GameState),
    GameOver { winner: Side, state: GameState },
}

/// One game, owned by the coordinator.
///
/// Members are every connection in the broadcast room, seats are the members
/// that actually play.
#[derive(Clone, Debug)]
pub struct GameSession {
    id: GameId,
    code: String,
    members: BTreeSet<ConnectionId>,
    seats: BTreeMap<ConnectionId, Seat>,
    state: GameState,
    phase: Phase,
    winner: Option<Side>,
}

impl GameSession {
    pub fn new(id: GameId, code: String) -> Self {
        Self {
            id,
            code,
            members: BTreeSet::new(),
            seats: BTreeMap::new(),
            state: GameState::new(),
            phase: Phase::Lobby,
            winner: None,
        }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn seat(&self, conn: ConnectionId) -> Option<Seat> {
        self.seats.get(&conn).copied()
    }

    pub fn players(&self) -> BTreeMap<ConnectionId, PlayerInfo> {
        self.seats
            .iter()
            .map(|(&id, seat)| {
                let info = PlayerInfo {
                    id,
                    side: seat.side,
                    ready: seat.ready,
                };
                (id, info)
            })
            .collect()
    }

    pub fn can_start(&self) -> bool {
        self.seats.len() == SIDES.len()
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    pub fn add_member(&mut self, conn: ConnectionId) {
        self.members.insert(conn);
    }

    /// The side `conn` would get by joining, without changing anything.
    ///
    /// A connection that already holds a seat keeps it.
    pub fn side_for(&self, conn: ConnectionId) -> Result<Side, SessionError> {
        if let Some(seat) = self.seats.get(&conn) {
            return Ok(seat.side);
        }
        if self.phase != Phase::Lobby {
            return Err(SessionError::SessionFull);
        }
        SIDES
            .into_iter()
            .find(|&side| self.seats.values().all(|seat| seat.side != side))
            .ok_or(SessionError::SessionFull)
    }

    /// Seats `conn` and makes it a member.
    pub fn take_seat(&mut self, conn: ConnectionId) -> Result<Side, SessionError> {
        let side = self.side_for(conn)?;
        self.members.insert(conn);
        self.seats.entry(conn).or_insert(Seat { side, ready: false });
        if self.phase == Phase::Lobby && self.can_start() {
            self.phase = Phase::AwaitingReady;
        }
        Ok(side)
    }

    /// Marks a seated player as ready.
    ///
    /// Returns true if this started the game.
    pub fn mark_ready(&mut self, conn: ConnectionId) -> Result<bool, SessionError> {
        let seat = self.seats.get_mut(&conn).ok_or(SessionError::NotSeated)?;
        seat.ready = true;
        let all_ready = self.seats.values().all(|seat| seat.ready);
        if self.phase == Phase::AwaitingReady && all_ready {
            self.phase = Phase::InProgress;
            return Ok(true);
        }
        Ok(false)
    }

    /// Validates and applies a move by `conn`.
    ///
    /// Nothing changes if the move is rejected.
    pub fn play(
        &mut self,
        conn: ConnectionId,
        mv: Move,
        stalemate: StalemateRule,
    ) -> Result<MoveOutcome, IllegalMove> {
        if self.phase != Phase::InProgress {
            return Err(IllegalMove::GameNotInProgress);
        }
        let seat = self.seats.get(&conn).ok_or(IllegalMove::NotSeated)?;
        if seat.side != self.state.current_turn {
            return Err(IllegalMove::NotYourTurn {
                current_turn: self.state.current_turn,
            });
        }
        let mut next = self.state.calculate(mv)?.execute();
        let winner = next.winner().or_else(|| next.settle_stalemate(stalemate));
        self.state = next;

        Ok(match winner {
            Some(winner) => {
                self.phase = Phase::Finished;
                self.winner = Some(winner);
                MoveOutcome::GameOver {
                    winner,
                    state: next,
                }
            }
            None => MoveOutcome::Continue(next),
        })
    }

    /// Removes `conn` from the session.
    ///
    /// A seated player leaving a running game ends it without a winner,
    /// before the start the seat is simply freed. Returns whether `conn` was
    /// a member at all.
    pub fn leave(&mut self, conn: ConnectionId) -> bool {
        let was_member = self.members.remove(&conn);
        if self.seats.remove(&conn).is_some() {
            match self.phase {
                Phase::InProgress => self.phase = Phase::Finished,
                Phase::AwaitingReady => self.phase = Phase::Lobby,
                Phase::Lobby | Phase::Finished => {}
            }
        }
        was_member
    }
}
