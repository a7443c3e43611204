use crate::{
    visualize_board, Action, Board, ClientEvent, GameId, GameState, Holes, Move, Position,
    ServerEvent, Side,
};

/// Where the client is in the life of a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Not part of any game.
    Menu,
    /// Waiting for seats to be filled and for both players to be ready.
    Lobby,
    Playing,
    /// `None` if the game was abandoned.
    Finished { winner: Option<Side> },
}

/// A client-side mirror of one game.
///
/// It holds a presentation copy of the board which is replaced wholesale by
/// every broadcast from the server, and it turns cell picks into
/// [`ClientEvent::MakeMove`] requests. It never decides whether a move is
/// legal; that is up to the server.
#[derive(Clone, Debug)]
pub struct Presenter {
    game_id: Option<GameId>,
    game_code: Option<String>,
    side: Option<Side>,
    state: GameState,
    status: Status,
    selected: Option<Position>,
    action: Action,
    can_start: bool,
    last_notice: Option<String>,
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            game_id: None,
            game_code: None,
            side: None,
            state: GameState::new(),
            status: Status::Menu,
            selected: None,
            action: Action::Move,
            can_start: false,
            last_notice: None,
        }
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    pub fn game_code(&self) -> Option<&str> {
        self.game_code.as_deref()
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The presentation copy of the game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn can_start(&self) -> bool {
        self.can_start
    }

    /// The last error or rejection reported by the server.
    pub fn last_notice(&self) -> Option<&str> {
        self.last_notice.as_deref()
    }

    pub fn is_my_turn(&self) -> bool {
        self.status == Status::Playing && self.side == Some(self.state.current_turn)
    }

    /// Updates the mirror from a server event.
    pub fn handle(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::GameCreated { game_id, game_code } => {
                self.game_id = Some(game_id.clone());
                self.game_code = Some(game_code.clone());
                self.status = Status::Lobby;
            }
            ServerEvent::GameJoined {
                game_id,
                player_side,
                board,
            } => {
                self.game_id = Some(game_id.clone());
                self.side = Some(*player_side);
                self.replace_state(*board, Holes::new(), Side::Wombat);
                self.status = Status::Lobby;
            }
            ServerEvent::PlayerJoined { can_start, .. } => {
                self.can_start = *can_start;
            }
            ServerEvent::GameStarted {
                board,
                holes,
                current_turn,
            }
            | ServerEvent::MoveApplied {
                board,
                holes,
                current_turn,
            } => {
                self.replace_state(*board, *holes, *current_turn);
                self.status = Status::Playing;
                self.last_notice = None;
            }
            ServerEvent::GameOver {
                winner,
                board,
                holes,
            } => {
                let next_turn = self.state.current_turn.other();
                self.replace_state(*board, *holes, next_turn);
                self.status = Status::Finished {
                    winner: Some(*winner),
                };
            }
            ServerEvent::InvalidMove { message } | ServerEvent::Error { message } => {
                self.last_notice = Some(message.clone());
            }
            ServerEvent::PlayerLeft => {
                // Before the start the seat is merely freed again
                if self.status == Status::Playing {
                    self.status = Status::Finished { winner: None };
                }
                self.can_start = false;
                self.last_notice = Some(String::from("The other player left"));
            }
        }
    }

    fn replace_state(&mut self, board: Board, holes: Holes, current_turn: Side) {
        self.state = GameState {
            board,
            holes,
            current_turn,
        };
        self.selected = None;
    }

    pub fn set_action(&mut self, action: Action) {
        self.action = action;
    }

    /// Handles the user picking a cell.
    ///
    /// The first pick selects one of the user's own pieces, picking it again
    /// deselects it, and picking any other cell produces a move request with
    /// the current action. Picks are ignored when it is not the user's turn.
    pub fn pick(&mut self, pos: Position) -> Option<ClientEvent> {
        if !self.is_my_turn() || !pos.is_on_board() {
            return None;
        }
        match self.selected {
            Some(from) if from == pos => {
                self.selected = None;
                None
            }
            Some(from) => {
                self.selected = None;
                let mv = Move {
                    from,
                    to: pos,
                    action: self.action,
                };
                self.game_id
                    .clone()
                    .map(|game_id| ClientEvent::make_move(game_id, mv))
            }
            None => {
                let own = self.state.board.get(pos).map(|p| p.side()) == self.side;
                if own {
                    self.selected = Some(pos);
                }
                None
            }
        }
    }

    /// Renders the board plus a status line.
    pub fn render(&self) -> String {
        let mut out = visualize_board(&self.state.board, self.state.holes);
        out.push('\n');
        let status = match &self.status {
            Status::Menu => String::from("Not in a game"),
            Status::Lobby => match &self.game_code {
                Some(code) => format!("Waiting for players (code {})", code),
                None => String::from("Waiting for players"),
            },
            Status::Playing if self.is_my_turn() => {
                format!("Your turn ({}), action: {:?}", self.state.current_turn, self.action)
            }
            Status::Playing => format!("{} to move", self.state.current_turn),
            Status::Finished { winner: Some(side) } if Some(*side) == self.side => {
                String::from("You won!")
            }
            Status::Finished { winner: Some(side) } => format!("The {} side won", side),
            Status::Finished { winner: None } => String::from("Game abandoned"),
        };
        out += &status;
        if let Some(pos) = self.selected {
            out += &format!(", selected {}", pos);
        }
        if let Some(notice) = &self.last_notice {
            out += &format!("\n{}", notice);
        }
        out
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
