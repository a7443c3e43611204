use wombat::{
    Action, ClientEvent, ConnectionId, GameId, Move, Position, Presenter, ServerEvent, Side,
    Status,
};
use wombat_ai::Bot;

use crate::{Config, Coordinator, Deliveries, SessionError};

const HUMAN: ConnectionId = ConnectionId(1);
const COMPUTER: ConnectionId = ConnectionId(2);

/// A game against the computer, without a network.
///
/// Both participants talk to an in-process [`Coordinator`], exactly like
/// remote clients would, and each keeps its own [`Presenter`] mirror. The bot
/// chooses its moves from its mirror only.
pub struct LocalMatch {
    coordinator: Coordinator,
    game_id: GameId,
    human: Presenter,
    computer: Presenter,
    bot: Box<dyn Bot + Send>,
}

impl LocalMatch {
    /// Sets up and starts a game where the human plays `human_side`.
    pub fn new(
        config: Config,
        bot: Box<dyn Bot + Send>,
        human_side: Side,
    ) -> Result<Self, SessionError> {
        let mut coordinator = Coordinator::new(config);
        let mut human = Presenter::new();
        let mut computer = Presenter::new();

        let created = coordinator.create_game(HUMAN);
        deliver(&mut human, &mut computer, &created);
        let (Some(game_id), Some(code)) = (
            human.game_id().cloned(),
            human.game_code().map(str::to_owned),
        ) else {
            unreachable!("creating a game always answers with gameCreated");
        };

        // Seats go to the first joiner first
        let order = match human_side {
            Side::Wombat => [HUMAN, COMPUTER],
            Side::Jackal => [COMPUTER, HUMAN],
        };
        for conn in order {
            let deliveries = coordinator.join_game(conn, &code)?;
            deliver(&mut human, &mut computer, &deliveries);
        }
        for conn in order {
            let deliveries = coordinator.player_ready(conn, &game_id)?;
            deliver(&mut human, &mut computer, &deliveries);
        }

        Ok(Self {
            coordinator,
            game_id,
            human,
            computer,
            bot,
        })
    }

    /// The human's view of the game.
    pub fn presenter(&self) -> &Presenter {
        &self.human
    }

    pub fn presenter_mut(&mut self) -> &mut Presenter {
        &mut self.human
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.human.status(), Status::Finished { .. })
    }

    pub fn computer_to_move(&self) -> bool {
        self.computer.is_my_turn()
    }

    /// Sends a move request of the human to the coordinator.
    ///
    /// Returns the events the human received in response.
    pub fn submit(&mut self, mv: Move) -> Vec<ServerEvent> {
        self.send(ClientEvent::make_move(self.game_id.clone(), mv))
    }

    /// Sends any event of the human, e.g. one produced by [`Presenter::pick()`].
    pub fn send(&mut self, event: ClientEvent) -> Vec<ServerEvent> {
        let deliveries = self.coordinator.handle(HUMAN, event);
        deliver(&mut self.human, &mut self.computer, &deliveries);
        received_by(HUMAN, deliveries)
    }

    /// Lets the computer play if it is its turn.
    ///
    /// Returns the move it played, if any, and the events the human received.
    pub fn play_computer(&mut self) -> (Option<Move>, Vec<ServerEvent>) {
        if !self.computer_to_move() {
            return (None, Vec::new());
        }
        let Some(mv) = self.bot.choose_move(self.computer.state()) else {
            return (None, Vec::new());
        };
        let event = ClientEvent::make_move(self.game_id.clone(), mv);
        let deliveries = self.coordinator.handle(COMPUTER, event);
        deliver(&mut self.human, &mut self.computer, &deliveries);
        (Some(mv), received_by(HUMAN, deliveries))
    }
}

fn deliver(human: &mut Presenter, computer: &mut Presenter, deliveries: &Deliveries) {
    for (conn, event) in deliveries {
        match *conn {
            HUMAN => human.handle(event),
            COMPUTER => computer.handle(event),
            _ => {}
        }
    }
}

fn received_by(target: ConnectionId, deliveries: Deliveries) -> Vec<ServerEvent> {
    deliveries
        .into_iter()
        .filter(|(conn, _)| *conn == target)
        .map(|(_, event)| event)
        .collect()
}

/// Parses a move typed as `row,col row,col [move|dig]`.
pub fn parse_move(line: &str) -> Result<Move, String> {
    let mut words = line.split_whitespace();
    let (Some(from), Some(to)) = (words.next(), words.next()) else {
        return Err(String::from("Expected a move like '6,0 5,0' or '6,0 5,0 dig'"));
    };
    let from = from.parse::<Position>().map_err(|err| err.to_string())?;
    let to = to.parse::<Position>().map_err(|err| err.to_string())?;
    let action = match words.next() {
        Some(word) => word.parse::<Action>()?,
        None => Action::Move,
    };
    if words.next().is_some() {
        return Err(String::from("Too many words"));
    }
    Ok(Move { from, to, action })
}
