use std::io::{BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use anyhow::bail;
use tracing::{debug, info, warn};
use wombat::{read_message, write_message, ClientEvent, Presenter, ServerEvent, Side, Status};

use crate::Bot;

/// Connects to a coordinator, takes a seat in the game with the given code and
/// plays it to the end.
///
/// Returns the winner, or `None` if the game was abandoned.
pub fn run(bot: &mut dyn Bot, addr: impl ToSocketAddrs, code: &str) -> anyhow::Result<Option<Side>> {
    let stream = TcpStream::connect(addr)?;
    info!(peer = %stream.peer_addr()?, "Connected");
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    play(bot, &mut reader, &mut writer, code)
}

/// Plays one game over an already established line-based connection.
pub fn play<R: std::io::BufRead, W: Write>(
    bot: &mut dyn Bot,
    reader: &mut R,
    writer: &mut W,
    code: &str,
) -> anyhow::Result<Option<Side>> {
    let mut presenter = Presenter::new();
    let mut buf = String::new();

    write_message(
        writer,
        &ClientEvent::JoinGame {
            game_code: code.to_owned(),
        },
    )?;

    loop {
        let Some(event) = read_message::<_, ServerEvent>(reader, &mut buf)? else {
            bail!("The server closed the connection");
        };
        debug!(?event, "Received");
        presenter.handle(&event);

        match &event {
            ServerEvent::GameJoined {
                game_id,
                player_side,
                ..
            } => {
                info!(%game_id, side = %player_side, "Joined game");
                write_message(
                    writer,
                    &ClientEvent::PlayerReady {
                        game_id: game_id.clone(),
                    },
                )?;
            }
            ServerEvent::GameStarted { .. } | ServerEvent::MoveApplied { .. } => {
                if !presenter.is_my_turn() {
                    continue;
                }
                let Some(game_id) = presenter.game_id().cloned() else {
                    continue;
                };
                match bot.choose_move(presenter.state()) {
                    Some(mv) => {
                        debug!(%mv, "Playing");
                        write_message(writer, &ClientEvent::make_move(game_id, mv))?;
                    }
                    None => warn!("No legal move available, waiting"),
                }
            }
            // Moves come from the mirrored state, so a rejection means it no
            // longer matches the server's
            ServerEvent::InvalidMove { message } => bail!("Move rejected: {}", message),
            ServerEvent::Error { message } => bail!("Server error: {}", message),
            ServerEvent::GameOver { winner, .. } => {
                info!(%winner, "Game over");
                return Ok(Some(*winner));
            }
            ServerEvent::PlayerLeft if matches!(presenter.status(), Status::Finished { .. }) => {
                info!("The opponent left");
                return Ok(None);
            }
            ServerEvent::GameCreated { .. }
            | ServerEvent::PlayerJoined { .. }
            | ServerEvent::PlayerLeft => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use wombat::{
        read_message, write_message, Board, ClientEvent, GameId, GameState, Holes, Move, Position,
        ServerEvent, Side,
    };

    use super::*;
    use crate::RandomBot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn script(events: &[ServerEvent]) -> Cursor<Vec<u8>> {
        let mut input = Vec::new();
        for ev in events {
            write_message(&mut input, ev).unwrap();
        }
        Cursor::new(input)
    }

    fn sent(output: Vec<u8>) -> Vec<ClientEvent> {
        let mut reader = Cursor::new(output);
        let mut buf = String::new();
        let mut events = Vec::new();
        while let Some(ev) = read_message(&mut reader, &mut buf).unwrap() {
            events.push(ev);
        }
        events
    }

    #[test]
    fn joins_readies_and_plays_its_turns() {
        let game_id = GameId(String::from("g"));
        let opening = GameState::new();
        let mut input = script(&[
            ServerEvent::GameJoined {
                game_id: game_id.clone(),
                player_side: Side::Jackal,
                board: Board::initial(),
            },
            // Not the jackals' turn yet
            ServerEvent::GameStarted {
                board: opening.board,
                holes: opening.holes,
                current_turn: Side::Wombat,
            },
            ServerEvent::MoveApplied {
                board: opening.board,
                holes: Holes::new().insert(Position::new(5, 0)),
                current_turn: Side::Jackal,
            },
            ServerEvent::GameOver {
                winner: Side::Wombat,
                board: Board::empty(),
                holes: Holes::new(),
            },
        ]);
        let mut output = Vec::new();
        let mut bot = RandomBot::new(StdRng::seed_from_u64(5));

        let winner = play(&mut bot, &mut input, &mut output, "ABC123").unwrap();
        assert_eq!(winner, Some(Side::Wombat));

        let sent = sent(output);
        assert_eq!(sent.len(), 3);
        assert_eq!(
            sent[0],
            ClientEvent::JoinGame {
                game_code: String::from("ABC123")
            }
        );
        assert_eq!(
            sent[1],
            ClientEvent::PlayerReady {
                game_id: game_id.clone()
            }
        );
        let ClientEvent::MakeMove {
            from, to, action, ..
        } = &sent[2]
        else {
            panic!("expected a move, got {:?}", sent[2]);
        };
        let jackal_turn = GameState {
            holes: Holes::new().insert(Position::new(5, 0)),
            current_turn: Side::Jackal,
            ..opening
        };
        assert!(jackal_turn.legal_moves().contains(&Move {
            from: *from,
            to: *to,
            action: *action
        }));
    }

    #[test]
    fn errors_and_hangups_end_the_run() {
        let mut bot = RandomBot::new(StdRng::seed_from_u64(0));

        let mut input = script(&[ServerEvent::Error {
            message: String::from("Game not found"),
        }]);
        assert!(play(&mut bot, &mut input, &mut Vec::<u8>::new(), "ZZZZZZ").is_err());

        let mut input = script(&[]);
        assert!(play(&mut bot, &mut input, &mut Vec::<u8>::new(), "ZZZZZZ").is_err());
    }

    #[test]
    fn a_rejected_move_ends_the_run() {
        let opening = GameState::new();
        let mut input = script(&[
            ServerEvent::GameJoined {
                game_id: GameId(String::from("g")),
                player_side: Side::Wombat,
                board: Board::initial(),
            },
            ServerEvent::GameStarted {
                board: opening.board,
                holes: opening.holes,
                current_turn: Side::Wombat,
            },
            ServerEvent::InvalidMove {
                message: String::from("Not your turn"),
            },
            // Never reached
            ServerEvent::GameOver {
                winner: Side::Wombat,
                board: Board::empty(),
                holes: Holes::new(),
            },
        ]);
        let mut output = Vec::new();
        let mut bot = RandomBot::new(StdRng::seed_from_u64(1));

        let err = play(&mut bot, &mut input, &mut output, "ABC123").unwrap_err();
        assert!(err.to_string().contains("Not your turn"));
        let sent = sent(output);
        assert_eq!(sent.len(), 3);
        assert!(matches!(sent[2], ClientEvent::MakeMove { .. }));
    }
}
