use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two competing sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Starts on rows 6 and 7, moves first, and is the only side that can dig.
    Wombat,
    /// Starts on rows 0 and 1. Falls to its death when stepping into a hole.
    Jackal,
}

pub const SIDES: [Side; 2] = [Side::Wombat, Side::Jackal];

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Wombat => Side::Jackal,
            Side::Jackal => Side::Wombat,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Wombat => "wombat",
            Side::Jackal => "jackal",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wombat" => Ok(Side::Wombat),
            "jackal" => Ok(Side::Jackal),
            other => Err(format!("'{}' is not a side, expected 'wombat' or 'jackal'", other)),
        }
    }
}

/// A piece on the board.
///
/// A piece's type and its owner are always the same side, so only one side is
/// stored. The wire format still spells out both (`{"type": .., "player": ..}`),
/// and decoding rejects a piece where the two disagree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WirePiece", into = "WirePiece")]
pub struct Piece {
    side: Side,
}

impl Piece {
    pub const WOMBAT: Piece = Piece { side: Side::Wombat };
    pub const JACKAL: Piece = Piece { side: Side::Jackal };

    pub fn new(side: Side) -> Self {
        Self { side }
    }

    pub fn side(self) -> Side {
        self.side
    }

    pub fn is_wombat(self) -> bool {
        self.side == Side::Wombat
    }

    pub fn is_jackal(self) -> bool {
        self.side == Side::Jackal
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct WirePiece {
    #[serde(rename = "type")]
    kind: Side,
    player: Side,
}

impl TryFrom<WirePiece> for Piece {
    type Error = String;

    fn try_from(wire: WirePiece) -> Result<Self, Self::Error> {
        if wire.kind != wire.player {
            return Err(format!(
                "a {} piece cannot be owned by the {} side",
                wire.kind, wire.player
            ));
        }
        Ok(Piece::new(wire.kind))
    }
}

impl From<Piece> for WirePiece {
    fn from(piece: Piece) -> Self {
        WirePiece {
            kind: piece.side,
            player: piece.side,
        }
    }
}
