use crate::{Board, Holes, Position, Side, BOARD_SIZE};

/// The character for a single cell.
///
/// `W`/`J` are pieces, `w` is a wombat sitting in a hole, `o` an empty hole.
pub fn cell_char(board: &Board, holes: Holes, pos: Position) -> char {
    match (board.get(pos).map(|p| p.side()), holes.contains(pos)) {
        (Some(Side::Wombat), false) => 'W',
        (Some(Side::Wombat), true) => 'w',
        (Some(Side::Jackal), _) => 'J',
        (None, true) => 'o',
        (None, false) => '·',
    }
}

/// Draws the board in a box, with row and column numbers.
pub fn visualize_board(board: &Board, holes: Holes) -> String {
    let mut result = String::from("    ");
    for col in 0..BOARD_SIZE {
        result += &format!(" {}", col);
    }
    result += "\n    ╭";
    for _ in 0..BOARD_SIZE {
        result += "──";
    }
    result += "─╮\n";
    for row in 0..BOARD_SIZE {
        result += &format!("{:>3} │", row);
        for col in 0..BOARD_SIZE {
            result.push(' ');
            result.push(cell_char(board, holes, Position::new(row, col)));
        }
        result += " │\n";
    }
    result += "    ╰";
    for _ in 0..BOARD_SIZE {
        result += "──";
    }
    result += "─╯";
    result
}
