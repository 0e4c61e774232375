//! Key bindings.

use crossterm::event::KeyCode;

/// What a key press asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Play the card at this zero-based position in the hand.
    Select(usize),
    /// Deal a fresh game.
    Reset,
    /// Leave the game.
    Quit,
}

/// Maps a key to a command. `1`..`9` select cards, `r` resets, `q`/`Esc` quit.
pub fn parse_key(key: KeyCode) -> Option<KeyCommand> {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyCommand::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyCommand::Reset),
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(digit @ 1..=9) => Some(KeyCommand::Select(digit as usize - 1)),
            _ => None,
        },
        _ => None,
    }
}
