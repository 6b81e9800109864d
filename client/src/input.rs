//! Controller input management with change detection

use shared::{Direction, InputAction};

/// One line of controller input, already interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Toward up (vertical seats) or left (horizontal seats)
    Back,
    /// Toward down (vertical seats) or right (horizontal seats)
    Forward,
    Hold(Direction),
    Release,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let token = line.trim().to_ascii_lowercase();
        match token.as_str() {
            "" | "x" | "stop" | "release" => Some(Command::Release),
            "-" | "w" | "a" | "1" => Some(Command::Back),
            "+" | "s" | "d" | "2" => Some(Command::Forward),
            "q" | "quit" | "exit" => Some(Command::Quit),
            other => other.parse().ok().map(Command::Hold),
        }
    }
}

/// Turns commands into press/release events, sending only on change.
///
/// Seats 0 and 1 hold vertical paddles and steer up/down; seats 2 and 3 hold
/// horizontal paddles and steer left/right.
pub struct InputManager {
    vertical: bool,
    held: Option<Direction>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            vertical: true,
            held: None,
        }
    }

    pub fn set_seat(&mut self, seat: u8) {
        self.vertical = seat < 2;
    }

    pub fn held(&self) -> Option<Direction> {
        self.held
    }

    /// The pair of directions this seat can steer in, back then forward.
    pub fn axis(&self) -> (Direction, Direction) {
        if self.vertical {
            (Direction::Up, Direction::Down)
        } else {
            (Direction::Left, Direction::Right)
        }
    }

    /// Returns the event to send for `command`, if any.
    pub fn update(&mut self, command: Command) -> Option<(Direction, InputAction)> {
        let (back, forward) = self.axis();
        let wanted = match command {
            Command::Back => Some(back),
            Command::Forward => Some(forward),
            Command::Hold(direction) => Some(direction),
            Command::Release | Command::Quit => None,
        };

        match (wanted, self.held) {
            (Some(direction), Some(held)) if direction == held => None,
            (Some(direction), _) => {
                self.held = Some(direction);
                Some((direction, InputAction::Press))
            }
            (None, Some(held)) => {
                self.held = None;
                Some((held, InputAction::Release))
            }
            (None, None) => None,
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("w"), Some(Command::Back));
        assert_eq!(Command::parse(" D "), Some(Command::Forward));
        assert_eq!(Command::parse("left"), Some(Command::Hold(Direction::Left)));
        assert_eq!(Command::parse(""), Some(Command::Release));
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse("jump"), None);
    }

    #[test]
    fn test_axis_follows_seat() {
        let mut input = InputManager::new();
        input.set_seat(1);
        assert_eq!(input.axis(), (Direction::Up, Direction::Down));
        input.set_seat(3);
        assert_eq!(input.axis(), (Direction::Left, Direction::Right));
    }

    #[test]
    fn test_repeated_press_is_not_resent() {
        let mut input = InputManager::new();
        assert_eq!(
            input.update(Command::Back),
            Some((Direction::Up, InputAction::Press))
        );
        assert_eq!(input.update(Command::Back), None);
        assert_eq!(
            input.update(Command::Forward),
            Some((Direction::Down, InputAction::Press))
        );
        assert_eq!(input.held(), Some(Direction::Down));
    }

    #[test]
    fn test_release_only_when_holding() {
        let mut input = InputManager::new();
        input.set_seat(2);
        assert_eq!(input.update(Command::Release), None);
        input.update(Command::Forward);
        assert_eq!(
            input.update(Command::Release),
            Some((Direction::Right, InputAction::Release))
        );
        assert_eq!(input.held(), None);
    }
}
