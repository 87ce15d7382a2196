use crate::entity::Direction;
use crate::session::Session;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Direction(Direction),
    /// Contextual "go" command: starts a ready level, resumes after a
    /// death, advances past a completed level.
    Advance,
    Pause,
    Restart,
    Quit,
}

/// Abstracts the hosting presentation layer. The simulation core only ever
/// hands out observable state; backends decide how to draw it.
pub trait Renderer {
    /// Initialize the renderer
    fn init(&mut self) -> io::Result<()>;

    /// Render the current session state
    fn render(&mut self, session: &Session) -> io::Result<()>;

    /// Clean up and restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Poll for input from the user
    fn poll_input(&mut self) -> io::Result<Option<Input>>;
}
