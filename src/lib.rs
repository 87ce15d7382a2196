pub mod bug;
pub mod cli_renderer;
pub mod entity;
pub mod fill;
pub mod grid;
pub mod renderer;
pub mod session;
pub mod snake;

pub use bug::{Bug, BugOutcome};
pub use cli_renderer::CliRenderer;
pub use entity::{Direction, GridPos, Vec2};
pub use fill::{capture, FillOutcome};
pub use grid::{Cell, Grid, GridError, Layout};
pub use renderer::{Input, Renderer};
pub use session::{GameEvent, Session, SessionState};
pub use snake::{Snake, SnakeOutcome};
