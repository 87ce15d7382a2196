use crate::entity::{Direction, GridPos};
use crate::grid::Cell;
use crate::renderer::{Input, Renderer};
use crate::session::{Session, SessionState, TARGET_PERCENT};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

pub struct CliRenderer {
    last_render: Instant,
    target_frame_time: Duration,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            last_render: Instant::now(),
            // Target 30 FPS for smooth rendering
            target_frame_time: Duration::from_millis(33),
        }
    }

    fn draw_cell(&self, cell: Cell, stdout: &mut io::Stdout) -> io::Result<()> {
        match cell {
            Cell::Empty => {
                queue!(stdout, SetBackgroundColor(Color::Black), Print("  "))?;
            }
            Cell::Claimed => {
                queue!(stdout, SetBackgroundColor(Color::Blue), Print("  "))?;
            }
            Cell::Trail => {
                queue!(stdout, SetBackgroundColor(Color::Yellow), Print("  "))?;
            }
            Cell::Border => {
                queue!(stdout, SetBackgroundColor(Color::DarkBlue), Print("  "))?;
            }
        }
        Ok(())
    }

    fn draw_info(&self, session: &Session, stdout: &mut io::Stdout) -> io::Result<()> {
        queue!(
            stdout,
            cursor::MoveTo(0, (session.grid.rows + 1) as u16),
            ResetColor,
            Print(format!(
                "Level: {}  Score: {}  Lives: {}  Claimed: {:.1}%  Target: {:.0}%",
                session.level,
                session.score,
                session.lives,
                session.percent_covered,
                TARGET_PERCENT
            ))
        )?;

        queue!(
            stdout,
            cursor::MoveTo(0, (session.grid.rows + 2) as u16),
            Print("Controls: Arrow Keys to move | P pause | Q quit | R restart")
        )?;

        let status_row = (session.grid.rows + 3) as u16;
        match session.state {
            SessionState::Ready => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, status_row),
                    SetForegroundColor(Color::Cyan),
                    Print("Press SPACE to start                                "),
                    ResetColor
                )?;
            }
            SessionState::Paused => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, status_row),
                    SetForegroundColor(Color::Cyan),
                    Print("PAUSED - press P to resume                          "),
                    ResetColor
                )?;
            }
            SessionState::LevelComplete => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, status_row),
                    SetForegroundColor(Color::Green),
                    Print("LEVEL COMPLETE! Press SPACE for the next level      "),
                    ResetColor
                )?;
            }
            SessionState::GameOver => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, status_row),
                    SetForegroundColor(Color::Red),
                    Print("GAME OVER! Press R to restart                       "),
                    ResetColor
                )?;
            }
            SessionState::Playing => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, status_row),
                    Print("                                                    ")
                )?;
            }
        }

        Ok(())
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        Ok(())
    }

    fn render(&mut self, session: &Session) -> io::Result<()> {
        // Frame rate limiting: skip rendering if not enough time has passed
        if self.last_render.elapsed() < self.target_frame_time {
            return Ok(());
        }

        self.last_render = Instant::now();

        let mut stdout = io::stdout();

        queue!(stdout, cursor::MoveTo(0, 0))?;

        let layout = &session.layout;
        let head_cell = layout.cell_of(session.snake.pos);
        let body_cells: Vec<GridPos> = session
            .snake
            .body_positions()
            .map(|p| layout.cell_of(p))
            .collect();

        for y in 0..session.grid.rows {
            for x in 0..session.grid.cols {
                let at = GridPos::new(x, y);

                if session.bug.cell == at {
                    queue!(
                        stdout,
                        SetBackgroundColor(Color::Green),
                        SetForegroundColor(Color::Black),
                        Print("@@")
                    )?;
                    continue;
                }
                if head_cell == at {
                    queue!(
                        stdout,
                        SetBackgroundColor(Color::Black),
                        SetForegroundColor(Color::Red),
                        Print("<>"),
                        ResetColor
                    )?;
                    continue;
                }
                if body_cells.contains(&at) {
                    queue!(
                        stdout,
                        SetBackgroundColor(Color::Black),
                        SetForegroundColor(Color::DarkRed),
                        Print("()"),
                        ResetColor
                    )?;
                    continue;
                }

                self.draw_cell(session.grid.cell_at(at), &mut stdout)?;
            }
            queue!(stdout, ResetColor, Print("\r\n"))?;
        }

        self.draw_info(session, &mut stdout)?;

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Option<Input>> {
        if event::poll(Duration::from_millis(5))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        return Ok(Some(Input::Quit));
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        return Ok(Some(Input::Restart));
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        return Ok(Some(Input::Pause));
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        return Ok(Some(Input::Advance));
                    }
                    KeyCode::Up => return Ok(Some(Input::Direction(Direction::Up))),
                    KeyCode::Down => return Ok(Some(Input::Direction(Direction::Down))),
                    KeyCode::Left => return Ok(Some(Input::Direction(Direction::Left))),
                    KeyCode::Right => return Ok(Some(Input::Direction(Direction::Right))),
                    _ => {}
                }
            }
        }
        Ok(None)
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
