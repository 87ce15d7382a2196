use crossterm::terminal;
use skitter::{CliRenderer, Input, Layout, Renderer, Session, SessionState};
use std::io;
use std::time::{Duration, Instant};

// Arena cells are drawn 2 characters wide; keep a few rows for the HUD.
const HUD_ROWS: u16 = 4;
const CELL_SIZE: f32 = 25.0;

fn main() -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    let cols = ((term_width / 2) as i32).clamp(9, 31);
    let rows = ((term_height.saturating_sub(HUD_ROWS)) as i32).clamp(9, 31);

    let layout = Layout::new(cols, rows, CELL_SIZE)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ std::process::id() as u64;
    let mut session = Session::new(layout, seed);
    let mut renderer = CliRenderer::new();

    renderer.init()?;

    let mut last_tick = Instant::now();

    loop {
        let mut direction = None;
        if let Some(input) = renderer.poll_input()? {
            match input {
                Input::Direction(d) => direction = Some(d),
                Input::Pause => session.toggle_pause(),
                Input::Restart => session.restart(),
                Input::Quit => break,
                Input::Advance => match session.state {
                    SessionState::Ready => session.start(),
                    SessionState::LevelComplete => session.next_level(),
                    _ => {}
                },
            }
        }

        let dt = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        // Events drive audio/leaderboards in richer hosts; the terminal
        // front end reads everything it shows from the session itself.
        let _ = session.tick(dt, direction);

        renderer.render(&session)?;
        std::thread::sleep(Duration::from_millis(10));
    }

    renderer.cleanup()?;
    Ok(())
}
