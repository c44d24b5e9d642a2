//! Terminal preview using crossterm.
//!
//! Draws the 6×22 key grid in an alternate screen with true-color, fed by
//! the same renderer that drives the real keyboard.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chroma_transport::{ConnectionSignal, DeviceSink, PackedFrame, TransportError, COLS, ROWS};
use crossterm::{
    cursor, event,
    style::{self, Color, Stylize},
    terminal, ExecutableCommand, QueueableCommand,
};
use parking_lot::Mutex;

use crate::color::decimal_to_rgb;
use crate::engine::{Renderer, SharedStore};

/// Width of each key in characters.
const CELL_W: usize = 4;
/// Unlit keys.
const DIM: Color = Color::Rgb {
    r: 40,
    g: 40,
    b: 40,
};
/// First terminal row of the grid (below the header).
const GRID_TOP: u16 = 2;

/// A [`DeviceSink`] that paints frames into a terminal.
pub struct TerminalSink<W: Write + Send> {
    out: Mutex<W>,
    title: String,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W, title: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            title: title.into(),
        }
    }

    fn draw(&self, frame: &PackedFrame) -> io::Result<()> {
        let mut out = self.out.lock();

        out.queue(cursor::MoveTo(0, 0))?;
        out.queue(style::PrintStyledContent(
            format!(" Preset: {}  |  q/Esc to quit ", self.title)
                .with(Color::White)
                .on(Color::DarkGrey),
        ))?;

        for (r, row) in frame.iter().enumerate() {
            out.queue(cursor::MoveTo(0, GRID_TOP + r as u16))?;
            for &packed in row {
                let rgb = decimal_to_rgb(packed);
                let bg = if packed == 0 {
                    DIM
                } else {
                    Color::Rgb {
                        r: rgb.r,
                        g: rgb.g,
                        b: rgb.b,
                    }
                };
                out.queue(style::PrintStyledContent(
                    format!("{:width$}", "", width = CELL_W).on(bg),
                ))?;
            }
        }
        out.flush()
    }
}

impl<W: Write + Send> DeviceSink for TerminalSink<W> {
    fn send_frame(&self, frame: &PackedFrame) -> Result<(), TransportError> {
        Ok(self.draw(frame)?)
    }

    fn send_clear(&self) -> Result<(), TransportError> {
        Ok(self.draw(&[[0; COLS]; ROWS])?)
    }
}

/// Render `store` into the terminal until q/Esc/Ctrl-C or `running` clears.
pub fn run(store: SharedStore, title: &str, running: Arc<AtomicBool>) -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout
        .execute(terminal::EnterAlternateScreen)?
        .execute(terminal::Clear(terminal::ClearType::All))?
        .execute(cursor::Hide)?;

    let result = run_loop(store, title, &running);

    // Cleanup
    stdout
        .execute(cursor::Show)?
        .execute(terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn run_loop(store: SharedStore, title: &str, running: &Arc<AtomicBool>) -> io::Result<()> {
    let sink: Arc<TerminalSink<Stdout>> = Arc::new(TerminalSink::new(io::stdout(), title));
    sink.send_clear().map_err(io::Error::other)?;

    // The terminal is always "connected".
    let signal = Arc::new(ConnectionSignal::new());
    signal.set();

    let render_running = Arc::new(AtomicBool::new(true));
    let handle = Renderer::new(store, signal, sink).spawn(Arc::clone(&render_running))?;

    while running.load(Ordering::SeqCst) {
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let event::Event::Key(key) = event::read()? {
            match key.code {
                event::KeyCode::Char('q') | event::KeyCode::Esc => break,
                event::KeyCode::Char('c')
                    if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                {
                    break
                }
                _ => {}
            }
        }
    }

    render_running.store(false, Ordering::SeqCst);
    handle
        .join()
        .map_err(|_| io::Error::other("render thread panicked"))
}
