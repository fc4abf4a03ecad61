use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The 64x32 monochrome screen as the interpreter sees it, plus the dirty
/// bit the host uses to decide when to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    redraw: bool,
}

impl Framebuffer {
    /// blank, but flagged so the host paints it once
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            redraw: true,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.redraw = true;
    }

    /// XOR an 8-pixel-wide sprite onto the screen with its top-left corner
    /// at (x, y); coordinates wrap on both axes. Returns true if any lit
    /// sprite bit landed on a pixel that was already on.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collided = false;
        for (row, bits) in rows.iter().enumerate() {
            let py = (y as usize + row) % DISPLAY_HEIGHT;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x as usize + col) % DISPLAY_WIDTH;
                let pixel = &mut self.pixels[py][px];
                collided |= *pixel;
                *pixel = !*pixel;
            }
        }
        self.redraw = true;
        collided
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }

    /// has anything changed since the host last cleared the flag
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// called by the host once it has consumed the buffer
    pub fn clear_redraw(&mut self) {
        self.redraw = false;
    }

    /// (x, y) of every pixel that matches `lit`, row by row
    pub fn pixels_matching(&self, lit: bool) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |(_, p)| **p == lit)
                .map(move |(x, _)| (x, y))
        })
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is used by the host to put the framebuffer on a screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// present the whole framebuffer
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of the pixels in one bitplane; y grows upward on
    /// the canvas so rows are negated
    fn bitplane_from_framebuffer(&self, fb: &Framebuffer, lit: bool) -> Vec<(f64, f64)> {
        fb.pixels_matching(lit)
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    title: String,
}

impl MonoTermDisplay {
    pub fn new(title: &str) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(DISPLAY_WIDTH, DISPLAY_HEIGHT),
            title: format!("CHIP-8 - {}", title),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error> {
        let off = self.resolution.bitplane_from_framebuffer(fb, false);
        let on = self.resolution.bitplane_from_framebuffer(fb, true);
        debug_assert_eq!(off.len() + on.len(), self.resolution.pixel_count());

        // for now this assumes a 1:1 ratio between terminal cells, chip8
        // pixels and the internal TUI canvas
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let title = self.title.as_str();

        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; counts frames and keeps the
/// last one it was given
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Option<Framebuffer>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, fb: &Framebuffer) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = Some(fb.clone());
        Ok(())
    }
}
