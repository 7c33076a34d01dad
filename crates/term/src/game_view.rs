//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Cell, EnginePhase, GameOverCause};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const HIGHLIGHT_BG: Rgb = Rgb::new(90, 80, 20);

/// A lightweight terminal renderer for the molecule board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let board_px_w = (snap.width as u16) * self.cell_w;
        let board_px_h = (snap.height as u16) * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        let bg = CellStyle::new(Rgb::new(80, 80, 90), PLAY_BG);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        for y in 0..snap.height {
            for x in 0..snap.width {
                let cell = snap.cell(x, y).unwrap_or_default();
                let lit = snap.is_highlighted(x, y);
                if cell.is_empty() {
                    self.draw_empty_cell(fb, start_x, start_y, x as u16, y as u16);
                } else {
                    self.draw_board_cell(fb, start_x, start_y, x as u16, y as u16, cell, lit);
                }
            }
        }

        if let Some(active) = snap.active {
            if active.x >= 0
                && active.y >= 0
                && (active.x as usize) < snap.width
                && (active.y as usize) < snap.height
            {
                self.draw_board_cell(
                    fb,
                    start_x,
                    start_y,
                    active.x as u16,
                    active.y as u16,
                    Cell::from(active.element),
                    false,
                );
            }
        }

        self.draw_side_panel(fb, snap, viewport, start_x, start_y, frame_w);

        if let Some(cause) = snap.game_over {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
            if cause == GameOverCause::GarbageOverflow {
                let y = start_y.saturating_add(frame_h / 2).saturating_add(1);
                self.draw_overlay_line(fb, start_x, y, frame_w, cause.message());
            }
        } else if snap.phase == EnginePhase::Idle {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "PRESS R");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, start_x: u16, start_y: u16, x: u16, y: u16) {
        let style = CellStyle::new(Rgb::new(90, 90, 100), PLAY_BG).dim();
        self.put_cell(fb, start_x, start_y, x, y, '·', style);
    }

    fn draw_board_cell(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        x: u16,
        y: u16,
        cell: Cell,
        highlighted: bool,
    ) {
        let (fg, ch) = match cell {
            Cell::Carbon => (Rgb::new(120, 200, 120), 'C'),
            Cell::Oxygen => (Rgb::new(230, 80, 80), 'O'),
            Cell::Garbage => (Rgb::new(110, 110, 110), '▓'),
            Cell::Empty => (Rgb::new(90, 90, 100), '·'),
        };
        let bg = if highlighted { HIGHLIGHT_BG } else { PLAY_BG };
        let style = CellStyle::new(fg, bg).bold();
        if cell == Cell::Garbage {
            let px = start_x + 1 + x * self.cell_w;
            let py = start_y + 1 + y * self.cell_h;
            fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
        } else {
            self.put_cell(fb, start_x, start_y, x, y, ch, style);
        }
    }

    /// Glyph in the top-left column of the cell, background across the rest
    fn put_cell(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = start_x + 1 + cell_x * self.cell_w;
        let py = start_y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', style);
        fb.put_char(px, py, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.score, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "TARGET", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, &snap.target.name, value);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, &snap.target.pattern, value.dim());
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "SPEED", label);
        y = y.saturating_add(1);
        let hundredths = (snap.speed_ratio.max(0.0) * 100.0).round() as u32;
        fb.put_char(panel_x, y, 'x', value);
        fb.put_u32(panel_x + 1, y, hundredths / 100, value);
        let int_w = digit_count(hundredths / 100);
        fb.put_char(panel_x + 1 + int_w, y, '.', value);
        fb.put_char(panel_x + 2 + int_w, y, digit(hundredths / 10 % 10), value);
        fb.put_char(panel_x + 3 + int_w, y, digit(hundredths % 10), value);
        y = y.saturating_add(2);

        if snap.pending_garbage > 0 {
            let warn = CellStyle::new(Rgb::new(240, 160, 60), Rgb::new(0, 0, 0)).bold();
            fb.put_str(panel_x, y, "INCOMING", warn);
            y = y.saturating_add(1);
            fb.put_u32(panel_x, y, snap.pending_garbage, warn);
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        self.draw_overlay_line(fb, start_x, mid_y, frame_w, text);
    }

    fn draw_overlay_line(&self, fb: &mut FrameBuffer, start_x: u16, y: u16, frame_w: u16, text: &str) {
        let text_w = text.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        fb.put_str(x, y, text, style);
    }
}

fn digit(n: u32) -> char {
    char::from_digit(n % 10, 10).unwrap_or('0')
}

fn digit_count(mut n: u32) -> u16 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
