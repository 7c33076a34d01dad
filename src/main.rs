//! Terminal molecule puzzle runner (default binary).
//!
//! Fixed 16 ms timestep: input is polled until the next step, then the
//! session clock advances by one step and the frame is redrawn.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use log::{LevelFilter, Log, Metadata, Record};

use moldrop::adapter::config_from_env;
use moldrop::core::{GameSession, GameSnapshot};
use moldrop::input::{handle_key_event, should_quit, SoftDropLatch};
use moldrop::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use moldrop::types::TICK_MS;

/// Appends log lines to a file; stderr would corrupt the alternate screen.
struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("MOLDROP_LOG_PATH") else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let level = match std::env::var("MOLDROP_LOG_LEVEL").as_deref() {
        Ok("trace") => LevelFilter::Trace,
        Ok("debug") => LevelFilter::Debug,
        Ok("warn") => LevelFilter::Warn,
        _ => LevelFilter::Info,
    };
    log::set_boxed_logger(Box::new(FileLogger {
        file: Mutex::new(file),
        level,
    }))
    .map_err(|e| anyhow::anyhow!("logger already set: {e}"))?;
    log::set_max_level(level);
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let config = config_from_env()?;
    let mut session = GameSession::new(config)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, session: &mut GameSession) -> Result<()> {
    session.start();

    let view = GameView::default();
    let mut latch = SoftDropLatch::new();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        session.snapshot_into(&mut snap);
        view.render_into(&snap, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        latch.sync(session.engine().soft_drop());

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key).and_then(|a| latch.filter(a)) {
                        session.apply_action(action);
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            if let Some(stop) = latch.update(TICK_MS) {
                session.apply_action(stop);
            }
            session.advance(TICK_MS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logger_installs_and_appends() {
        let path = std::env::temp_dir().join(format!("moldrop-log-{}.txt", std::process::id()));
        std::env::set_var("MOLDROP_LOG_PATH", &path);
        std::env::set_var("MOLDROP_LOG_LEVEL", "debug");

        init_logging().unwrap();
        log::debug!("board settled");
        log::trace!("filtered out");
        log::logger().flush();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(written.contains("[DEBUG]"));
        assert!(written.contains("board settled"));
        assert!(!written.contains("filtered out"));
    }
}
