//! Password prompt.
//!
//! On a terminal the password is read in raw mode so it is never echoed.
//! Piped input is read as a single line.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use debtbook_shared::AppError;

/// What a key press does to the password being typed.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
    Cancelled,
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> Step {
    if key.kind != KeyEventKind::Press {
        return Step::Continue;
    }
    match key.code {
        KeyCode::Enter => Step::Done,
        KeyCode::Esc => Step::Cancelled,
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Step::Cancelled
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            Step::Continue
        }
        KeyCode::Backspace => {
            buffer.pop();
            Step::Continue
        }
        _ => Step::Continue,
    }
}

/// Restores cooked mode on every exit path.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_hidden() -> io::Result<Option<String>> {
    let _raw = RawMode::enable()?;
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut buffer, key) {
                Step::Continue => {}
                Step::Done => return Ok(Some(buffer)),
                Step::Cancelled => return Ok(None),
            }
        }
    }
}

fn internal(e: &io::Error) -> AppError {
    AppError::Internal(e.to_string())
}

/// Asks for the account password on stderr.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or the prompt is cancelled.
pub fn password() -> Result<String, AppError> {
    let mut stderr = io::stderr();
    write!(stderr, "Password: ").map_err(|e| internal(&e))?;
    stderr.flush().map_err(|e| internal(&e))?;

    if io::stdin().is_terminal() {
        let entered = read_hidden().map_err(|e| internal(&e))?;
        writeln!(stderr).map_err(|e| internal(&e))?;
        return entered
            .ok_or_else(|| AppError::Validation("password prompt cancelled".to_string()));
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| internal(&e))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
