//! I/O boundary traits for testability
//!
//! The operator abstraction hides the console so the filter can be driven by
//! scripted answers in tests.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, trace};

use crate::application::matcher::TitleMatch;
use crate::infrastructure::highlight::Highlighter;
use crate::infrastructure::{InfraError, InfraResult};

/// Operator response for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Keep,
    Remove,
    /// No answer: interrupt or end of input. Stops further prompting.
    Interrupted,
}

/// What the operator is shown for one item.
#[derive(Debug, Clone, Copy)]
pub struct ItemPrompt<'a> {
    /// 1-based position among the items presented so far
    pub ordinal: usize,
    /// Items in the whole document
    pub total: usize,
    /// Title or placeholder
    pub title: &'a str,
    /// Keep-list matches, best first
    pub matches: &'a [TitleMatch],
}

/// Party that decides whether an item stays.
pub trait Operator {
    /// Present the item and block until a decision (or an interrupt).
    fn decide(&mut self, prompt: &ItemPrompt<'_>) -> io::Result<Answer>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Something that arrived on the console input side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Interrupt,
    /// stdin reached end of file
    Closed,
}

/// Interpret one answer line; `None` means re-prompt.
pub fn parse_answer(line: &str) -> Option<Answer> {
    match line.trim() {
        "y" | "Y" => Some(Answer::Keep),
        "n" | "N" => Some(Answer::Remove),
        _ => None,
    }
}

/// Interactive console operator.
///
/// Input arrives as [`InputEvent`]s on a channel so that Ctrl-C can end a
/// blocking prompt without killing the process.
pub struct ConsoleOperator<W: Write> {
    out: W,
    events: Receiver<InputEvent>,
    highlighter: Box<dyn Highlighter>,
}

impl ConsoleOperator<io::Stdout> {
    /// Wire the operator to stdin/stdout and install the Ctrl-C handler.
    pub fn attach(highlighter: Box<dyn Highlighter>) -> InfraResult<Self> {
        let (tx, rx) = mpsc::channel();

        let signal_tx = tx.clone();
        ctrlc::set_handler(move || {
            let _ = signal_tx.send(InputEvent::Interrupt);
        })
        .map_err(|e| InfraError::Signal {
            message: e.to_string(),
        })?;

        spawn_stdin_reader(tx)?;
        Ok(Self::new(io::stdout(), rx, highlighter))
    }
}

fn spawn_stdin_reader(tx: Sender<InputEvent>) -> InfraResult<()> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(InputEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(InputEvent::Closed);
        })
        .map_err(|e| InfraError::io("spawn stdin reader", e))?;
    Ok(())
}

impl<W: Write> ConsoleOperator<W> {
    pub fn new(out: W, events: Receiver<InputEvent>, highlighter: Box<dyn Highlighter>) -> Self {
        Self {
            out,
            events,
            highlighter,
        }
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    fn show(&mut self, prompt: &ItemPrompt<'_>) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Item {}/{}", prompt.ordinal, prompt.total)?;
        writeln!(
            self.out,
            "Title: {}",
            self.highlighter.title(prompt.title)
        )?;
        for m in prompt.matches {
            let line = if m.score >= 100 {
                format!("** Matches title in keep list: \"{}\" **", m.entry)
            } else {
                format!(
                    "** Similar to title in keep list: \"{}\" ({}%) **",
                    m.entry, m.score
                )
            };
            writeln!(self.out, "{}", self.highlighter.notice(&line))?;
        }
        Ok(())
    }
}

impl<W: Write> Operator for ConsoleOperator<W> {
    fn decide(&mut self, prompt: &ItemPrompt<'_>) -> io::Result<Answer> {
        self.show(prompt)?;

        loop {
            write!(
                self.out,
                "{}",
                self.highlighter.prompt("  > y to keep, n to delete: ")
            )?;
            self.out.flush()?;

            let event = self.events.recv().unwrap_or(InputEvent::Closed);
            trace!("input event: {:?}", event);
            match event {
                InputEvent::Line(line) => match parse_answer(&line) {
                    Some(Answer::Keep) => {
                        writeln!(self.out, "{}", self.highlighter.keep("Keeping item"))?;
                        return Ok(Answer::Keep);
                    }
                    Some(_) => {
                        writeln!(
                            self.out,
                            "{}",
                            self.highlighter.remove("Flagging item for removal")
                        )?;
                        return Ok(Answer::Remove);
                    }
                    None => debug!("invalid answer {:?}, asking again", line),
                },
                InputEvent::Interrupt | InputEvent::Closed => {
                    writeln!(self.out)?;
                    return Ok(Answer::Interrupted);
                }
            }
        }
    }
}
