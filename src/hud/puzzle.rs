//! Puzzle modal: the lifecycle around a pluggable [`Puzzle`]
//!
//! The modal shows the puzzle's title, runs it, then holds the result banner
//! for `PUZZLE_CLOSE_DELAY` ticks before closing. On close the final status
//! is written once into the [`OutcomeSender`] the requesting terminal handed
//! over; the terminal reads it back through its [`OutcomeReceiver`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::consts::PUZZLE_CLOSE_DELAY;
use crate::error::PuzzleError;
use crate::input::{Input, Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleStatus {
    Success,
    Failure,
    Error,
    Quit,
}

impl PuzzleStatus {
    pub fn banner(self) -> &'static str {
        match self {
            PuzzleStatus::Success => "ACCESS GRANTED",
            PuzzleStatus::Failure => "ACCESS DENIED",
            PuzzleStatus::Error => "SYSTEM ERROR",
            PuzzleStatus::Quit => "",
        }
    }
}

/// Result of one puzzle update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleProgress {
    InProgress,
    Finished(PuzzleStatus),
}

/// A mini-game hosted by the puzzle modal
pub trait Puzzle: fmt::Debug {
    fn title(&self) -> &str;

    /// Advance one tick with the modal's input
    fn update(&mut self, input: &Input) -> Result<PuzzleProgress, PuzzleError>;

    /// Text lines to show inside the modal
    fn draw(&self) -> Result<Vec<String>, PuzzleError>;
}

/// Create a single-slot result channel
pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    let slot = Rc::new(Cell::new(None));
    (OutcomeSender(Rc::clone(&slot)), OutcomeReceiver(slot))
}

/// Write end, consumed by the one write
#[derive(Debug)]
pub struct OutcomeSender(Rc<Cell<Option<PuzzleStatus>>>);

impl OutcomeSender {
    pub fn send(self, status: PuzzleStatus) {
        self.0.set(Some(status));
    }
}

#[derive(Debug)]
pub struct OutcomeReceiver(Rc<Cell<Option<PuzzleStatus>>>);

impl OutcomeReceiver {
    /// The status, once; later calls return `None`
    pub fn try_take(&self) -> Option<PuzzleStatus> {
        self.0.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Title,
    InProgress,
    Closing { status: PuzzleStatus, ticks_left: u32 },
}

#[derive(Debug)]
pub struct PuzzleModal {
    puzzle: Box<dyn Puzzle>,
    reply: Option<OutcomeSender>,
    pub phase: ModalPhase,
    /// Last lines the puzzle drew
    pub lines: Vec<String>,
}

impl PuzzleModal {
    pub fn new(puzzle: Box<dyn Puzzle>, reply: OutcomeSender) -> Self {
        Self {
            puzzle,
            reply: Some(reply),
            phase: ModalPhase::Title,
            lines: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        self.puzzle.title()
    }

    /// Advance one tick; false once the modal has closed
    pub fn update(&mut self, input: &Input) -> bool {
        match self.phase {
            ModalPhase::Title => {
                if input.was_pressed(Key::Escape) {
                    self.finish(PuzzleStatus::Quit);
                } else if input.was_pressed(Key::K) || input.was_pressed(Key::J) {
                    self.phase = ModalPhase::InProgress;
                    self.redraw();
                }
            }
            ModalPhase::InProgress => {
                match self.puzzle.update(input) {
                    Ok(PuzzleProgress::InProgress) => {}
                    Ok(PuzzleProgress::Finished(status)) => self.finish(status),
                    Err(e) => self.fail(e),
                }
                if self.phase == ModalPhase::InProgress {
                    self.redraw();
                }
            }
            ModalPhase::Closing { status, ticks_left } => {
                if ticks_left == 0 {
                    if let Some(reply) = self.reply.take() {
                        reply.send(status);
                    }
                    return false;
                }
                self.phase = ModalPhase::Closing {
                    status,
                    ticks_left: ticks_left - 1,
                };
            }
        }
        true
    }

    fn redraw(&mut self) {
        match self.puzzle.draw() {
            Ok(lines) => self.lines = lines,
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: PuzzleError) {
        log::error!("Puzzle `{}` failed: {}", self.puzzle.title(), error);
        self.lines = vec![error.to_string()];
        self.finish(PuzzleStatus::Error);
    }

    fn finish(&mut self, status: PuzzleStatus) {
        // Quitting closes right away; results linger on screen
        let ticks_left = if status == PuzzleStatus::Quit {
            0
        } else {
            PUZZLE_CLOSE_DELAY
        };
        self.phase = ModalPhase::Closing { status, ticks_left };
    }
}

/// Enter the digits of a numeric code; three wrong tries lock it out
#[derive(Debug, Clone)]
pub struct CodeLockPuzzle {
    code: String,
    entered: String,
    tries_left: u32,
}

impl CodeLockPuzzle {
    pub const TRIES: u32 = 3;

    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            entered: String::new(),
            tries_left: Self::TRIES,
        }
    }
}

impl Puzzle for CodeLockPuzzle {
    fn title(&self) -> &str {
        "CODE LOCK"
    }

    fn update(&mut self, input: &Input) -> Result<PuzzleProgress, PuzzleError> {
        if self.code.is_empty() || !self.code.chars().all(|c| c.is_ascii_digit()) {
            return Err(PuzzleError::Corrupted(format!("code {:?} is not a digit string", self.code)));
        }
        if input.was_pressed(Key::Escape) {
            return Ok(PuzzleProgress::Finished(PuzzleStatus::Quit));
        }
        let Some(digit) = input.digit_pressed() else {
            return Ok(PuzzleProgress::InProgress);
        };
        let c = char::from_digit(u32::from(digit), 10)
            .ok_or_else(|| PuzzleError::BadInput(format!("digit {digit}")))?;
        self.entered.push(c);
        if self.entered.len() < self.code.len() {
            return Ok(PuzzleProgress::InProgress);
        }
        if self.entered == self.code {
            return Ok(PuzzleProgress::Finished(PuzzleStatus::Success));
        }
        self.entered.clear();
        self.tries_left = self.tries_left.saturating_sub(1);
        if self.tries_left == 0 {
            Ok(PuzzleProgress::Finished(PuzzleStatus::Failure))
        } else {
            Ok(PuzzleProgress::InProgress)
        }
    }

    fn draw(&self) -> Result<Vec<String>, PuzzleError> {
        let blanks = "_".repeat(self.code.len().saturating_sub(self.entered.len()));
        Ok(vec![
            format!("{}{}", self.entered, blanks),
            format!("{} tries left", self.tries_left),
        ])
    }
}
