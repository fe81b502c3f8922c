//! Title cards and the blocking text queue

use std::collections::VecDeque;

use crate::consts::{TEXT_ADVANCE_DELAY, TEXT_ADVANCE_GRACE, TITLE_CARD_TICKS};
use crate::input::{Input, Key};

/// Level name flashed over a frozen world
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCard {
    pub text: String,
    pub remaining: u32,
}

impl TitleCard {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            remaining: TITLE_CARD_TICKS,
        }
    }

    /// Count down; false once expired
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }
}

/// FIFO of pages, advanced with the interact key
#[derive(Debug, Clone)]
pub struct TextQueue {
    pages: VecDeque<String>,
    /// Ticks since the last page was shown or advanced
    since_advance: u32,
}

impl Default for TextQueue {
    fn default() -> Self {
        Self {
            pages: VecDeque::new(),
            since_advance: u32::MAX,
        }
    }
}

impl TextQueue {
    pub fn push(&mut self, pages: impl IntoIterator<Item = String>) {
        if self.pages.is_empty() {
            self.since_advance = 0;
        }
        self.pages.extend(pages);
    }

    pub fn current(&self) -> Option<&str> {
        self.pages.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Showing a page, or just past the last one
    pub fn is_absorbing(&self) -> bool {
        !self.pages.is_empty() || self.since_advance < TEXT_ADVANCE_GRACE
    }

    pub fn tick(&mut self) {
        self.since_advance = self.since_advance.saturating_add(1);
    }

    /// Pop the front page if interact was pressed and the delay has passed
    pub fn advance(&mut self, input: &Input) {
        if self.pages.is_empty() || !input.was_pressed(Key::K) {
            return;
        }
        if self.since_advance < TEXT_ADVANCE_DELAY {
            return;
        }
        self.pages.pop_front();
        self.since_advance = 0;
    }
}
