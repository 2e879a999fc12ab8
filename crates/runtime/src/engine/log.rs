//! Player-facing turn log.
//!
//! These lines are game output for the presentation layer, not diagnostics;
//! diagnostics go through `tracing`.

use arena_core::{PlayerId, Roster};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnLog {
    lines: Vec<String>,
}

impl TurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Records a death with kill credit when there is a killer.
    pub fn defeated(&mut self, roster: &Roster, victim: PlayerId, killer: Option<PlayerId>) {
        let victim = roster.name_of(victim);
        match killer {
            Some(killer) => self.push(format!("{victim} was defeated by {}", roster.name_of(killer))),
            None => self.push(format!("{victim} was defeated")),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Hands the collected lines to the caller and starts a fresh log.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}
