//! Learner inputs.

use serde::{Deserialize, Serialize};

/// One input recorded during the active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "input")]
pub enum SessionInput {
    /// An answer to the next arithmetic problem.
    Answer {
        /// The submitted value.
        value: i64,
    },
    /// A tap on a memory grid cell.
    Cell {
        /// Zero-based row.
        row: u32,
        /// Zero-based column.
        col: u32,
    },
    /// A chosen language option, by display index.
    Choice {
        /// Index into the options.
        index: usize,
    },
}

impl SessionInput {
    /// Short name used in rejection messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Answer { .. } => "answer",
            Self::Cell { .. } => "cell",
            Self::Choice { .. } => "choice",
        }
    }
}
