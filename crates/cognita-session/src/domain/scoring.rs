//! Scoring. A pure function of the plan and the recorded inputs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::input::SessionInput;
use super::plan::{Cell, SessionPlan};

/// Final result of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Game-specific points.
    pub score: u32,
    /// Whether the game was fully solved.
    pub correct: bool,
    /// Time from start until scoring began.
    pub elapsed_ms: u64,
}

/// Points and correctness, before timing is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Game-specific points.
    pub score: u32,
    /// Whether the game was fully solved.
    pub correct: bool,
}

impl Score {
    /// Attaches the elapsed time.
    #[must_use]
    pub fn with_elapsed(self, elapsed_ms: u64) -> Outcome {
        Outcome {
            score: self.score,
            correct: self.correct,
            elapsed_ms,
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Scores `inputs` against `plan`.
///
/// - arithmetic: one point per problem answered correctly, in order;
///   correct when every problem was.
/// - matrix: one point per distinct target tapped; correct when every
///   target was tapped and nothing else.
/// - language: one point for the right option.
///
/// Inputs of the wrong kind earn nothing.
#[must_use]
pub fn score(plan: &SessionPlan, inputs: &[SessionInput]) -> Score {
    match plan {
        SessionPlan::Arithmetic { problems } => {
            let right = problems
                .iter()
                .zip(inputs)
                .filter(|(problem, input)| {
                    matches!(input, SessionInput::Answer { value } if *value == problem.answer)
                })
                .count();
            Score {
                score: count(right),
                correct: right == problems.len(),
            }
        }
        SessionPlan::Matrix { targets, .. } => {
            let targets: HashSet<Cell> = targets.iter().copied().collect();
            let mut hits = HashSet::new();
            let mut misses = 0usize;
            for input in inputs {
                match input {
                    SessionInput::Cell { row, col } => {
                        let cell = Cell {
                            row: *row,
                            col: *col,
                        };
                        if targets.contains(&cell) {
                            hits.insert(cell);
                        } else {
                            misses += 1;
                        }
                    }
                    SessionInput::Answer { .. } | SessionInput::Choice { .. } => misses += 1,
                }
            }
            Score {
                score: count(hits.len()),
                correct: hits.len() == targets.len() && misses == 0,
            }
        }
        SessionPlan::Language { answer_index, .. } => {
            let right = matches!(
                inputs.first(),
                Some(SessionInput::Choice { index }) if index == answer_index
            );
            Score {
                score: u32::from(right),
                correct: right,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::ArithmeticProblem;
    use cognita_content::domain::variant::Operator;

    fn arithmetic() -> SessionPlan {
        SessionPlan::Arithmetic {
            problems: vec![
                ArithmeticProblem {
                    lhs: 2,
                    operator: Operator::Add,
                    rhs: 3,
                    answer: 5,
                },
                ArithmeticProblem {
                    lhs: 9,
                    operator: Operator::Divide,
                    rhs: 3,
                    answer: 3,
                },
            ],
        }
    }

    fn matrix() -> SessionPlan {
        SessionPlan::Matrix {
            rows: 2,
            cols: 2,
            targets: vec![Cell { row: 0, col: 1 }, Cell { row: 1, col: 0 }],
            display_time_ms: 1000,
        }
    }

    #[test]
    fn test_arithmetic_counts_correct_answers_in_order() {
        let inputs = [
            SessionInput::Answer { value: 5 },
            SessionInput::Answer { value: 4 },
        ];

        assert_eq!(
            score(&arithmetic(), &inputs),
            Score {
                score: 1,
                correct: false
            }
        );
    }

    #[test]
    fn test_arithmetic_all_correct_is_correct() {
        let inputs = [
            SessionInput::Answer { value: 5 },
            SessionInput::Answer { value: 3 },
        ];

        assert_eq!(
            score(&arithmetic(), &inputs),
            Score {
                score: 2,
                correct: true
            }
        );
    }

    #[test]
    fn test_arithmetic_unanswered_problems_after_timeout_are_wrong() {
        let inputs = [SessionInput::Answer { value: 5 }];

        assert!(!score(&arithmetic(), &inputs).correct);
    }

    #[test]
    fn test_matrix_hits_and_misses() {
        let perfect = [
            SessionInput::Cell { row: 1, col: 0 },
            SessionInput::Cell { row: 0, col: 1 },
        ];
        let one_miss = [
            SessionInput::Cell { row: 1, col: 0 },
            SessionInput::Cell { row: 1, col: 1 },
        ];

        assert_eq!(
            score(&matrix(), &perfect),
            Score {
                score: 2,
                correct: true
            }
        );
        assert_eq!(
            score(&matrix(), &one_miss),
            Score {
                score: 1,
                correct: false
            }
        );
    }

    #[test]
    fn test_language_scores_chosen_option() {
        let plan = SessionPlan::Language {
            sentence_parts: vec!["She".to_owned(), "to school.".to_owned()],
            options: vec!["go".to_owned(), "goes".to_owned()],
            answer_index: 1,
        };

        assert!(score(&plan, &[SessionInput::Choice { index: 1 }]).correct);
        assert_eq!(score(&plan, &[SessionInput::Choice { index: 0 }]).score, 0);
        assert!(!score(&plan, &[]).correct);
    }

    #[test]
    fn test_score_is_deterministic() {
        let inputs = [
            SessionInput::Cell { row: 0, col: 1 },
            SessionInput::Cell { row: 0, col: 0 },
        ];

        assert_eq!(score(&matrix(), &inputs), score(&matrix(), &inputs));
    }
}
