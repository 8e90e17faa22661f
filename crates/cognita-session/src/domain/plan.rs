//! Session plans.
//!
//! A plan is everything a session needs from its content, with every random
//! draw already made. Draws happen in a fixed order so one RNG sequence
//! always yields one plan:
//!
//! - arithmetic, per round: operator index, then left operand, then right
//!   operand (for division: divisor, then quotient). A draw whose numbers
//!   overflow 64 bits is discarded and the whole triple is drawn again, up
//!   to [`MAX_PROBLEM_DRAWS`] times;
//! - memory matrix: one draw per target (Floyd's sampling);
//! - language discrimination: no draws.
//!
//! Deriving costs time and memory in proportion to the plan: one entry per
//! round or target. Matrix plans are capped at [`MAX_PLAN_TARGETS`] targets
//! because the plan is journaled with the session.

use std::collections::HashSet;

use cognita_content::ContentVariant;
use cognita_content::domain::variant::{
    LanguageDiscrimination, MemoryMatrix, MentalArithmetic, OperandRange, Operator,
};
use cognita_core::error::SessionStateError;
use cognita_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

use super::settings::SessionSettings;

/// Attempts at drawing one arithmetic problem before the content is
/// rejected as unplayable.
pub const MAX_PROBLEM_DRAWS: u32 = 64;

/// Most targets a memory-matrix plan may hold.
pub const MAX_PLAN_TARGETS: u32 = 1 << 16;

/// One generated arithmetic problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticProblem {
    /// Left operand.
    pub lhs: i64,
    /// The operator shown.
    pub operator: Operator,
    /// Right operand.
    pub rhs: i64,
    /// The expected answer.
    pub answer: i64,
}

/// A grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based row.
    pub row: u32,
    /// Zero-based column.
    pub col: u32,
}

/// The concrete game a session plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "game")]
pub enum SessionPlan {
    /// Answer each problem in order.
    Arithmetic {
        /// Problems, in presentation order.
        problems: Vec<ArithmeticProblem>,
    },
    /// Memorize the targets, then tap them.
    Matrix {
        /// Grid height.
        rows: u32,
        /// Grid width.
        cols: u32,
        /// Distinct cells to memorize.
        targets: Vec<Cell>,
        /// How long targets stay visible.
        display_time_ms: u64,
    },
    /// Pick the option that completes the sentence.
    Language {
        /// Sentence fragments around the blank.
        sentence_parts: Vec<String>,
        /// Candidate answers, in display order.
        options: Vec<String>,
        /// Index of the correct option.
        answer_index: usize,
    },
}

impl SessionPlan {
    /// Derives the plan for `content`.
    ///
    /// # Errors
    ///
    /// `UnplayableContent` if an arithmetic round keeps overflowing after
    /// [`MAX_PROBLEM_DRAWS`] attempts, or a matrix asks for more than
    /// [`MAX_PLAN_TARGETS`] targets.
    pub fn derive(
        content: &ContentVariant,
        settings: SessionSettings,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Self, SessionStateError> {
        match content {
            ContentVariant::MentalArithmetic(arithmetic) => Ok(Self::Arithmetic {
                problems: (0..settings.arithmetic_rounds())
                    .map(|_| draw_problem(arithmetic, rng))
                    .collect::<Result<_, _>>()?,
            }),
            ContentVariant::MemoryMatrix(matrix) => matrix_plan(matrix, rng),
            ContentVariant::LanguageDiscrimination(language) => Ok(language_plan(language)),
        }
    }

    /// Inputs needed before the session can be scored.
    #[must_use]
    pub fn required_inputs(&self) -> usize {
        match self {
            Self::Arithmetic { problems } => problems.len(),
            Self::Matrix { targets, .. } => targets.len(),
            Self::Language { .. } => 1,
        }
    }
}

fn draw_problem(
    content: &MentalArithmetic,
    rng: &mut dyn DeterministicRng,
) -> Result<ArithmeticProblem, SessionStateError> {
    let range = content.effective_range();
    let operators = content.effective_operators();
    for _ in 0..MAX_PROBLEM_DRAWS {
        if let Some(problem) = try_draw_problem(range, operators, rng) {
            return Ok(problem);
        }
    }
    Err(SessionStateError::UnplayableContent(format!(
        "no problem over operandRange [{}, {}] fits in 64 bits after {MAX_PROBLEM_DRAWS} draws",
        range.min(),
        range.max()
    )))
}

/// One draw of operator and operands; `None` when the numbers overflow.
fn try_draw_problem(
    range: OperandRange,
    operators: &[Operator],
    rng: &mut dyn DeterministicRng,
) -> Option<ArithmeticProblem> {
    let operator = operators[rng.next_index(operators.len())];

    if operator == Operator::Divide {
        let divisor = draw_nonzero(range, rng);
        let quotient = rng.next_i64_range(range.min(), range.max());
        let lhs = divisor.checked_mul(quotient)?;
        // i64::MIN / -1 is the one exact quotient that does not fit.
        operator.apply(lhs, divisor)?;
        return Some(ArithmeticProblem {
            lhs,
            operator,
            rhs: divisor,
            answer: quotient,
        });
    }

    let lhs = rng.next_i64_range(range.min(), range.max());
    let rhs = rng.next_i64_range(range.min(), range.max());
    Some(ArithmeticProblem {
        lhs,
        operator,
        rhs,
        answer: operator.apply(lhs, rhs)?,
    })
}

/// Uniform draw from `range` with zero removed. Validation guarantees the
/// range holds a non-zero value whenever division is allowed.
fn draw_nonzero(range: OperandRange, rng: &mut dyn DeterministicRng) -> i64 {
    if range.min() > 0 || range.max() < 0 {
        return rng.next_i64_range(range.min(), range.max());
    }
    let drawn = rng.next_i64_range(range.min(), range.max() - 1);
    if drawn >= 0 { drawn + 1 } else { drawn }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn matrix_plan(
    content: &MemoryMatrix,
    rng: &mut dyn DeterministicRng,
) -> Result<SessionPlan, SessionStateError> {
    if content.target_count() > MAX_PLAN_TARGETS {
        return Err(SessionStateError::UnplayableContent(format!(
            "targetCount {} exceeds the {MAX_PLAN_TARGETS} targets a session can hold",
            content.target_count()
        )));
    }
    let grid = content.grid_size();
    let cell_count = grid.cell_count();
    let target_count = u64::from(content.target_count());
    let cols = u64::from(grid.cols());

    let mut chosen = HashSet::new();
    let mut targets = Vec::new();
    for upper in (cell_count - target_count)..cell_count {
        let bound = i64::try_from(upper).unwrap_or(i64::MAX);
        let drawn = rng.next_i64_range(0, bound) as u64;
        let pick = if chosen.contains(&drawn) { upper } else { drawn };
        chosen.insert(pick);
        // pick < rows * cols, so both parts fit in u32.
        targets.push(Cell {
            row: (pick / cols) as u32,
            col: (pick % cols) as u32,
        });
    }

    Ok(SessionPlan::Matrix {
        rows: grid.rows(),
        cols: grid.cols(),
        targets,
        display_time_ms: content.display_time_ms(),
    })
}

fn language_plan(content: &LanguageDiscrimination) -> SessionPlan {
    SessionPlan::Language {
        sentence_parts: content.sentence_parts().to_vec(),
        options: content.options().to_vec(),
        answer_index: content.answer_index(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognita_content::validate;
    use cognita_core::rng::SeededRng;
    use cognita_test_support::{MockRng, SequenceRng};
    use serde_json::json;

    fn content(raw: &serde_json::Value) -> ContentVariant {
        validate(raw).unwrap()
    }

    fn rounds(n: u32) -> SessionSettings {
        SessionSettings::new(n, None).unwrap()
    }

    #[test]
    fn test_arithmetic_plan_follows_scripted_draws() {
        // Arrange
        let arithmetic = content(&json!({
            "type": "mental_arithmetic",
            "operandRange": [1, 9],
            "operators": ["+", "-"]
        }));
        let mut rng = SequenceRng::new(vec![0, 3, 4, 1, 2, 7]);

        // Act
        let plan = SessionPlan::derive(&arithmetic, rounds(2), &mut rng).unwrap();

        // Assert
        assert_eq!(
            plan,
            SessionPlan::Arithmetic {
                problems: vec![
                    ArithmeticProblem {
                        lhs: 3,
                        operator: Operator::Add,
                        rhs: 4,
                        answer: 7
                    },
                    ArithmeticProblem {
                        lhs: 2,
                        operator: Operator::Subtract,
                        rhs: 7,
                        answer: -5
                    },
                ]
            }
        );
        assert_eq!(plan.required_inputs(), 2);
    }

    #[test]
    fn test_division_problems_have_integral_answers_and_nonzero_divisors() {
        // Arrange
        let arithmetic = content(&json!({
            "type": "mental_arithmetic",
            "operandRange": [-6, 6],
            "operators": ["/"]
        }));
        let mut rng = SeededRng::from_seed(99);

        // Act
        let plan = SessionPlan::derive(&arithmetic, rounds(200), &mut rng).unwrap();

        // Assert
        let SessionPlan::Arithmetic { problems } = plan else {
            panic!("expected arithmetic plan");
        };
        assert_eq!(problems.len(), 200);
        for problem in problems {
            assert_ne!(problem.rhs, 0);
            assert_eq!(problem.lhs, problem.rhs * problem.answer);
            assert_eq!(
                problem.operator.apply(problem.lhs, problem.rhs),
                Some(problem.answer)
            );
        }
    }

    #[test]
    fn test_draw_nonzero_skips_zero() {
        let range = OperandRange::new(-1, 1).unwrap();

        assert_eq!(draw_nonzero(range, &mut SequenceRng::new(vec![-1])), -1);
        assert_eq!(draw_nonzero(range, &mut SequenceRng::new(vec![0])), 1);
    }

    #[test]
    fn test_arithmetic_defaults_apply_when_content_omits_them() {
        let arithmetic = content(&json!({ "type": "mental_arithmetic" }));

        let plan = SessionPlan::derive(&arithmetic, rounds(1), &mut MockRng).unwrap();

        assert_eq!(
            plan,
            SessionPlan::Arithmetic {
                problems: vec![ArithmeticProblem {
                    lhs: 1,
                    operator: Operator::Add,
                    rhs: 1,
                    answer: 2
                }]
            }
        );
    }

    #[test]
    fn test_matrix_targets_are_distinct_and_inside_grid() {
        // Arrange
        let matrix = content(&json!({
            "type": "memory_matrix",
            "gridSize": { "rows": 4, "cols": 4 },
            "targetCount": 5,
            "displayTimeMs": 2000
        }));

        // Act
        let plan = SessionPlan::derive(&matrix, SessionSettings::default(), &mut MockRng).unwrap();

        // Assert
        let SessionPlan::Matrix {
            targets,
            display_time_ms,
            ..
        } = &plan
        else {
            panic!("expected matrix plan");
        };
        assert_eq!(*display_time_ms, 2000);
        assert_eq!(
            targets,
            &vec![
                Cell { row: 0, col: 0 },
                Cell { row: 3, col: 0 },
                Cell { row: 3, col: 1 },
                Cell { row: 3, col: 2 },
                Cell { row: 3, col: 3 },
            ]
        );
        assert_eq!(plan.required_inputs(), 5);
    }

    #[test]
    fn test_full_grid_selects_every_cell() {
        let matrix = content(&json!({
            "type": "memory_matrix",
            "gridSize": { "rows": 3, "cols": 3 },
            "targetCount": 9,
            "displayTimeMs": 500
        }));

        let mut rng = SeededRng::from_seed(5);

        let plan = SessionPlan::derive(&matrix, SessionSettings::default(), &mut rng).unwrap();

        let SessionPlan::Matrix { targets, .. } = plan else {
            panic!("expected matrix plan");
        };
        let distinct: HashSet<Cell> = targets.iter().copied().collect();
        assert_eq!(distinct.len(), 9);
    }

    #[test]
    fn test_language_plan_copies_question() {
        let language = content(&json!({
            "type": "mental_language_discrimination",
            "sentenceParts": ["She", "to school."],
            "options": ["go", "goes"],
            "answer": "goes"
        }));

        let plan =
            SessionPlan::derive(&language, SessionSettings::default(), &mut MockRng).unwrap();

        assert_eq!(
            plan,
            SessionPlan::Language {
                sentence_parts: vec!["She".to_owned(), "to school.".to_owned()],
                options: vec!["go".to_owned(), "goes".to_owned()],
                answer_index: 1,
            }
        );
        assert_eq!(plan.required_inputs(), 1);
    }

    #[test]
    fn test_same_seed_derives_same_plan() {
        let arithmetic = content(&json!({
            "type": "mental_arithmetic",
            "operandRange": [-20, 20],
            "operators": ["+", "-", "x", "/"]
        }));

        let a = SessionPlan::derive(&arithmetic, rounds(25), &mut SeededRng::from_seed(7)).unwrap();
        let b = SessionPlan::derive(&arithmetic, rounds(25), &mut SeededRng::from_seed(7)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_wide_operand_range_draws_checked_answers() {
        // Arrange
        let arithmetic = content(&json!({
            "type": "mental_arithmetic",
            "operandRange": [0, 2_000_000],
            "operators": ["x", "+", "-", "/"]
        }));

        // Act
        let plan =
            SessionPlan::derive(&arithmetic, rounds(100), &mut SeededRng::from_seed(11)).unwrap();

        // Assert
        let SessionPlan::Arithmetic { problems } = plan else {
            panic!("expected arithmetic plan");
        };
        assert_eq!(problems.len(), 100);
        for problem in problems {
            assert_eq!(
                problem.operator.apply(problem.lhs, problem.rhs),
                Some(problem.answer)
            );
        }
    }

    #[test]
    fn test_overflowing_draw_is_redrawn() {
        // Arrange: MAX - MIN overflows, so the second draw 10 - 3 is used.
        let arithmetic = content(&json!({
            "type": "mental_arithmetic",
            "operandRange": [i64::MIN, i64::MAX],
            "operators": ["-"]
        }));
        let mut rng = SequenceRng::new(vec![0, i64::MAX, i64::MIN, 0, 10, 3]);

        // Act
        let plan = SessionPlan::derive(&arithmetic, rounds(1), &mut rng).unwrap();

        // Assert
        assert_eq!(
            plan,
            SessionPlan::Arithmetic {
                problems: vec![ArithmeticProblem {
                    lhs: 10,
                    operator: Operator::Subtract,
                    rhs: 3,
                    answer: 7
                }]
            }
        );
    }

    #[test]
    fn test_range_where_every_problem_overflows_is_unplayable() {
        let arithmetic = content(&json!({
            "type": "mental_arithmetic",
            "operandRange": [i64::MAX - 1, i64::MAX],
            "operators": ["+", "x"]
        }));

        let result = SessionPlan::derive(&arithmetic, rounds(1), &mut SeededRng::from_seed(3));

        assert!(matches!(
            result,
            Err(SessionStateError::UnplayableContent(_))
        ));
    }

    #[test]
    fn test_matrix_beyond_target_cap_is_unplayable_without_drawing() {
        let matrix = content(&json!({
            "type": "memory_matrix",
            "gridSize": { "rows": 65_536, "cols": 65_536 },
            "targetCount": 4_000_000_000_u32,
            "displayTimeMs": 1000
        }));

        let result = SessionPlan::derive(&matrix, SessionSettings::default(), &mut MockRng);

        assert!(matches!(
            result,
            Err(SessionStateError::UnplayableContent(_))
        ));
    }

    #[test]
    fn test_large_grid_with_few_targets_draws_only_the_targets() {
        let matrix = content(&json!({
            "type": "memory_matrix",
            "gridSize": { "rows": 65_536, "cols": 65_536 },
            "targetCount": 3,
            "displayTimeMs": 1000
        }));

        let plan =
            SessionPlan::derive(&matrix, SessionSettings::default(), &mut SeededRng::from_seed(1))
                .unwrap();

        let SessionPlan::Matrix { targets, .. } = plan else {
            panic!("expected matrix plan");
        };
        assert_eq!(targets.len(), 3);
        assert!(targets.iter().all(|cell| cell.row < 65_536 && cell.col < 65_536));
    }
}
