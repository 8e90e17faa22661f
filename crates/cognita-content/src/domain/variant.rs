//! The closed set of typed content variants.
//!
//! Every variant keeps its fields private and is only constructible through
//! a checked constructor, so a value of these types always satisfies its
//! own constraints. Deserialization goes through [`validate`] for the same
//! reason.
//!
//! [`validate`]: crate::domain::validation::validate

use std::fmt;

use cognita_core::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Discriminant of [`MentalArithmetic`].
pub const MENTAL_ARITHMETIC_TAG: &str = "mental_arithmetic";
/// Discriminant of [`MemoryMatrix`].
pub const MEMORY_MATRIX_TAG: &str = "memory_matrix";
/// Discriminant of [`LanguageDiscrimination`].
pub const LANGUAGE_DISCRIMINATION_TAG: &str = "mental_language_discrimination";

/// Operand range used when content does not specify one.
pub const DEFAULT_OPERAND_RANGE: OperandRange = OperandRange { min: 1, max: 10 };

/// Operators used when content does not specify any.
pub const DEFAULT_OPERATORS: [Operator; 2] = [Operator::Add, Operator::Subtract];

/// A validated piece of game content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ContentVariant {
    /// Solve a run of arithmetic problems.
    #[serde(rename = "mental_arithmetic")]
    MentalArithmetic(MentalArithmetic),
    /// Memorize highlighted cells on a grid, then recall them.
    #[serde(rename = "memory_matrix")]
    MemoryMatrix(MemoryMatrix),
    /// Pick the option that correctly completes a sentence.
    #[serde(rename = "mental_language_discrimination")]
    LanguageDiscrimination(LanguageDiscrimination),
}

impl ContentVariant {
    /// The discriminant string of this variant.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MentalArithmetic(_) => MENTAL_ARITHMETIC_TAG,
            Self::MemoryMatrix(_) => MEMORY_MATRIX_TAG,
            Self::LanguageDiscrimination(_) => LANGUAGE_DISCRIMINATION_TAG,
        }
    }

    /// Hex SHA-256 of the canonical JSON form.
    ///
    /// Sessions record this so a replay against drifted content is detected.
    ///
    /// # Panics
    ///
    /// Never: serializing these derived types cannot fail.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        // serde_json's default map is ordered, so the encoding is canonical.
        let bytes =
            serde_json::to_vec(self).expect("ContentVariant serialization is infallible");
        format!("{:x}", Sha256::digest(&bytes))
    }
}

impl<'de> Deserialize<'de> for ContentVariant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        crate::domain::validation::validate(&raw).map_err(serde::de::Error::custom)
    }
}

/// An arithmetic operator drawn from `{+, -, x, *, /}`.
///
/// `x` and `*` both multiply; they stay distinct so content round-trips
/// with the glyph its author chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `+`
    #[serde(rename = "+")]
    Add,
    /// `-`
    #[serde(rename = "-")]
    Subtract,
    /// `x`
    #[serde(rename = "x")]
    Times,
    /// `*`
    #[serde(rename = "*")]
    Asterisk,
    /// `/`
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    /// Parses an operator symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "x" => Some(Self::Times),
            "*" => Some(Self::Asterisk),
            "/" => Some(Self::Divide),
            _ => None,
        }
    }

    /// The symbol as written in content.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Times => "x",
            Self::Asterisk => "*",
            Self::Divide => "/",
        }
    }

    /// Applies the operator. Returns `None` on overflow, division by zero
    /// or a non-integral quotient.
    #[must_use]
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Self::Add => lhs.checked_add(rhs),
            Self::Subtract => lhs.checked_sub(rhs),
            Self::Times | Self::Asterisk => lhs.checked_mul(rhs),
            Self::Divide => {
                if rhs == 0 || lhs % rhs != 0 {
                    None
                } else {
                    lhs.checked_div(rhs)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Inclusive `[min, max]` bounds for generated operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandRange {
    min: i64,
    max: i64,
}

impl OperandRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::OutOfRange {
                field: "operandRange".to_owned(),
                reason: format!("min {min} is greater than max {max}"),
            });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub fn min(self) -> i64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(self) -> i64 {
        self.max
    }

    /// Whether the range holds any value usable as a divisor.
    #[must_use]
    pub fn has_nonzero(self) -> bool {
        !(self.min == 0 && self.max == 0)
    }
}

impl Serialize for OperandRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.min, self.max].serialize(serializer)
    }
}

/// Parameters of a mental arithmetic game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalArithmetic {
    #[serde(skip_serializing_if = "Option::is_none")]
    operand_range: Option<OperandRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operators: Option<Vec<Operator>>,
}

impl MentalArithmetic {
    /// Creates arithmetic content.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for an empty or duplicated operator list;
    /// `ReferentialMismatch` when `/` is requested but the effective range
    /// is `[0, 0]`.
    pub fn new(
        operand_range: Option<OperandRange>,
        operators: Option<Vec<Operator>>,
    ) -> Result<Self, ValidationError> {
        if let Some(ops) = &operators {
            if ops.is_empty() {
                return Err(empty_operators());
            }
            for (index, op) in ops.iter().enumerate() {
                if ops[..index].contains(op) {
                    return Err(duplicate_operator(index, *op));
                }
            }
            let range = operand_range.unwrap_or(DEFAULT_OPERAND_RANGE);
            if let Some(index) = ops.iter().position(|op| *op == Operator::Divide) {
                if !range.has_nonzero() {
                    return Err(ValidationError::ReferentialMismatch {
                        field: format!("operators[{index}]"),
                        reason: "division needs a non-zero value in operandRange".to_owned(),
                    });
                }
            }
        }
        Ok(Self {
            operand_range,
            operators,
        })
    }

    /// The range as authored, if any.
    #[must_use]
    pub fn operand_range(&self) -> Option<OperandRange> {
        self.operand_range
    }

    /// The operators as authored, if any.
    #[must_use]
    pub fn operators(&self) -> Option<&[Operator]> {
        self.operators.as_deref()
    }

    /// The range a game should draw from, applying the default.
    #[must_use]
    pub fn effective_range(&self) -> OperandRange {
        self.operand_range.unwrap_or(DEFAULT_OPERAND_RANGE)
    }

    /// The operators a game should draw from, applying the default.
    #[must_use]
    pub fn effective_operators(&self) -> &[Operator] {
        self.operators.as_deref().unwrap_or(&DEFAULT_OPERATORS)
    }
}

pub(crate) fn empty_operators() -> ValidationError {
    ValidationError::OutOfRange {
        field: "operators".to_owned(),
        reason: "must not be empty".to_owned(),
    }
}

pub(crate) fn duplicate_operator(index: usize, op: Operator) -> ValidationError {
    ValidationError::OutOfRange {
        field: format!("operators[{index}]"),
        reason: format!("duplicate operator {op}"),
    }
}

/// Dimensions of a memory grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSize {
    rows: u32,
    cols: u32,
}

impl GridSize {
    /// Creates a grid size.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if either dimension is zero.
    pub fn new(rows: u32, cols: u32) -> Result<Self, ValidationError> {
        Self::check_dimension("gridSize.rows", rows)?;
        Self::check_dimension("gridSize.cols", cols)?;
        Ok(Self { rows, cols })
    }

    pub(crate) fn check_dimension(field: &str, value: u32) -> Result<u32, ValidationError> {
        if value < 1 {
            return Err(ValidationError::OutOfRange {
                field: field.to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(value)
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(self) -> u32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(self) -> u32 {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

/// Parameters of a memory matrix game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMatrix {
    grid_size: GridSize,
    target_count: u32,
    display_time_ms: u64,
}

impl MemoryMatrix {
    /// Creates memory matrix content.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `target_count` exceeds the cell count or
    /// `display_time_ms` is zero.
    pub fn new(
        grid_size: GridSize,
        target_count: u32,
        display_time_ms: u64,
    ) -> Result<Self, ValidationError> {
        Self::check_target_count(grid_size, target_count)?;
        Self::check_display_time(display_time_ms)?;
        Ok(Self {
            grid_size,
            target_count,
            display_time_ms,
        })
    }

    pub(crate) fn check_target_count(
        grid_size: GridSize,
        target_count: u32,
    ) -> Result<u32, ValidationError> {
        if u64::from(target_count) > grid_size.cell_count() {
            return Err(ValidationError::OutOfRange {
                field: "targetCount".to_owned(),
                reason: format!("must be at most {}", grid_size.cell_count()),
            });
        }
        Ok(target_count)
    }

    pub(crate) fn check_display_time(display_time_ms: u64) -> Result<u64, ValidationError> {
        if display_time_ms == 0 {
            return Err(ValidationError::OutOfRange {
                field: "displayTimeMs".to_owned(),
                reason: "must be positive".to_owned(),
            });
        }
        Ok(display_time_ms)
    }

    /// Grid dimensions.
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    /// Number of cells to memorize.
    #[must_use]
    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    /// How long targets stay visible.
    #[must_use]
    pub fn display_time_ms(&self) -> u64 {
        self.display_time_ms
    }
}

/// Parameters of a language discrimination question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDiscrimination {
    sentence_parts: Vec<String>,
    options: Vec<String>,
    answer: String,
}

impl LanguageDiscrimination {
    /// Creates language discrimination content.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for empty `sentence_parts`; `ReferentialMismatch` if
    /// `answer` is not one of `options`.
    pub fn new(
        sentence_parts: Vec<String>,
        options: Vec<String>,
        answer: String,
    ) -> Result<Self, ValidationError> {
        Self::check_sentence_parts(&sentence_parts)?;
        if !options.contains(&answer) {
            return Err(ValidationError::ReferentialMismatch {
                field: "answer".to_owned(),
                reason: format!("{answer:?} is not one of the options"),
            });
        }
        Ok(Self {
            sentence_parts,
            options,
            answer,
        })
    }

    pub(crate) fn check_sentence_parts(sentence_parts: &[String]) -> Result<(), ValidationError> {
        if sentence_parts.is_empty() {
            return Err(ValidationError::OutOfRange {
                field: "sentenceParts".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// The sentence fragments around the blank.
    #[must_use]
    pub fn sentence_parts(&self) -> &[String] {
        &self.sentence_parts
    }

    /// The candidate answers, in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The correct option.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Index of the first option equal to the answer.
    #[must_use]
    pub fn answer_index(&self) -> usize {
        // The constructor guarantees the answer is present.
        self.options
            .iter()
            .position(|o| *o == self.answer)
            .unwrap_or_default()
    }
}
