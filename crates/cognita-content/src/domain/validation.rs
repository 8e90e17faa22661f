//! Validation of untrusted content records into [`ContentVariant`]s.
//!
//! Fields are read in declaration order, and each one is checked for
//! presence, JSON type and range before the next field is looked at. Only
//! rules that relate two fields (an answer among the options, division over
//! an all-zero range) wait for the variant's checked constructor. The first
//! failure wins. `null` in an optional field reads as absent; unknown extra
//! fields are ignored.

use cognita_core::error::ValidationError;
use serde_json::{Map, Value};

use super::variant::{
    ContentVariant, GridSize, LANGUAGE_DISCRIMINATION_TAG, LanguageDiscrimination,
    MEMORY_MATRIX_TAG, MENTAL_ARITHMETIC_TAG, MemoryMatrix, MentalArithmetic, OperandRange,
    Operator, duplicate_operator, empty_operators,
};

/// Validates a raw record into a typed content variant.
///
/// Pure and total: never mutates `raw`, never coerces a value into range.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate(raw: &Value) -> Result<ContentVariant, ValidationError> {
    let Some(object) = raw.as_object() else {
        return Err(ValidationError::UnknownVariant(None));
    };
    let tag = match object.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => return Err(ValidationError::UnknownVariant(Some(other.to_string()))),
        None => return Err(ValidationError::UnknownVariant(None)),
    };

    match tag {
        MENTAL_ARITHMETIC_TAG => {
            validate_mental_arithmetic(object).map(ContentVariant::MentalArithmetic)
        }
        MEMORY_MATRIX_TAG => validate_memory_matrix(object).map(ContentVariant::MemoryMatrix),
        LANGUAGE_DISCRIMINATION_TAG => {
            validate_language_discrimination(object).map(ContentVariant::LanguageDiscrimination)
        }
        unknown => Err(ValidationError::UnknownVariant(Some(unknown.to_owned()))),
    }
}

fn validate_mental_arithmetic(
    object: &Map<String, Value>,
) -> Result<MentalArithmetic, ValidationError> {
    let operand_range = match optional(object, "operandRange") {
        None => None,
        Some(value) => {
            let items = array(value, "operandRange")?;
            if items.len() != 2 {
                return Err(ValidationError::OutOfRange {
                    field: "operandRange".to_owned(),
                    reason: format!("must hold exactly 2 bounds, found {}", items.len()),
                });
            }
            let min = integer(&items[0], "operandRange[0]")?;
            let max = integer(&items[1], "operandRange[1]")?;
            Some(OperandRange::new(min, max)?)
        }
    };

    let operators = match optional(object, "operators") {
        None => None,
        Some(value) => {
            let items = array(value, "operators")?;
            if items.is_empty() {
                return Err(empty_operators());
            }
            let mut operators: Vec<Operator> = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let path = format!("operators[{index}]");
                let symbol = string(item, &path)?;
                let operator = Operator::from_symbol(symbol).ok_or_else(|| {
                    ValidationError::InvalidEnumMember {
                        field: path,
                        value: symbol.to_owned(),
                    }
                })?;
                if operators.contains(&operator) {
                    return Err(duplicate_operator(index, operator));
                }
                operators.push(operator);
            }
            Some(operators)
        }
    };

    MentalArithmetic::new(operand_range, operators)
}

fn validate_memory_matrix(object: &Map<String, Value>) -> Result<MemoryMatrix, ValidationError> {
    let grid = required(object, "gridSize")?;
    let Some(grid) = grid.as_object() else {
        return Err(ValidationError::InvalidType {
            field: "gridSize".to_owned(),
            expected: "an object",
        });
    };
    let rows = unsigned_u32(required_in(grid, "gridSize", "rows")?, "gridSize.rows")?;
    GridSize::check_dimension("gridSize.rows", rows)?;
    let cols = unsigned_u32(required_in(grid, "gridSize", "cols")?, "gridSize.cols")?;
    let grid_size = GridSize::new(rows, cols)?;
    let target_count = unsigned_u32(required(object, "targetCount")?, "targetCount")?;
    MemoryMatrix::check_target_count(grid_size, target_count)?;
    let display_time_ms = unsigned(required(object, "displayTimeMs")?, "displayTimeMs")?;

    MemoryMatrix::new(grid_size, target_count, display_time_ms)
}

fn validate_language_discrimination(
    object: &Map<String, Value>,
) -> Result<LanguageDiscrimination, ValidationError> {
    let sentence_parts = string_list(required(object, "sentenceParts")?, "sentenceParts")?;
    LanguageDiscrimination::check_sentence_parts(&sentence_parts)?;
    let options = string_list(required(object, "options")?, "options")?;
    let answer = string(required(object, "answer")?, "answer")?.to_owned();

    LanguageDiscrimination::new(sentence_parts, options, answer)
}

fn optional<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

fn required<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ValidationError> {
    object.get(field).ok_or_else(|| ValidationError::MissingField {
        field: field.to_owned(),
    })
}

fn required_in<'a>(
    object: &'a Map<String, Value>,
    parent: &str,
    field: &str,
) -> Result<&'a Value, ValidationError> {
    object.get(field).ok_or_else(|| ValidationError::MissingField {
        field: format!("{parent}.{field}"),
    })
}

fn integer(value: &Value, path: &str) -> Result<i64, ValidationError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    if value.is_u64() {
        return Err(ValidationError::OutOfRange {
            field: path.to_owned(),
            reason: "does not fit a 64-bit integer".to_owned(),
        });
    }
    Err(ValidationError::InvalidType {
        field: path.to_owned(),
        expected: "an integer",
    })
}

fn unsigned(value: &Value, path: &str) -> Result<u64, ValidationError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    if value.is_i64() {
        return Err(ValidationError::OutOfRange {
            field: path.to_owned(),
            reason: "must not be negative".to_owned(),
        });
    }
    Err(ValidationError::InvalidType {
        field: path.to_owned(),
        expected: "an integer",
    })
}

fn unsigned_u32(value: &Value, path: &str) -> Result<u32, ValidationError> {
    let n = unsigned(value, path)?;
    u32::try_from(n).map_err(|_| ValidationError::OutOfRange {
        field: path.to_owned(),
        reason: format!("must be at most {}", u32::MAX),
    })
}

fn string<'a>(value: &'a Value, path: &str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| ValidationError::InvalidType {
        field: path.to_owned(),
        expected: "a string",
    })
}

fn array<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], ValidationError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ValidationError::InvalidType {
            field: path.to_owned(),
            expected: "an array",
        })
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>, ValidationError> {
    array(value, path)?
        .iter()
        .enumerate()
        .map(|(index, item)| string(item, &format!("{path}[{index}]")).map(str::to_owned))
        .collect()
}
