//! Localization of typed content.
//!
//! Only language discrimination carries learner-facing text. Its sentence
//! parts and options are looked up under indexed field names
//! (`sentence_part.0`, `option.2`, ...) and the answer follows its option,
//! so a localized question still has exactly one correct choice.

use cognita_content::domain::variant::{ContentVariant, LanguageDiscrimination};
use tracing::warn;

use super::translation::TranslationMap;

/// Field-name prefix for sentence fragments.
pub const SENTENCE_PART_FIELD: &str = "sentence_part";
/// Field-name prefix for answer options.
pub const OPTION_FIELD: &str = "option";

/// Translation field key for sentence fragment `index`.
#[must_use]
pub fn sentence_part_field(index: usize) -> String {
    format!("{SENTENCE_PART_FIELD}.{index}")
}

/// Translation field key for option `index`.
#[must_use]
pub fn option_field(index: usize) -> String {
    format!("{OPTION_FIELD}.{index}")
}

/// Every translation field `variant` can consume.
#[must_use]
pub fn localizable_fields(variant: &ContentVariant) -> Vec<String> {
    match variant {
        ContentVariant::LanguageDiscrimination(content) => (0..content.sentence_parts().len())
            .map(sentence_part_field)
            .chain((0..content.options().len()).map(option_field))
            .collect(),
        ContentVariant::MentalArithmetic(_) | ContentVariant::MemoryMatrix(_) => Vec::new(),
    }
}

/// Applies the translation overlay for `entity_id` to `variant`.
///
/// Falls back to the untranslated variant, with a warning, when the overlay
/// would make the answer ambiguous.
#[must_use]
pub fn localize_variant(
    variant: &ContentVariant,
    map: &TranslationMap,
    entity_id: &str,
) -> ContentVariant {
    match variant {
        ContentVariant::LanguageDiscrimination(content) => {
            match localize_language(content, map, entity_id) {
                Some(localized) => ContentVariant::LanguageDiscrimination(localized),
                None => {
                    warn!(
                        %entity_id,
                        "translation overlay makes answer ambiguous; using base text"
                    );
                    variant.clone()
                }
            }
        }
        ContentVariant::MentalArithmetic(_) | ContentVariant::MemoryMatrix(_) => variant.clone(),
    }
}

fn localize_language(
    content: &LanguageDiscrimination,
    map: &TranslationMap,
    entity_id: &str,
) -> Option<LanguageDiscrimination> {
    let sentence_parts: Vec<String> = content
        .sentence_parts()
        .iter()
        .enumerate()
        .map(|(i, base)| {
            map.resolve(entity_id, &sentence_part_field(i), Some(base))
                .to_owned()
        })
        .collect();
    let options: Vec<String> = content
        .options()
        .iter()
        .enumerate()
        .map(|(i, base)| map.resolve(entity_id, &option_field(i), Some(base)).to_owned())
        .collect();

    let answer_index = content.answer_index();
    let answer = options.get(answer_index)?.clone();
    if options.iter().position(|o| *o == answer) != Some(answer_index) {
        return None;
    }

    LanguageDiscrimination::new(sentence_parts, options, answer).ok()
}
