//! Translation loading through the backend port.

use cognita_core::error::DomainError;
use cognita_core::ports::{TranslationRequest, TranslationSource};
use tracing::{info, instrument};

use crate::domain::translation::{TranslationMap, build_map};

/// Fetches the rows matching `request` and folds them into a map.
///
/// # Errors
///
/// Returns the source's `DomainError` if the fetch fails.
#[instrument(
    skip(source, request),
    fields(entity_type = %request.entity_type, locale = %request.locale)
)]
pub async fn load_translations(
    source: &dyn TranslationSource,
    request: &TranslationRequest,
) -> Result<TranslationMap, DomainError> {
    let rows = source.fetch_translations(request).await?;
    let row_count = rows.len();
    let map = build_map(rows);

    info!(
        row_count,
        resolved = map.len(),
        entities = request.entity_ids.len(),
        "translations loaded"
    );

    Ok(map)
}
