//! Deterministic episode generation from catalog documents.
//!
//! Episode identifiers are assigned sequentially across the whole document,
//! starting at 1, in series then season order. Reordering series in the
//! document therefore changes identifiers; appending a series does not.

use crate::document::{CatalogDocument, SeriesDefinition, SeriesKindDefinition};
use crate::error::CatalogDataError;
use crate::seed::{EpisodeSeed, PricingSeed, SeriesKindSeed, SeriesSeed};

/// Expands every series in `document` into its episodes.
///
/// # Errors
///
/// Returns [`CatalogDataError::IdOverflow`] if the catalog holds more
/// episodes than fit in a `u32`.
///
/// # Example
///
/// ```
/// use catalog_data::{default_document, generate_catalog};
///
/// let series = generate_catalog(&default_document().expect("bundled")).expect("generated");
/// let sequel = &series[1];
///
/// assert_eq!(sequel.episodes.first().map(|e| e.id), Some(74));
/// ```
pub fn generate_catalog(document: &CatalogDocument) -> Result<Vec<SeriesSeed>, CatalogDataError> {
    let mut next_id: u32 = 1;
    document
        .series()
        .iter()
        .map(|definition| generate_series(definition, &mut next_id))
        .collect()
}

fn generate_series(
    definition: &SeriesDefinition,
    next_id: &mut u32,
) -> Result<SeriesSeed, CatalogDataError> {
    let overflow = || CatalogDataError::IdOverflow {
        series: definition.id.clone(),
    };
    let mut episodes = Vec::new();
    let mut position: u32 = 0;

    for (season, length) in (1_u32..).zip(definition.season_lengths.iter().copied()) {
        for number in 1..=length {
            position = position.checked_add(1).ok_or_else(overflow)?;
            let id = *next_id;
            *next_id = next_id.checked_add(1).ok_or_else(overflow)?;
            episodes.push(EpisodeSeed {
                id,
                position,
                season,
                number,
                title: format!("Season {season}, Episode {number}"),
                description: format!(
                    "Episode {number} of season {season} of {}.",
                    definition.title
                ),
                video_url: render_video_url(&definition.video_url_template, id, season, number),
            });
        }
    }

    Ok(SeriesSeed {
        id: definition.id.clone(),
        title: definition.title.clone(),
        description: definition.description.clone(),
        poster_url: definition.poster_url.clone(),
        kind: match &definition.kind {
            SeriesKindDefinition::Base => SeriesKindSeed::Base,
            SeriesKindDefinition::Sequel {
                requires,
                unlock_price,
            } => SeriesKindSeed::Sequel {
                requires: requires.clone(),
                unlock_price: *unlock_price,
            },
        },
        pricing: PricingSeed {
            free_threshold: definition.pricing.free_threshold,
            watch_price: definition.pricing.watch_price,
            download_price: definition.pricing.download_price,
        },
        episodes,
    })
}

fn render_video_url(template: &str, id: u32, season: u32, number: u32) -> String {
    template
        .replace("{id}", &id.to_string())
        .replace("{season}", &season.to_string())
        .replace("{episode}", &number.to_string())
}
