//! Catalog builders shared by unit tests across the crate.

use rust_decimal::Decimal;

use super::{
    Catalog, Episode, EpisodeId, PricingPolicy, Series, SeriesDraft, SeriesId, SeriesKind,
};

/// Shape of a generated test catalog.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CatalogShape {
    pub base_episodes: u32,
    pub base_free: u32,
    pub sequel_episodes: u32,
    pub sequel_free: u32,
}

impl Default for CatalogShape {
    /// Mirrors the bundled catalog: 73 base episodes, 10 sequel episodes.
    fn default() -> Self {
        Self {
            base_episodes: 73,
            base_free: 4,
            sequel_episodes: 10,
            sequel_free: 4,
        }
    }
}

pub(crate) fn series_id(raw: &str) -> SeriesId {
    SeriesId::new(raw).expect("fixture series id")
}

pub(crate) fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn episodes(first_id: u32, count: u32, slug: &str) -> Vec<Episode> {
    (1..=count)
        .map(|position| Episode {
            id: EpisodeId::new(first_id + position - 1),
            position,
            season: (position - 1) / 10 + 1,
            number: (position - 1) % 10 + 1,
            title: format!("{slug} {position}"),
            description: format!("episode {position} of {slug}"),
            video_url: format!("https://media.test/{slug}/{position}.mp4"),
        })
        .collect()
}

/// Build a base series `got` (ids from 1) and a sequel `hod` whose ids
/// continue after the base.
pub(crate) fn catalog(shape: CatalogShape) -> Catalog {
    let got = series_id("got");
    let hod = series_id("hod");
    let base = Series::new(SeriesDraft {
        id: got.clone(),
        title: "Game of Thrones".to_owned(),
        description: "base".to_owned(),
        poster_url: "https://media.test/got.jpg".to_owned(),
        kind: SeriesKind::Base,
        pricing: PricingPolicy::new(&got, shape.base_free, cents(10), cents(50))
            .expect("base pricing"),
        episodes: episodes(1, shape.base_episodes, "got"),
    })
    .expect("base series");
    let sequel = Series::new(SeriesDraft {
        id: hod.clone(),
        title: "House of the Dragon".to_owned(),
        description: "sequel".to_owned(),
        poster_url: "https://media.test/hod.jpg".to_owned(),
        kind: SeriesKind::Sequel {
            requires: got,
            unlock_price: cents(200),
        },
        pricing: PricingPolicy::new(&hod, shape.sequel_free, cents(20), cents(60))
            .expect("sequel pricing"),
        episodes: episodes(shape.base_episodes + 1, shape.sequel_episodes, "hod"),
    })
    .expect("sequel series");
    Catalog::new(vec![base, sequel]).expect("fixture catalog")
}

/// The default-shaped catalog.
pub(crate) fn default_catalog() -> Catalog {
    catalog(CatalogShape::default())
}
