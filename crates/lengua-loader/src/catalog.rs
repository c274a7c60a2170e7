//! Concurrent loading of all three categories into a catalog.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use lengua_core::error::LoadError;
use lengua_core::ingest::{
    ingest_conjugations, ingest_devices, ingest_spelling, parse_records, IngestWarning, Ingested,
};
use lengua_core::model::Category;
use lengua_core::repository::Catalog;

use crate::source::ItemSource;

/// One source per category.
pub struct Sources {
    pub spelling: Box<dyn ItemSource>,
    pub devices: Box<dyn ItemSource>,
    pub conjugations: Box<dyn ItemSource>,
}

/// How loading one category went.
#[derive(Debug)]
pub struct CategoryReport {
    pub category: Category,
    pub location: String,
    /// Usable items kept.
    pub loaded: usize,
    /// Records that were skipped or repaired.
    pub warnings: Vec<IngestWarning>,
    /// Set when the whole category failed and was left empty.
    pub error: Option<LoadError>,
}

impl CategoryReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The loaded catalog plus a report per category, in [`Category::ALL`] order.
#[derive(Debug)]
pub struct LoadOutcome {
    pub catalog: Catalog,
    pub reports: Vec<CategoryReport>,
}

async fn fetch_records(source: &dyn ItemSource, timeout: Duration) -> Result<Vec<Value>, LoadError> {
    let text = tokio::time::timeout(timeout, source.fetch())
        .await
        .map_err(|_| LoadError::Timeout(timeout.as_secs()))??;
    parse_records(&text)
}

fn settle<T>(
    category: Category,
    source: &dyn ItemSource,
    fetched: Result<Vec<Value>, LoadError>,
    ingest: fn(&[Value]) -> Ingested<T>,
) -> (Vec<T>, CategoryReport) {
    let location = source.location();
    match fetched {
        Ok(records) => {
            let Ingested { items, warnings } = ingest(&records);
            info!(
                %category,
                loaded = items.len(),
                skipped = warnings.len(),
                "category loaded"
            );
            let report = CategoryReport {
                category,
                location,
                loaded: items.len(),
                warnings,
                error: None,
            };
            (items, report)
        }
        Err(e) => {
            warn!(%category, %location, error = %e, "category unavailable, continuing without it");
            let report = CategoryReport {
                category,
                location,
                loaded: 0,
                warnings: Vec::new(),
                error: Some(e),
            };
            (Vec::new(), report)
        }
    }
}

/// Fetch and ingest every category concurrently. Each fetch is bounded by
/// `timeout`. Never fails: a broken category comes back empty with its
/// error in the report.
pub async fn load_catalog(sources: &Sources, timeout: Duration) -> LoadOutcome {
    let (spelling, devices, conjugations) = tokio::join!(
        fetch_records(sources.spelling.as_ref(), timeout),
        fetch_records(sources.devices.as_ref(), timeout),
        fetch_records(sources.conjugations.as_ref(), timeout),
    );

    let (spelling, spelling_report) = settle(
        Category::Spelling,
        sources.spelling.as_ref(),
        spelling,
        ingest_spelling,
    );
    let (devices, devices_report) = settle(
        Category::LiteraryDevice,
        sources.devices.as_ref(),
        devices,
        ingest_devices,
    );
    let (conjugations, conjugations_report) = settle(
        Category::Conjugation,
        sources.conjugations.as_ref(),
        conjugations,
        ingest_conjugations,
    );

    LoadOutcome {
        catalog: Catalog {
            spelling,
            devices,
            conjugations,
        },
        reports: vec![spelling_report, devices_report, conjugations_report],
    }
}
