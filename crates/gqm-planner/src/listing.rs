//! Catalog listing

use gqm_catalog::{Catalog, CatalogLevel};
use gqm_i18n::{resolve_display, Translator};
use gqm_model::Text;
use serde::Serialize;

/// One catalog entry with its display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    pub level: CatalogLevel,
    /// Key to use in authoring scripts (acronym for measurements)
    pub key: String,
    pub display: String,
}

fn row(level: CatalogLevel, key: &Text, t: &dyn Translator) -> CatalogRow {
    CatalogRow {
        level,
        key: key.raw().to_string(),
        display: resolve_display(key, t),
    }
}

/// Entries of `level`, or of every level in hierarchy order
#[must_use]
pub fn catalog_rows(
    catalog: &Catalog,
    level: Option<CatalogLevel>,
    t: &dyn Translator,
) -> Vec<CatalogRow> {
    let levels = match level {
        Some(level) => vec![level],
        None => CatalogLevel::ALL.to_vec(),
    };
    let mut rows = Vec::new();
    for level in levels {
        match level {
            CatalogLevel::Objective => rows.extend(
                catalog
                    .objectives()
                    .iter()
                    .map(|o| row(level, &o.title, t)),
            ),
            CatalogLevel::Question => rows.extend(
                catalog
                    .questions()
                    .iter()
                    .map(|q| row(level, &q.text, t)),
            ),
            CatalogLevel::Metric => rows.extend(
                catalog
                    .metrics()
                    .iter()
                    .map(|m| row(level, &m.name, t)),
            ),
            CatalogLevel::Measurement => {
                rows.extend(catalog.measurements().iter().map(|m| CatalogRow {
                    level,
                    key: m.acronym.clone(),
                    display: format!(
                        "{} ({})",
                        resolve_display(&m.properties, t),
                        resolve_display(&m.unit, t)
                    ),
                }));
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqm_catalog::english_bundle;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_level_is_filtered() {
        let t = english_bundle().unwrap();
        let rows = catalog_rows(Catalog::builtin(), Some(CatalogLevel::Metric), &t);
        assert_eq!(rows.len(), Catalog::builtin().metrics().len());
        assert!(rows.iter().all(|r| r.level == CatalogLevel::Metric));
        assert!(rows.iter().any(|r| r.key == "metrics.leadTime.name"));
    }

    #[test]
    fn all_levels_in_hierarchy_order() {
        let t = english_bundle().unwrap();
        let rows = catalog_rows(Catalog::builtin(), None, &t);
        assert_eq!(rows.first().map(|r| r.level), Some(CatalogLevel::Objective));
        assert_eq!(rows.last().map(|r| r.level), Some(CatalogLevel::Measurement));
        assert!(rows.iter().all(|r| !r.display.starts_with("objective.")));
    }
}
