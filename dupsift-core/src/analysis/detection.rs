//! Duplicate detection.
//!
//! Rows are partitioned into groups by their normalized key over the
//! selected columns in a single pass with a hash index, then each mode
//! decides which rows of a duplicate group are flagged and which are kept.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::Result;
use crate::models::{ColumnType, Dataset};

use super::config::{AnalysisConfig, DetectionMode, resolve_columns};
use super::models::{DetectionResult, DuplicateGroup};
use super::normalize::{NormalizedKey, Normalizer};
use super::profile::infer_column_type;

/// Detects duplicates using an analysis configuration.
pub fn detect_duplicates(dataset: &Dataset, config: &AnalysisConfig) -> Result<DetectionResult> {
    config.validate(dataset)?;
    detect(
        dataset,
        &config.selected_columns,
        config.mode,
        &config.normalizer(),
    )
}

/// Detects duplicate rows over `selected_columns`.
///
/// Fails with `InvalidSelection` when the selection is empty or names an
/// unknown column. A dataset without rows yields an empty result. The
/// function is pure: identical inputs always give identical results.
pub fn detect(
    dataset: &Dataset,
    selected_columns: &[String],
    mode: DetectionMode,
    normalizer: &Normalizer,
) -> Result<DetectionResult> {
    let indices = resolve_columns(dataset, selected_columns)?;
    let key_columns: Vec<(usize, ColumnType)> = indices
        .into_iter()
        .map(|index| (index, infer_column_type(dataset, index)))
        .collect();

    Ok(detect_with_types(
        dataset,
        selected_column_names(dataset, &key_columns),
        &key_columns,
        mode,
        normalizer,
    ))
}

/// Column names for resolved key columns, deduplicated, in selection order.
pub(crate) fn selected_column_names(
    dataset: &Dataset,
    key_columns: &[(usize, ColumnType)],
) -> Vec<String> {
    key_columns
        .iter()
        .filter_map(|(index, _)| dataset.columns().get(*index).cloned())
        .collect()
}

/// Detection over already-resolved key columns and their types.
pub(crate) fn detect_with_types(
    dataset: &Dataset,
    selected_columns: Vec<String>,
    key_columns: &[(usize, ColumnType)],
    mode: DetectionMode,
    normalizer: &Normalizer,
) -> DetectionResult {
    let total_rows = dataset.row_count();
    if total_rows == 0 {
        tracing::debug!("Dataset has no rows; nothing to detect");
        return DetectionResult::empty(mode, selected_columns);
    }

    let groups = partition(dataset, key_columns, normalizer);

    let mut flagged = vec![false; total_rows];
    let mut kept = vec![false; total_rows];
    let mut singleton_count = 0;

    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };

        if !group.is_duplicate() {
            kept[first] = true;
            singleton_count += 1;
            continue;
        }

        let keeper = match mode {
            DetectionMode::All | DetectionMode::KeepFirst => first,
            DetectionMode::KeepLast => last,
        };
        kept[keeper] = true;

        for &row in &group.rows {
            if mode == DetectionMode::All || row != keeper {
                flagged[row] = true;
            }
        }
    }

    let flagged = true_indices(&flagged);
    let cleaned = true_indices(&kept);
    let groups: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(DuplicateGroup::is_duplicate)
        .collect();

    tracing::debug!(
        "Detected {} duplicate groups over [{}] in {} mode: {} flagged, {} kept",
        groups.len(),
        selected_columns.join(", "),
        mode,
        flagged.len(),
        cleaned.len()
    );

    DetectionResult {
        mode,
        selected_columns,
        total_rows,
        groups,
        singleton_count,
        flagged,
        cleaned,
    }
}

/// Groups row indices by normalized key.
///
/// Groups come out in first-seen key order with ascending rows.
fn partition(
    dataset: &Dataset,
    key_columns: &[(usize, ColumnType)],
    normalizer: &Normalizer,
) -> Vec<DuplicateGroup> {
    let mut index: HashMap<NormalizedKey, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (row_index, row) in dataset.rows().iter().enumerate() {
        let key = normalizer.key(row, key_columns);
        match index.entry(key) {
            Entry::Occupied(entry) => {
                if let Some(group) = groups.get_mut(*entry.get()) {
                    group.rows.push(row_index);
                }
            }
            Entry::Vacant(entry) => {
                groups.push(DuplicateGroup {
                    key: entry.key().clone(),
                    rows: vec![row_index],
                });
                entry.insert(groups.len() - 1);
            }
        }
    }

    groups
}

fn true_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(index, &set)| set.then_some(index))
        .collect()
}
