use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tag::{TagKind, TagRelation};
use crate::store::Records;

/// Trims surrounding whitespace. Blank names have no canonical record.
fn normalize_tag_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    (!name.is_empty()).then_some(name)
}

/// Resolves free-text names to canonical tag ids, one id per input name,
/// in input order. Unknown names are created; known names are reused.
///
/// Every name is validated before the first write, so a blank name fails the
/// batch without creating anything. A storage failure on any item fails the
/// whole batch.
pub async fn resolve_tags<R: Records + ?Sized>(
    records: &mut R,
    kind: TagKind,
    names: &[String],
) -> Result<Vec<Uuid>, AppError> {
    let normalized = names
        .iter()
        .map(|raw| {
            normalize_tag_name(raw).ok_or_else(|| {
                AppError::Validation(format!("{} names cannot be empty", kind.label()))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Each distinct name is upserted once, in sorted order, so concurrent
    // batches always lock tag rows in the same order.
    let mut distinct = normalized.clone();
    distinct.sort_unstable();
    distinct.dedup();
    let mut resolved = BTreeMap::new();
    for name in distinct {
        resolved.insert(name, records.upsert_tag(kind, name).await?);
    }

    let ids: Vec<Uuid> = normalized.iter().map(|name| resolved[name]).collect();

    debug!("Resolved {} {} name(s) to canonical ids", ids.len(), kind.label());
    Ok(ids)
}

/// Sets the owner's tags for `relation` to exactly `names`.
///
/// Full-replace: an empty slice clears the relation. Tag records themselves
/// are never deleted, so other owners linking the same tag are unaffected.
pub async fn assign_tag_set<R: Records + ?Sized>(
    records: &mut R,
    relation: TagRelation,
    owner_id: Uuid,
    names: &[String],
) -> Result<Vec<Uuid>, AppError> {
    let ids = resolve_tags(records, relation.kind(), names).await?;
    records.replace_tag_links(relation, owner_id, &ids).await?;
    Ok(ids)
}
