//! Base importer (reference remapper)
//!
//! Imports a serialized bundle of categories, tags, questions and their
//! cross-references into a fresh identifier space. Category insertion is
//! strictly parent-before-child (the store enforces the foreign key), and
//! all old→new identifier maps are locals of one import call so concurrent
//! imports cannot interfere.
//!
//! Failure policy: the first store error aborts the import and propagates;
//! rows already written remain (no compensating rollback). Unresolvable
//! references never abort — the affected row is dropped and logged.

use crate::bundle::{BaseBundle, BundleId, CategoryEntry};
use crate::sanitize::{clip_text, MAX_NAME_LEN};
use quizstage_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Import a base bundle, returning the new base id.
///
/// Insertion order: base row, category tree (parents first, siblings by
/// `ord`), tags, questions (input order), then the two association lists.
/// A category whose parent never resolves is unreachable and is dropped
/// together with its subtree.
pub async fn import_base(pool: &SqlitePool, bundle: &BaseBundle) -> Result<String> {
    let base_id = Uuid::new_v4().to_string();
    let base_name = clip_text(&bundle.base.name, MAX_NAME_LEN, "Imported base");

    sqlx::query("INSERT INTO bases (guid, name) VALUES (?, ?)")
        .bind(&base_id)
        .bind(&base_name)
        .execute(pool)
        .await?;

    let category_map = insert_category_tree(pool, &base_id, &bundle.categories).await?;

    let dropped = bundle.categories.len() - category_map.len();
    if dropped > 0 {
        warn!(
            base_id = %base_id,
            dropped = dropped,
            "Dropped categories with unresolvable parents"
        );
    }

    // Tags are flat; order beyond the stored ord is irrelevant
    let mut tag_map: HashMap<BundleId, String> = HashMap::new();
    for tag in &bundle.tags {
        let guid = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO tags (guid, base_id, name, color, ord) VALUES (?, ?, ?, ?, ?)")
            .bind(&guid)
            .bind(&base_id)
            .bind(clip_text(&tag.name, MAX_NAME_LEN, "Tag"))
            .bind(&tag.color)
            .bind(tag.ord)
            .execute(pool)
            .await?;
        tag_map.insert(tag.id.clone(), guid);
    }

    // Questions keep input order; an unresolvable category becomes NULL
    let mut question_map: HashMap<BundleId, String> = HashMap::new();
    for question in &bundle.questions {
        let category_id = match &question.category_id {
            Some(old) => {
                let resolved = category_map.get(old).cloned();
                if resolved.is_none() {
                    debug!(question_id = %question.id, category_id = %old,
                        "Question category does not resolve, storing NULL");
                }
                resolved
            }
            None => None,
        };

        let payload = serde_json::to_string(&question.payload)
            .map_err(|e| Error::Internal(format!("Unserializable question payload: {}", e)))?;

        let guid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO base_questions (guid, base_id, category_id, ord, payload) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&guid)
        .bind(&base_id)
        .bind(&category_id)
        .bind(question.ord)
        .bind(&payload)
        .execute(pool)
        .await?;
        question_map.insert(question.id.clone(), guid);
    }

    // Association rows only where both ends resolve inside this import
    for join in &bundle.question_tags {
        match (question_map.get(&join.question_id), tag_map.get(&join.tag_id)) {
            (Some(question_id), Some(tag_id)) => {
                sqlx::query("INSERT INTO question_tags (question_id, tag_id) VALUES (?, ?)")
                    .bind(question_id)
                    .bind(tag_id)
                    .execute(pool)
                    .await?;
            }
            _ => {
                warn!(question_id = %join.question_id, tag_id = %join.tag_id,
                    "Dropping question_tag with unresolvable reference");
            }
        }
    }

    for join in &bundle.category_tags {
        match (category_map.get(&join.category_id), tag_map.get(&join.tag_id)) {
            (Some(category_id), Some(tag_id)) => {
                sqlx::query("INSERT INTO category_tags (category_id, tag_id) VALUES (?, ?)")
                    .bind(category_id)
                    .bind(tag_id)
                    .execute(pool)
                    .await?;
            }
            _ => {
                warn!(category_id = %join.category_id, tag_id = %join.tag_id,
                    "Dropping category_tag with unresolvable reference");
            }
        }
    }

    debug!(
        base_id = %base_id,
        categories = category_map.len(),
        tags = tag_map.len(),
        questions = question_map.len(),
        "Base import complete"
    );

    Ok(base_id)
}

/// Insert the category forest parent-before-child, returning the old→new
/// id map.
///
/// Categories are re-grouped by parent (root sentinel = `None`) and each
/// sibling group is sorted by `ord`; the input array is never assumed to be
/// topologically sorted. Traversal uses an explicit work stack instead of
/// recursion, so tree depth cannot overflow the call stack.
async fn insert_category_tree(
    pool: &SqlitePool,
    base_id: &str,
    categories: &[CategoryEntry],
) -> Result<HashMap<BundleId, String>> {
    let mut groups: HashMap<Option<BundleId>, Vec<&CategoryEntry>> = HashMap::new();
    for category in categories {
        groups
            .entry(category.parent_id.clone())
            .or_default()
            .push(category);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|c| c.ord);
    }

    let mut map: HashMap<BundleId, String> = HashMap::new();

    // (old id of the group's parent, new id to use as parent_id)
    let mut stack: Vec<(Option<BundleId>, Option<String>)> = vec![(None, None)];

    while let Some((old_parent, new_parent)) = stack.pop() {
        let Some(group) = groups.remove(&old_parent) else {
            continue;
        };

        for category in group {
            let guid = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO categories (guid, base_id, parent_id, name, ord) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&guid)
            .bind(base_id)
            .bind(&new_parent)
            .bind(clip_text(&category.name, MAX_NAME_LEN, "Category"))
            .bind(category.ord)
            .execute(pool)
            .await?;

            map.insert(category.id.clone(), guid.clone());
            stack.push((Some(category.id.clone()), Some(guid)));
        }
    }

    Ok(map)
}
