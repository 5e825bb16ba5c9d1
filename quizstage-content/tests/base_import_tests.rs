//! Base importer integration tests
//!
//! Exercise the reference remapper against an in-memory database: tree
//! topology, sibling ordering, dangling-reference policy and the two
//! association lists.

use quizstage_common::db::create_tables;
use quizstage_content::bundle::BaseBundle;
use quizstage_content::import_base;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn mem_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    create_tables(&pool).await.unwrap();
    pool
}

fn forest_bundle() -> BaseBundle {
    // Categories deliberately out of topological order: children first
    BaseBundle::from_json(
        r##"{
            "base": {"name": "History"},
            "categories": [
                {"id": "grandchild", "parent_id": "child-b", "name": "Grandchild", "ord": 1},
                {"id": "child-b", "parent_id": "root", "name": "Child B", "ord": 2},
                {"id": "child-a", "parent_id": "root", "name": "Child A", "ord": 1},
                {"id": "root", "parent_id": null, "name": "Root", "ord": 1},
                {"id": "root-2", "parent_id": null, "name": "Second root", "ord": 2}
            ],
            "tags": [
                {"id": 1, "name": "easy", "color": "#00ff00", "ord": 1},
                {"id": 2, "name": "hard", "color": "#ff0000", "ord": 2}
            ],
            "questions": [
                {"id": "q1", "category_id": "child-a", "ord": 1, "payload": {"text": "Who?"}},
                {"id": "q2", "category_id": "missing-cat", "ord": 2, "payload": {"text": "When?"}},
                {"id": "q3", "ord": 3, "payload": {"text": "Where?"}}
            ],
            "question_tags": [
                {"question_id": "q1", "tag_id": 1},
                {"question_id": "q1", "tag_id": 99},
                {"question_id": "nope", "tag_id": 2}
            ],
            "category_tags": [
                {"category_id": "root", "tag_id": 2},
                {"category_id": "missing-cat", "tag_id": 1}
            ]
        }"##,
    )
    .unwrap()
}

/// Every non-root category's parent row is created before the category
/// itself (no forward reference), regardless of bundle order.
#[tokio::test]
async fn parents_are_created_before_children() {
    let pool = mem_pool().await;
    let base_id = import_base(&pool, &forest_bundle()).await.unwrap();

    let rows: Vec<(i64, String, Option<String>)> =
        sqlx::query_as("SELECT rowid, guid, parent_id FROM categories WHERE base_id = ?")
            .bind(&base_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 5);

    for (rowid, guid, parent_id) in &rows {
        if let Some(parent) = parent_id {
            let parent_rowid = rows
                .iter()
                .find(|(_, g, _)| g == parent)
                .map(|(r, _, _)| *r)
                .unwrap_or_else(|| panic!("parent of {} missing", guid));
            assert!(
                parent_rowid < *rowid,
                "parent inserted after child ({} >= {})",
                parent_rowid,
                rowid
            );
        }
    }
}

/// Sibling relative order by ord survives the remap.
#[tokio::test]
async fn sibling_order_is_preserved() {
    let pool = mem_pool().await;
    let base_id = import_base(&pool, &forest_bundle()).await.unwrap();

    let roots: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM categories WHERE base_id = ? AND parent_id IS NULL ORDER BY ord ASC",
    )
    .bind(&base_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    let names: Vec<&str> = roots.iter().map(|(n,)| n.as_str()).collect();
    assert_eq!(names, vec!["Root", "Second root"]);

    let children: Vec<(String,)> = sqlx::query_as(
        "SELECT c.name FROM categories c \
         JOIN categories p ON c.parent_id = p.guid \
         WHERE p.name = 'Root' ORDER BY c.ord ASC",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    let names: Vec<&str> = children.iter().map(|(n,)| n.as_str()).collect();
    assert_eq!(names, vec!["Child A", "Child B"]);
}

/// A category pointing at a parent absent from the bundle is never
/// visited; its whole subtree is dropped without failing the import.
#[tokio::test]
async fn dangling_subtree_is_dropped() {
    let pool = mem_pool().await;
    let bundle = BaseBundle::from_json(
        r#"{
            "base": {"name": "Partial"},
            "categories": [
                {"id": "ok", "parent_id": null, "name": "Kept", "ord": 1},
                {"id": "lost", "parent_id": "ghost", "name": "Dropped", "ord": 1},
                {"id": "lost-child", "parent_id": "lost", "name": "Dropped too", "ord": 1}
            ],
            "tags": [], "questions": [], "question_tags": [], "category_tags": []
        }"#,
    )
    .unwrap();
    let base_id = import_base(&pool, &bundle).await.unwrap();

    let names: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM categories WHERE base_id = ?")
            .bind(&base_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(names, vec![("Kept".to_string(),)]);
}

/// Question category references resolve through the old→new map; a miss
/// stores NULL and the opaque payload is preserved byte-for-byte as JSON.
#[tokio::test]
async fn questions_resolve_categories_and_keep_payloads() {
    let pool = mem_pool().await;
    let base_id = import_base(&pool, &forest_bundle()).await.unwrap();

    let rows: Vec<(Option<String>, i64, String)> = sqlx::query_as(
        "SELECT category_id, ord, payload FROM base_questions WHERE base_id = ? ORDER BY ord ASC",
    )
    .bind(&base_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 3);

    // q1 resolves to the imported Child A
    assert!(rows[0].0.is_some());
    // q2 pointed at a category missing from the bundle
    assert!(rows[1].0.is_none());
    // q3 had no category at all
    assert!(rows[2].0.is_none());

    let payload: serde_json::Value = serde_json::from_str(&rows[1].2).unwrap();
    assert_eq!(payload["text"], "When?");
}

/// Join rows survive only when both ends resolve inside the import.
#[tokio::test]
async fn unresolvable_join_rows_are_dropped() {
    let pool = mem_pool().await;
    import_base(&pool, &forest_bundle()).await.unwrap();

    let question_tags: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM question_tags")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(question_tags, 1);

    let category_tags: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category_tags")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(category_tags, 1);
}

/// Two imports of the same bundle create disjoint identifier spaces.
#[tokio::test]
async fn reimport_creates_a_fresh_base() {
    let pool = mem_pool().await;
    let first = import_base(&pool, &forest_bundle()).await.unwrap();
    let second = import_base(&pool, &forest_bundle()).await.unwrap();
    assert_ne!(first, second);

    let bases: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bases")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(bases, 2);

    let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(categories, 10);
}

/// The base name is sanitized on the way in.
#[tokio::test]
async fn base_name_is_clipped() {
    let pool = mem_pool().await;
    let long_name = "n".repeat(120);
    let bundle = BaseBundle::from_json(&format!(
        r#"{{"base": {{"name": "{}"}}, "categories": [], "tags": [],
            "questions": [], "question_tags": [], "category_tags": []}}"#,
        long_name
    ))
    .unwrap();
    let base_id = import_base(&pool, &bundle).await.unwrap();

    let name: String = sqlx::query_scalar("SELECT name FROM bases WHERE guid = ?")
        .bind(&base_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name.len(), 80);
}
