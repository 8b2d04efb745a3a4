use std::future::Future;

use super::{make_new_repair, TestResult};
use crate::{RepairPatch, RepairStore};

pub(super) async fn run_lifecycle_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "lifecycle",
            "create_assigns_sequential_ids",
            create_assigns_sequential_ids(factory).await,
        ),
        TestResult::from_result(
            "lifecycle",
            "created_repair_readable_via_get",
            created_repair_readable_via_get(factory).await,
        ),
        TestResult::from_result(
            "lifecycle",
            "list_is_ordered_by_id",
            list_is_ordered_by_id(factory).await,
        ),
        TestResult::from_result(
            "lifecycle",
            "update_touches_only_supplied_fields",
            update_touches_only_supplied_fields(factory).await,
        ),
        TestResult::from_result(
            "lifecycle",
            "delete_removes_from_listing",
            delete_removes_from_listing(factory).await,
        ),
        TestResult::from_result(
            "lifecycle",
            "ids_not_reused_after_delete",
            ids_not_reused_after_delete(factory).await,
        ),
    ]
}

async fn create_assigns_sequential_ids<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let a = s
        .create(make_new_repair("Ann"))
        .await
        .map_err(|e| e.to_string())?;
    let b = s
        .create(make_new_repair("Bob"))
        .await
        .map_err(|e| e.to_string())?;
    if a.id != 1 || b.id != 2 {
        return Err(format!("expected ids 1 and 2, got {} and {}", a.id, b.id));
    }
    Ok(())
}

async fn created_repair_readable_via_get<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let created = s
        .create(make_new_repair("Ann"))
        .await
        .map_err(|e| e.to_string())?;
    let fetched = s
        .get(created.id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("repair {} missing after create", created.id))?;
    if fetched != created {
        return Err(format!("get returned {:?}, expected {:?}", fetched, created));
    }
    Ok(())
}

/// Rows come back in ascending id order regardless of creation pattern.
async fn list_is_ordered_by_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for name in ["Ann", "Bob", "Cy", "Dee"] {
        s.create(make_new_repair(name))
            .await
            .map_err(|e| e.to_string())?;
    }
    s.delete(2).await.map_err(|e| e.to_string())?;
    let ids: Vec<u64> = s
        .list()
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(|r| r.id)
        .collect();
    if ids != vec![1, 3, 4] {
        return Err(format!("expected ids [1, 3, 4], got {:?}", ids));
    }
    Ok(())
}

async fn update_touches_only_supplied_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let created = s
        .create(make_new_repair("Ann"))
        .await
        .map_err(|e| e.to_string())?;
    let patch = RepairPatch {
        status: Some("IN_PROGRESS".to_string()),
        ..RepairPatch::default()
    };
    let updated = s
        .update(created.id, patch)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("update returned None for an existing repair")?;
    if updated.status != "IN_PROGRESS" {
        return Err(format!("status not applied: {}", updated.status));
    }
    if updated.customer_name != created.customer_name
        || updated.phone_model != created.phone_model
        || updated.issue != created.issue
        || updated.created_at != created.created_at
    {
        return Err(format!("untouched fields changed: {:?}", updated));
    }
    Ok(())
}

async fn delete_removes_from_listing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let created = s
        .create(make_new_repair("Ann"))
        .await
        .map_err(|e| e.to_string())?;
    if !s.delete(created.id).await.map_err(|e| e.to_string())? {
        return Err("delete of existing repair returned false".to_string());
    }
    if s.get(created.id)
        .await
        .map_err(|e| e.to_string())?
        .is_some()
    {
        return Err("repair still readable after delete".to_string());
    }
    if !s.list().await.map_err(|e| e.to_string())?.is_empty() {
        return Err("listing not empty after delete".to_string());
    }
    Ok(())
}

async fn ids_not_reused_after_delete<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.create(make_new_repair("Ann"))
        .await
        .map_err(|e| e.to_string())?;
    let b = s
        .create(make_new_repair("Bob"))
        .await
        .map_err(|e| e.to_string())?;
    s.delete(b.id).await.map_err(|e| e.to_string())?;
    let c = s
        .create(make_new_repair("Cy"))
        .await
        .map_err(|e| e.to_string())?;
    if c.id <= b.id {
        return Err(format!("id {} reused or decreased (last was {})", c.id, b.id));
    }
    Ok(())
}
