use std::future::Future;

use super::{make_new_repair, TestResult};
use crate::{RepairPatch, RepairStore};

pub(super) async fn run_absence_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "absence",
            "empty_store_lists_nothing",
            empty_store_lists_nothing(factory).await,
        ),
        TestResult::from_result(
            "absence",
            "get_missing_is_none",
            get_missing_is_none(factory).await,
        ),
        TestResult::from_result(
            "absence",
            "update_missing_is_none",
            update_missing_is_none(factory).await,
        ),
        TestResult::from_result(
            "absence",
            "delete_missing_is_false",
            delete_missing_is_false(factory).await,
        ),
        TestResult::from_result(
            "absence",
            "second_delete_is_false",
            second_delete_is_false(factory).await,
        ),
    ]
}

async fn empty_store_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let rows = s.list().await.map_err(|e| e.to_string())?;
    if !rows.is_empty() {
        return Err(format!("expected empty listing, got {} rows", rows.len()));
    }
    Ok(())
}

async fn get_missing_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get(42).await {
        Ok(None) => Ok(()),
        Ok(Some(r)) => Err(format!("expected None, got {:?}", r)),
        Err(e) => Err(format!("expected None, got error: {}", e)),
    }
}

async fn update_missing_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let patch = RepairPatch {
        status: Some("DONE".to_string()),
        ..RepairPatch::default()
    };
    match s.update(42, patch).await {
        Ok(None) => {}
        Ok(Some(r)) => return Err(format!("expected None, got {:?}", r)),
        Err(e) => return Err(format!("expected None, got error: {}", e)),
    }
    if !s.list().await.map_err(|e| e.to_string())?.is_empty() {
        return Err("update of missing repair created a row".to_string());
    }
    Ok(())
}

async fn delete_missing_is_false<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.delete(42).await {
        Ok(false) => Ok(()),
        Ok(true) => Err("delete of missing repair returned true".to_string()),
        Err(e) => Err(format!("expected false, got error: {}", e)),
    }
}

async fn second_delete_is_false<S, F, Fut>(factory: &F) -> Result<(), String>
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
    s.delete(created.id).await.map_err(|e| e.to_string())?;
    if s.delete(created.id).await.map_err(|e| e.to_string())? {
        return Err("second delete returned true".to_string());
    }
    Ok(())
}
