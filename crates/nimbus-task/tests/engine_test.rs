//! End-to-end engine scenarios against the in-memory stores and the mock
//! vendor client.

use std::sync::Arc;
use std::time::Duration;

use nimbus_cloud::mock::MockVendorClient;
use nimbus_cloud::{
    MemoryResourceStore, ProvisionConfig, SubnetCreateSpec, TargetWeightRequest, VendorClients,
    VpcCreateSpec,
};
use nimbus_core::{Error, Kit, ResourceKind, Vendor};
use nimbus_task::{
    builtin_registry, DetailState, DetailStore, EngineConfig, MemoryDetailStore, TaskDetail,
    TaskEngine,
};

struct Harness {
    engine: TaskEngine,
    client: Arc<MockVendorClient>,
    details: Arc<MemoryDetailStore>,
    resources: Arc<MemoryResourceStore>,
    kit: Kit,
}

fn harness() -> Harness {
    let client = Arc::new(MockVendorClient::new(Vendor::TCloud));
    let clients = Arc::new(VendorClients::new(vec![client.clone()]));
    let details = Arc::new(MemoryDetailStore::new());
    let resources = Arc::new(MemoryResourceStore::new());
    let config = EngineConfig {
        max_batch_size: 20,
        provision: ProvisionConfig {
            readback_delay: Duration::ZERO,
        },
    };
    let engine = TaskEngine::new(
        Arc::new(builtin_registry().unwrap()),
        clients,
        details.clone(),
        resources.clone(),
        config,
    );
    Harness {
        engine,
        client,
        details,
        resources,
        kit: Kit::new(),
    }
}

async fn seed_details(h: &Harness, ids: &[&str]) {
    let details = ids
        .iter()
        .map(|id| TaskDetail::new(*id, "task-1", Vendor::TCloud))
        .collect();
    h.details.create(&h.kit, details).await.unwrap();
}

fn weight_params(detail_ids: &[&str]) -> serde_json::Value {
    let requests: Vec<TargetWeightRequest> = (0..detail_ids.len())
        .map(|i| TargetWeightRequest {
            listener_cloud_id: format!("lbl-{i}"),
            target_cloud_ids: vec![format!("cvm-{i}")],
            weight: 10,
        })
        .collect();
    serde_json::json!({
        "vendor": "tcloud",
        "lb_cloud_id": "lb-1",
        "detail_ids": detail_ids,
        "requests": requests,
    })
}

async fn state_of(h: &Harness, id: &str) -> DetailState {
    h.details.get(&h.kit, &[id.to_string()]).await.unwrap()[0].state
}

#[tokio::test]
async fn cancelled_detail_is_a_no_op_success() {
    let h = harness();
    seed_details(&h, &["d1"]).await;
    h.details
        .update_state(&h.kit, &["d1".to_string()], DetailState::Cancel, None, None)
        .await
        .unwrap();

    let result = h
        .engine
        .execute(&h.kit, "batch-modify-target-weight", weight_params(&["d1"]))
        .await
        .unwrap();

    // Success without any vendor call, detail untouched.
    assert_eq!(result, serde_json::json!([null]));
    assert!(h.client.weight_calls().is_empty());
    assert_eq!(state_of(&h, "d1").await, DetailState::Cancel);
}

#[tokio::test]
async fn non_init_detail_is_rejected_without_vendor_call() {
    let h = harness();
    seed_details(&h, &["d1"]).await;
    let ids = vec!["d1".to_string()];
    h.details
        .update_state(&h.kit, &ids, DetailState::Running, None, None)
        .await
        .unwrap();
    h.details
        .update_state(&h.kit, &ids, DetailState::Success, None, None)
        .await
        .unwrap();

    let err = h
        .engine
        .execute(&h.kit, "batch-modify-target-weight", weight_params(&["d1"]))
        .await
        .unwrap_err();

    assert!(err.is_invalid_parameter());
    assert!(h.client.weight_calls().is_empty());
    assert_eq!(state_of(&h, "d1").await, DetailState::Success);
}

#[tokio::test]
async fn batch_stops_at_first_failure_with_committed_partials() {
    let h = harness();
    seed_details(&h, &["d1", "d2", "d3"]).await;
    // Second item's listener fails at the vendor.
    h.client.fail_weight("lbl-1");

    let err = h
        .engine
        .execute(
            &h.kit,
            "batch-modify-target-weight",
            weight_params(&["d1", "d2", "d3"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::VendorCallFailed { .. }));
    assert_eq!(state_of(&h, "d1").await, DetailState::Success);
    assert_eq!(state_of(&h, "d2").await, DetailState::Failed);
    // Item 3 was never started.
    assert_eq!(state_of(&h, "d3").await, DetailState::Init);
    assert_eq!(h.client.weight_calls(), vec!["lbl-0", "lbl-1"]);

    let failed = h
        .details
        .get(&h.kit, &["d2".to_string()])
        .await
        .unwrap()
        .remove(0);
    assert!(failed.error.unwrap().contains("lbl-1"));
}

#[tokio::test]
async fn rerun_of_a_succeeded_detail_is_guarded() {
    let h = harness();
    seed_details(&h, &["d1"]).await;
    let params = weight_params(&["d1"]);

    h.engine
        .execute(&h.kit, "batch-modify-target-weight", params.clone())
        .await
        .unwrap();
    assert_eq!(state_of(&h, "d1").await, DetailState::Success);

    // Idempotent vendor call or not, the guard rejects re-submission of a
    // terminal detail instead of silently re-executing it.
    let err = h
        .engine
        .execute(&h.kit, "batch-modify-target-weight", params)
        .await
        .unwrap_err();
    assert!(err.is_invalid_parameter());
    assert_eq!(h.client.weight_calls().len(), 1);
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_any_work() {
    let h = harness();
    let ids: Vec<String> = (0..21).map(|i| format!("d{i}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    seed_details(&h, &id_refs).await;

    let err = h
        .engine
        .execute(&h.kit, "batch-modify-target-weight", weight_params(&id_refs))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TooManyRequest(_)));
    assert!(h.client.weight_calls().is_empty());
    for id in &ids {
        assert_eq!(state_of(&h, id).await, DetailState::Init);
    }
}

#[tokio::test]
async fn mismatched_detail_and_request_lengths_are_rejected() {
    let h = harness();
    seed_details(&h, &["d1", "d2"]).await;
    let mut params = weight_params(&["d1", "d2"]);
    params["requests"].as_array_mut().unwrap().pop();

    let err = h
        .engine
        .execute(&h.kit, "batch-modify-target-weight", params)
        .await
        .unwrap_err();
    assert!(err.is_invalid_parameter());
    assert!(h.client.weight_calls().is_empty());
}

#[tokio::test]
async fn expired_deadline_aborts_before_the_item_starts() {
    let h = harness();
    seed_details(&h, &["d1"]).await;
    let kit = Kit::new().with_timeout(Duration::ZERO);

    let err = h
        .engine
        .execute(&kit, "batch-modify-target-weight", weight_params(&["d1"]))
        .await
        .unwrap_err();

    assert!(err.is_aborted());
    assert!(h.client.weight_calls().is_empty());
    // The detail was never touched and stays resumable.
    assert_eq!(state_of(&h, "d1").await, DetailState::Init);
}

#[tokio::test]
async fn unknown_action_name_is_rejected() {
    let h = harness();
    let err = h
        .engine
        .execute(&h.kit, "no-such-action", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(err.is_invalid_parameter());
}

fn vpc_params(detail_id: &str) -> serde_json::Value {
    let spec = VpcCreateSpec {
        account_id: "acc".into(),
        name: "main".into(),
        region: "ap-1".into(),
        cidr: Some("10.0.0.0/16".into()),
        subnets: vec![SubnetCreateSpec {
            name: "a".into(),
            region: "ap-1".into(),
            cidr: "10.0.1.0/24".into(),
        }],
    };
    serde_json::json!({
        "vendor": "tcloud",
        "detail_id": detail_id,
        "spec": spec,
    })
}

#[tokio::test]
async fn create_vpc_records_resources_and_outcome() {
    let h = harness();
    seed_details(&h, &["d1"]).await;

    h.engine
        .execute(&h.kit, "create-vpc", vpc_params("d1"))
        .await
        .unwrap();

    assert_eq!(state_of(&h, "d1").await, DetailState::Success);
    // vpc + subnet projected locally
    assert_eq!(h.resources.len().await, 2);
}

#[tokio::test]
async fn create_vpc_failure_is_committed_to_the_detail() {
    let h = harness();
    seed_details(&h, &["d1"]).await;
    h.client.set_readback_count(2);

    let err = h
        .engine
        .execute(&h.kit, "create-vpc", vpc_params("d1"))
        .await
        .unwrap_err();

    assert!(err.is_aborted());
    assert_eq!(state_of(&h, "d1").await, DetailState::Failed);
    assert!(h.resources.is_empty().await);
}

#[tokio::test]
async fn create_vpc_rollback_deletes_what_the_run_recorded() {
    let h = harness();
    seed_details(&h, &["d1"]).await;
    let params = vpc_params("d1");

    h.engine
        .execute(&h.kit, "create-vpc", params.clone())
        .await
        .unwrap();
    h.engine.rollback(&h.kit, "create-vpc", params).await.unwrap();

    let deleted = h.client.deleted();
    assert_eq!(deleted.len(), 2);
    // Subnet goes before its VPC.
    assert_eq!(deleted[0].0, ResourceKind::Subnet);
    assert_eq!(deleted[1].0, ResourceKind::Vpc);
}

#[tokio::test]
async fn create_vpc_rollback_without_success_is_a_no_op() {
    let h = harness();
    seed_details(&h, &["d1"]).await;

    h.engine
        .rollback(&h.kit, "create-vpc", vpc_params("d1"))
        .await
        .unwrap();
    assert!(h.client.deleted().is_empty());
}
