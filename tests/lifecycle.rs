//! End-to-end lifecycle tests driving the provider façade the way the
//! orchestrator does: Check, Diff, Create, Read, Update, Delete per URN.

use std::sync::Arc;

use serde_json::json;

use faunadb_provider::{
    DiffKind, FaunaProvider, MemoryBackend, ProviderError, ResourceType, UNKNOWN_VALUE,
};

const DB_URN: &str = "urn:pulumi:dev::shop::faunadb:database:Database::orders";
const COLLECTION_URN: &str = "urn:pulumi:dev::shop::faunadb:database:Collection::users";
const RECORD_URN: &str = "urn:pulumi:dev::shop::faunadb:database:Record::admin";

fn provider() -> (FaunaProvider, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let provider = FaunaProvider::new("faunadb", "0.1.0", backend.clone());
    provider
        .configure(&json!({"secret": "fn_test_secret"}))
        .expect("configure");
    (provider, backend)
}

#[tokio::test]
async fn database_full_lifecycle() {
    let (provider, backend) = provider();
    let news = json!({"name": "prod", "region": "us-east", "ttl_days": 7});

    // Check: valid inputs come back verbatim with zero failures.
    let checked = provider.check(DB_URN, &json!({}), &news).unwrap();
    assert!(checked.failures.is_empty());
    assert_eq!(checked.inputs, news);

    // Create: deterministic ID derived from the identifying properties.
    let created = provider.create(DB_URN, &news).await.unwrap();
    assert_eq!(created.id, "prod-us-east");
    assert_eq!(backend.count(ResourceType::Database), 1);

    // Read reflects stored state.
    let state = provider.read(DB_URN, &created.id, &json!({})).await.unwrap();
    assert_eq!(state["name"], "prod");
    assert_eq!(state["ttl_days"], 7.0);

    // In-place update.
    let updated_news = json!({"name": "prod", "region": "us-east", "ttl_days": 30});
    let diff = provider.diff(DB_URN, &news, &updated_news).unwrap();
    assert_eq!(diff.kind, DiffKind::Some);
    assert!(diff.replaces.is_empty());

    let state = provider
        .update(DB_URN, &created.id, &news, &updated_news)
        .await
        .unwrap();
    assert_eq!(state["ttl_days"], 30.0);

    // Delete, then Read surfaces not-found.
    provider.delete(DB_URN, &created.id, &state).await.unwrap();
    let err = provider
        .read(DB_URN, &created.id, &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)));
}

#[tokio::test]
async fn renaming_a_database_is_a_replacement() {
    let (provider, _) = provider();
    let olds = json!({"name": "prod", "region": "us-east"});
    let news = json!({"name": "staging", "region": "us-east"});

    let diff = provider.diff(DB_URN, &olds, &news).unwrap();
    assert_eq!(diff.kind, DiffKind::Replace);
    assert_eq!(diff.replaces, vec!["name"]);

    // Update for a replace-classified change fails loudly.
    let err = provider
        .update(DB_URN, "prod-us-east", &olds, &news)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn retried_create_converges_on_one_resource() {
    let (provider, backend) = provider();
    let news = json!({"name": "prod", "region": "us-east"});

    let first = provider.create(DB_URN, &news).await.unwrap();
    let second = provider.create(DB_URN, &news).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(backend.count(ResourceType::Database), 1);
}

#[tokio::test]
async fn delete_of_absent_resource_succeeds() {
    let (provider, _) = provider();
    provider
        .delete(DB_URN, "never-created", &json!({}))
        .await
        .unwrap();
}

#[tokio::test]
async fn check_reports_all_failures_as_data() {
    let (provider, _) = provider();
    let news = json!({"name": 42});

    let checked = provider.check(DB_URN, &json!({}), &news).unwrap();
    assert_eq!(checked.failures.len(), 2);
    assert_eq!(checked.failures[0].property, "name");
    assert!(checked.failures[0].reason.contains("'string'"));
    assert_eq!(checked.failures[1].property, "region");
}

#[tokio::test]
async fn unknown_markers_survive_check_and_force_diff() {
    let (provider, _) = provider();
    let olds = json!({"name": "prod", "region": "us-east"});
    let news = json!({"name": "prod", "region": UNKNOWN_VALUE});

    let checked = provider.check(DB_URN, &olds, &news).unwrap();
    assert!(checked.failures.is_empty());
    assert_eq!(checked.inputs["region"], UNKNOWN_VALUE);

    // An unknown identifying property cannot be proven unchanged.
    let diff = provider.diff(DB_URN, &olds, &news).unwrap();
    assert_eq!(diff.kind, DiffKind::Replace);
    assert_eq!(diff.replaces, vec!["region"]);
}

#[tokio::test]
async fn collection_and_record_lifecycles() {
    let (provider, backend) = provider();

    let collection = json!({"database": "prod", "name": "users", "history_days": 30});
    let created = provider.create(COLLECTION_URN, &collection).await.unwrap();
    assert_eq!(created.id, "prod/users");

    let record = json!({
        "collection": "users",
        "key": "admin",
        "data": {"email": "admin@example.com", "roles": ["owner"]}
    });
    let created = provider.create(RECORD_URN, &record).await.unwrap();
    assert_eq!(created.id, "users/admin");
    assert_eq!(backend.count(ResourceType::Collection), 1);
    assert_eq!(backend.count(ResourceType::Record), 1);

    // Document body changes apply in place.
    let updated = json!({
        "collection": "users",
        "key": "admin",
        "data": {"email": "root@example.com", "roles": ["owner"]}
    });
    let diff = provider.diff(RECORD_URN, &record, &updated).unwrap();
    assert_eq!(diff.kind, DiffKind::Some);
    assert_eq!(diff.changed, vec!["data"]);

    let state = provider
        .update(RECORD_URN, "users/admin", &record, &updated)
        .await
        .unwrap();
    assert_eq!(state["data"]["email"], "root@example.com");

    // Re-keying the record is a replacement.
    let rekeyed = json!({"collection": "users", "key": "root", "data": {}});
    let diff = provider.diff(RECORD_URN, &record, &rekeyed).unwrap();
    assert_eq!(diff.kind, DiffKind::Replace);
    assert_eq!(diff.replaces, vec!["key"]);
}

#[tokio::test]
async fn backend_outage_surfaces_as_unavailable() {
    let (provider, backend) = provider();
    let news = json!({"name": "prod", "region": "us-east"});

    backend.set_available(false);
    let err = provider.create(DB_URN, &news).await.unwrap_err();
    assert!(matches!(err, ProviderError::BackendUnavailable(_)));

    // The orchestrator owns retries; once the backend recovers, the same
    // call converges without provider-side state.
    backend.set_available(true);
    let created = provider.create(DB_URN, &news).await.unwrap();
    assert_eq!(created.id, "prod-us-east");
}

#[tokio::test]
async fn concurrent_calls_across_urns_do_not_interfere() {
    let (provider, backend) = provider();
    let provider = Arc::new(provider);

    let mut handles = Vec::new();
    for region in ["us-east", "eu-west", "ap-south"] {
        let provider = Arc::clone(&provider);
        let urn = format!("urn:pulumi:dev::shop::faunadb:database:Database::db-{region}");
        let news = json!({"name": "prod", "region": region});
        handles.push(tokio::spawn(async move {
            provider.create(&urn, &news).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(backend.count(ResourceType::Database), 3);
}

#[tokio::test]
async fn unknown_resource_type_fails_before_any_work() {
    let (provider, backend) = provider();
    let urn = "urn:pulumi:dev::shop::faunadb:database:Index::by-email";

    let err = provider
        .create(urn, &json!({"name": "by-email"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnknownResourceType(_)));
    assert!(err.to_string().contains("faunadb:database:Index"));
    assert_eq!(backend.count(ResourceType::Database), 0);
}
