use crate::core::client::database::DatabaseError;
use crate::core::client::script::{
    MockScriptStore, ScriptDescriptor, ScriptRegistry, ScriptStoreError,
};
use crate::core::engine::FailurePolicy;
use crate::error::MongrateError;
use crate::tests::common::{
    call_log, log_entries, recording_script, script_failing_down, script_failing_up,
    test_migrator, InMemoryStateStore,
};
use crate::types::state::{ExecutionRecord, MigrationStatus};
use rstest::*;
use std::sync::Arc;

#[rstest]
#[tokio::test]
async fn compute_state_is_idempotent() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("create_users", &log))
        .with(recording_script("create_profiles", &log));
    let state = Arc::new(InMemoryStateStore::with_records(vec![ExecutionRecord::new(
        "create_users",
        100,
    )]));
    let migrator = test_migrator(Arc::new(registry), state);

    let first = migrator.state().await.unwrap();
    let second = migrator.state().await.unwrap();

    assert_eq!(first, second);
}

#[rstest]
#[tokio::test]
async fn compute_state_reports_the_union_without_duplicates() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("create_users", &log))
        .with(recording_script("create_profiles", &log));
    // The record for a script that no longer exists on disk is still
    // reported; persisted truth is authoritative.
    let state = Arc::new(InMemoryStateStore::with_records(vec![
        ExecutionRecord::new("create_users", 100),
        ExecutionRecord::new("vanished_script", 100),
    ]));
    let migrator = test_migrator(Arc::new(registry), state);

    let view = migrator.state().await.unwrap();

    let mut names: Vec<&str> = view.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["create_profiles", "create_users", "vanished_script"]);
}

#[rstest]
#[tokio::test]
async fn compute_state_orders_executed_first_most_recent_batch_on_top() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("alpha", &log))
        .with(recording_script("beta", &log))
        .with(recording_script("gamma", &log));
    let state = Arc::new(InMemoryStateStore::with_records(vec![
        ExecutionRecord::new("alpha", 100),
        ExecutionRecord::new("beta", 200),
    ]));
    let migrator = test_migrator(Arc::new(registry), state);

    let view = migrator.state().await.unwrap();

    assert_eq!(view.len(), 3);
    assert_eq!(view[0].name, "beta");
    assert_eq!(view[0].status, MigrationStatus::Executed);
    assert_eq!(view[0].executed_on, Some(200));
    assert_eq!(view[1].name, "alpha");
    assert_eq!(view[2].name, "gamma");
    assert_eq!(view[2].status, MigrationStatus::Pending);
    assert_eq!(view[2].executed_on, None);
}

#[rstest]
#[tokio::test]
async fn migrate_applies_pending_in_enumeration_order_as_one_batch() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("create_test_user", &log))
        .with(recording_script("create_test_profile", &log));
    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let applied = migrator.migrate().await.unwrap();

    assert_eq!(log_entries(&log), vec!["up:create_test_user", "up:create_test_profile"]);
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].name, "create_test_user");
    assert_eq!(applied[1].name, "create_test_profile");
    assert!(applied.iter().all(|r| r.status == MigrationStatus::Executed));
    assert_eq!(applied[0].executed_on, applied[1].executed_on);
    assert_eq!(state.records(), applied);
}

#[rstest]
#[tokio::test]
async fn migrate_skips_already_executed_scripts() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("create_users", &log))
        .with(recording_script("create_profiles", &log));
    let state = Arc::new(InMemoryStateStore::with_records(vec![ExecutionRecord::new(
        "create_users",
        100,
    )]));
    let migrator = test_migrator(Arc::new(registry), state);

    let applied = migrator.migrate().await.unwrap();

    assert_eq!(log_entries(&log), vec!["up:create_profiles"]);
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].name, "create_profiles");
}

#[rstest]
#[tokio::test]
async fn migrate_with_nothing_pending_returns_empty() {
    let log = call_log();
    let registry = ScriptRegistry::new().with(recording_script("create_users", &log));
    let records = vec![ExecutionRecord::new("create_users", 100)];
    let state = Arc::new(InMemoryStateStore::with_records(records.clone()));
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let applied = migrator.migrate().await.unwrap();

    assert!(applied.is_empty());
    assert!(log_entries(&log).is_empty());
    assert_eq!(state.records(), records);
}

#[rstest]
#[tokio::test]
async fn migrate_fails_fast_and_keeps_prior_successes() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("alpha", &log))
        .with(script_failing_up("beta", &log))
        .with(recording_script("gamma", &log));
    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let err = migrator.migrate().await.unwrap_err();

    // gamma never ran; alpha's success is already recorded.
    assert_eq!(log_entries(&log), vec!["up:alpha", "up:beta"]);
    match err {
        MongrateError::Execution(e) => {
            assert_eq!(e.failures.len(), 1);
            assert_eq!(e.failures[0].script, "beta");
        }
        other => panic!("unexpected error: {other}"),
    }

    let view = migrator.state().await.unwrap();
    let status_of = |name: &str| view.iter().find(|e| e.name == name).unwrap().status;
    assert_eq!(status_of("alpha"), MigrationStatus::Executed);
    assert_eq!(status_of("beta"), MigrationStatus::Pending);
    assert_eq!(status_of("gamma"), MigrationStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn migrate_continue_on_error_runs_the_remainder() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("alpha", &log))
        .with(script_failing_up("beta", &log))
        .with(recording_script("gamma", &log));
    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(registry), state.clone())
        .with_policy(FailurePolicy::ContinueOnError);

    let err = migrator.migrate().await.unwrap_err();

    assert_eq!(log_entries(&log), vec!["up:alpha", "up:beta", "up:gamma"]);
    match err {
        MongrateError::Execution(e) => {
            assert_eq!(e.failures.len(), 1);
            assert_eq!(e.failures[0].script, "beta");
        }
        other => panic!("unexpected error: {other}"),
    }

    let recorded: Vec<String> = state.records().into_iter().map(|r| r.name).collect();
    assert_eq!(recorded, vec!["alpha", "gamma"]);
    let records = state.records();
    assert_eq!(records[0].executed_on, records[1].executed_on);
}

#[rstest]
#[tokio::test]
async fn migrate_load_failure_still_persists_prior_successes() {
    let log = call_log();
    let loadable = recording_script("alpha", &log);

    let mut scripts = MockScriptStore::new();
    scripts.expect_list_scripts().returning(|| {
        Ok(vec![ScriptDescriptor::named("alpha"), ScriptDescriptor::named("broken")])
    });
    scripts.expect_load().returning(move |descriptor: &ScriptDescriptor| {
        if descriptor.name == "alpha" {
            Ok(loadable.clone())
        } else {
            Err(ScriptStoreError::NotRegistered(descriptor.name.clone()))
        }
    });

    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(scripts), state.clone());

    let err = migrator.migrate().await.unwrap_err();

    assert!(matches!(err, MongrateError::ScriptStore(ScriptStoreError::NotRegistered(_))));
    assert_eq!(log_entries(&log), vec!["up:alpha"]);
    let recorded: Vec<String> = state.records().into_iter().map(|r| r.name).collect();
    assert_eq!(recorded, vec!["alpha"]);
}

#[rstest]
#[tokio::test]
async fn rollback_reverts_only_the_latest_batch_in_enumeration_order() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("alpha", &log))
        .with(recording_script("beta", &log))
        .with(recording_script("gamma", &log));
    // Batch 200 was persisted as [gamma, beta]; enumeration order puts beta
    // first on the way down.
    let state = Arc::new(InMemoryStateStore::with_records(vec![
        ExecutionRecord::new("alpha", 100),
        ExecutionRecord::new("gamma", 200),
        ExecutionRecord::new("beta", 200),
    ]));
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let reverted = migrator.rollback(false).await.unwrap();

    assert_eq!(reverted, vec!["beta", "gamma"]);
    assert_eq!(log_entries(&log), vec!["down:beta", "down:gamma"]);
    let remaining: Vec<String> = state.records().into_iter().map(|r| r.name).collect();
    assert_eq!(remaining, vec!["alpha"]);
}

#[rstest]
#[tokio::test]
async fn rollback_all_reverts_every_batch() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("alpha", &log))
        .with(recording_script("beta", &log));
    let state = Arc::new(InMemoryStateStore::with_records(vec![
        ExecutionRecord::new("alpha", 100),
        ExecutionRecord::new("beta", 200),
    ]));
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let reverted = migrator.rollback(true).await.unwrap();

    assert_eq!(reverted, vec!["alpha", "beta"]);
    assert!(state.records().is_empty());
}

#[rstest]
#[case(false)]
#[case(true)]
#[tokio::test]
async fn rollback_with_no_executed_entries_returns_empty(#[case] all: bool) {
    let log = call_log();
    let registry = ScriptRegistry::new().with(recording_script("alpha", &log));
    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let reverted = migrator.rollback(all).await.unwrap();

    assert!(reverted.is_empty());
    assert!(log_entries(&log).is_empty());
}

#[rstest]
#[tokio::test]
async fn rollback_refuses_when_a_script_is_missing() {
    let log = call_log();
    let registry = ScriptRegistry::new().with(recording_script("alpha", &log));
    let records =
        vec![ExecutionRecord::new("alpha", 100), ExecutionRecord::new("vanished_script", 100)];
    let state = Arc::new(InMemoryStateStore::with_records(records.clone()));
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let err = migrator.rollback(false).await.unwrap_err();

    assert!(matches!(err, MongrateError::ScriptStore(ScriptStoreError::MissingScript(_))));
    // Nothing ran and nothing was deleted.
    assert!(log_entries(&log).is_empty());
    assert_eq!(state.records(), records);
}

#[rstest]
#[tokio::test]
async fn rollback_failure_leaves_earlier_deletions_final() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("alpha", &log))
        .with(script_failing_down("beta", &log))
        .with(recording_script("gamma", &log));
    let state = Arc::new(InMemoryStateStore::with_records(vec![
        ExecutionRecord::new("alpha", 100),
        ExecutionRecord::new("beta", 100),
        ExecutionRecord::new("gamma", 100),
    ]));
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let err = migrator.rollback(false).await.unwrap_err();

    match err {
        MongrateError::Execution(e) => {
            assert_eq!(e.failures.len(), 1);
            assert_eq!(e.failures[0].script, "beta");
        }
        other => panic!("unexpected error: {other}"),
    }
    // alpha's rollback is final; beta's record survives its failed down;
    // gamma never ran.
    assert_eq!(log_entries(&log), vec!["down:alpha", "down:beta"]);
    let remaining: Vec<String> = state.records().into_iter().map(|r| r.name).collect();
    assert_eq!(remaining, vec!["beta", "gamma"]);
}

#[rstest]
#[tokio::test]
async fn migrate_then_rollback_roundtrip() {
    let log = call_log();
    let registry = ScriptRegistry::new()
        .with(recording_script("create_test_user", &log))
        .with(recording_script("create_test_profile", &log));
    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(registry), state.clone());

    let applied = migrator.migrate().await.unwrap();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].executed_on, applied[1].executed_on);

    let reverted = migrator.rollback(false).await.unwrap();
    assert_eq!(reverted, vec!["create_test_user", "create_test_profile"]);

    let view = migrator.state().await.unwrap();
    assert_eq!(view.len(), 2);
    assert!(view.iter().all(|e| e.status == MigrationStatus::Pending));
}

#[rstest]
#[tokio::test]
async fn operations_after_dispose_fail_without_reconnecting() {
    let log = call_log();
    let registry = ScriptRegistry::new().with(recording_script("alpha", &log));
    let state = Arc::new(InMemoryStateStore::new());
    let migrator = test_migrator(Arc::new(registry), state);

    migrator.dispose().await.unwrap();

    let err = migrator.migrate().await.unwrap_err();
    assert!(matches!(err, MongrateError::Database(DatabaseError::Disposed)));
    assert!(log_entries(&log).is_empty());
}
