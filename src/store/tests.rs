use std::{rc::Rc, time::Duration};

use im::vector;
use leptos_reactive::{create_runtime, SignalGetUntracked};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Map};

use crate::{
    prelude::*,
    test_support::{spawn_backend, TEST_PASSWORD, TEST_TOKEN},
};

fn process(id: &str, status: &str) -> ProcessDocument {
    ProcessDocument {
        status: Some(status.to_string()),
        ..ProcessDocument::new(format!("Process {id}")).set_id(id)
    }
}

fn policy(id: &str, name: &str) -> Policy {
    Policy {
        id: Some(id.to_string()),
        ..Policy::new(name)
    }
}

fn error_messages(notifications: &Notifications) -> Vec<String> {
    notifications
        .pending()
        .into_iter()
        .filter(|notification| notification.level == NotificationLevel::Error)
        .map(|notification| notification.message)
        .collect()
}

#[test]
fn should_replace_and_remove_processes_by_id() {
    let state = ProcessState::default()
        .reduce(ProcessAction::SetProcesses(vector![process("1", "draft"), process("2", "active")]))
        .reduce(ProcessAction::UpdateProcess(ProcessDocument {
            name: "Renamed".to_string(),
            ..process("1", "active")
        }))
        .reduce(ProcessAction::UpdateProcess(process("9", "active")));
    assert_eq!(state.processes.len(), 2);
    assert_eq!(state.processes[0].name, "Renamed");
    assert_eq!(state.summary(), ProcessSummary { total: 2, active: 2 });

    let state = state.reduce(ProcessAction::DeleteProcess("1".to_string()));
    assert_eq!(state.processes.len(), 1);
    assert_eq!(state.processes[0].id.as_deref(), Some("2"));
}

#[test]
fn should_refresh_and_clear_current_policy() {
    let state = PolicyState::default()
        .reduce(PolicyAction::SetPolicies(vector![policy("p1", "Retention"), policy("p2", "Access")]))
        .reduce(PolicyAction::SetCurrentPolicy(Some(policy("p1", "Retention"))))
        .reduce(PolicyAction::UpdatePolicy(policy("p1", "Retention v2")));
    assert_eq!(state.current_policy.as_ref().map(|p| p.name.as_str()), Some("Retention v2"));
    assert_eq!(state.policies[0].name, "Retention v2");

    let state = state.reduce(PolicyAction::DeletePolicy("p2".to_string()));
    assert!(state.current_policy.is_some());
    let state = state.reduce(PolicyAction::DeletePolicy("p1".to_string()));
    assert!(state.current_policy.is_none());
    assert!(state.policies.is_empty());
}

#[test]
fn should_count_policies_and_rules_by_status() {
    let rule = |id: &str, status: &str| Rule {
        id: Some(id.to_string()),
        status: Some(status.to_string()),
        ..Rule::new(id)
    };
    let state = PolicyState::default()
        .reduce(PolicyAction::SetPolicies(vector![policy("p1", "Retention")]))
        .reduce(PolicyAction::SetRules(vector![
            rule("r1", "active"),
            rule("r2", "draft"),
            rule("r3", "active"),
            rule("r4", "inactive"),
        ]));
    assert_eq!(
        state.summary(),
        PolicySummary {
            policies: 1,
            rules: 4,
            active_rules: 2,
            draft_rules: 1,
        }
    );

    let state = state.reduce(PolicyAction::DeleteRule("r1".to_string()));
    assert_eq!(state.summary().active_rules, 1);
}

#[test]
fn should_merge_analysis_entries_by_id() {
    let entry = |id: &str, fields: serde_json::Value| AnalysisEntry {
        id: Some(id.to_string()),
        fields: match fields {
            serde_json::Value::Object(fields) => fields,
            _ => Map::new(),
        },
    };
    let state = PolicyState::default()
        .reduce(PolicyAction::SetComplianceMatrix(vector![
            entry("r1", json!({ "status": "gap", "owner": "ops" })),
            entry("r2", json!({ "status": "compliant" })),
        ]))
        .reduce(PolicyAction::UpdateComplianceEntry(entry("r1", json!({ "status": "compliant" }))))
        .reduce(PolicyAction::UpdateWasteEntry(entry("w1", json!({ "kind": "waiting" }))));

    let first = &state.compliance_matrix[0];
    assert_eq!(first.fields.get("status"), Some(&json!("compliant")));
    assert_eq!(first.fields.get("owner"), Some(&json!("ops")));
    assert!(state.waste_analysis.is_empty());
}

#[test]
fn should_merge_user_fields() {
    let state = AuthState {
        user: Some(User {
            id: Some("1".to_string()),
            email: "ada@example.com".to_string(),
            ..User::default()
        }),
        token: Some(TEST_TOKEN.to_string()),
        is_authenticated: true,
        is_loading: false,
    };
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!("Ada"));
    fields.insert("team".to_string(), json!("risk"));

    let state = state.reduce(AuthAction::UpdateUser(fields));
    let user = state.user.unwrap();
    assert_eq!(user.name.as_deref(), Some("Ada"));
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.extra.get("team"), Some(&json!("risk")));
}

#[test]
fn should_release_loading_flag_only_after_last_request() {
    let runtime = create_runtime();
    let flag = LoadingFlag::new();
    {
        let _first = flag.guard();
        {
            let _second = flag.guard();
            assert!(flag.get());
        }
        assert!(flag.get());
    }
    assert!(!flag.get());
    runtime.dispose();
}

#[test]
fn should_cap_notification_queue() {
    let runtime = create_runtime();
    let notifications = Notifications::new(2);
    notifications.success("one");
    let second = notifications.error("two");
    notifications.success("three");

    let pending = notifications.pending();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].message, "two");

    notifications.dismiss(second);
    assert_eq!(notifications.drain().len(), 1);
    assert!(notifications.pending().is_empty());
    runtime.dispose();
}

#[tokio::test]
async fn should_load_processes_and_track_loading() {
    let server = spawn_backend().await;
    server.backend.seed(Resource::Processes, json!({ "id": 1, "name": "A", "status": "active" }));
    server.backend.seed(Resource::Processes, json!({ "id": 2, "name": "B", "status": "draft" }));
    server.backend.data().delay = Some(Duration::from_millis(200));
    let session = server.session();
    assert!(!session.processes.loading().get());

    let (result, loading_in_flight) = tokio::join!(session.processes.load_processes(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.processes.loading().get()
    });
    let processes = result.unwrap();
    assert!(loading_in_flight);
    assert!(!session.processes.loading().is_loading.get_untracked());
    assert_eq!(processes.len(), 2);
    assert_eq!(session.processes.snapshot().processes, processes);
    assert_eq!(session.processes.summary(), ProcessSummary { total: 2, active: 1 });
    assert!(session.notifications.pending().is_empty());
    session.end();
}

#[tokio::test]
async fn should_notify_once_and_clear_loading_on_failure() {
    let server = spawn_backend().await;
    server.backend.data().fail_with = Some(502);
    let session = server.session();
    session.processes.open_process(process("1", "draft"));

    let error = session.processes.load_processes().await.unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::BAD_GATEWAY));
    assert!(!session.processes.loading().get());
    assert_eq!(error_messages(&session.notifications), vec!["Failed to load processes"]);
    assert!(session.processes.snapshot().error.is_some());
    assert!(session.processes.snapshot().processes.is_empty());
    assert_eq!(session.processes.editor.history().len(), 1);
    session.end();
}

#[tokio::test]
async fn should_clear_loading_when_request_times_out() {
    let server = spawn_backend().await;
    server.backend.data().delay = Some(Duration::from_secs(5));
    let session = server.session();

    let error = session.policies.load_rules().await.unwrap_err();
    assert!(matches!(error, SyncError::Timeout(_)));
    assert!(!session.policies.loading().get());
    assert_eq!(error_messages(&session.notifications), vec!["Failed to load rules"]);
    session.end();
}

#[tokio::test]
async fn should_create_update_and_delete_processes() {
    let server = spawn_backend().await;
    let session = server.session();
    let store = &session.processes;

    let created = store.create_process(&ProcessDocument::new("Claims")).await.unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(store.snapshot().processes, vector![created]);

    let updated = store
        .update_process(&id, &json!({ "status": "active" }))
        .await
        .unwrap();
    assert!(updated.is_active());
    assert_eq!(store.summary().active, 1);

    store.open_process(updated);
    store.delete_process(&id).await.unwrap();
    assert!(store.snapshot().processes.is_empty());
    assert!(store.editor.current().is_none());

    let messages: Vec<String> = session
        .notifications
        .drain()
        .into_iter()
        .map(|notification| notification.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Process created successfully",
            "Process updated successfully",
            "Process deleted successfully",
        ]
    );
    session.end();
}

#[tokio::test]
async fn should_save_edited_document() {
    let server = spawn_backend().await;
    let session = server.session();
    let store = &session.processes;

    assert_eq!(store.save_current().await.unwrap(), None);

    store.editor.add_element("start-event", 10.0, 20.0).unwrap();
    let created = store.save_current().await.unwrap().unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(created.elements.len(), 1);
    assert_eq!(store.editor.current().and_then(|document| document.id.clone()), Some(id.clone()));
    assert!(!store.editor.history().can_undo.get_untracked());

    let added = store.editor.add_element("task", 60.0, 20.0).unwrap();
    let saved = store.save_current().await.unwrap().unwrap();
    assert!(saved.contains(&added));
    assert!(store.editor.history().can_undo.get_untracked());

    let stored = server.backend.records(Resource::Processes);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["elements"].as_array().map(Vec::len), Some(2));
    session.end();
}

#[tokio::test]
async fn should_refresh_open_document_from_server_copy() {
    let server = spawn_backend().await;
    let session = server.session();
    let store = &session.processes;

    let created = store.create_process(&ProcessDocument::new("Claims")).await.unwrap();
    let id = created.id.clone().unwrap();
    store.open_process(created);
    let first = store.editor.add_element("task", 10.0, 10.0).unwrap();
    store.editor.select(&first).unwrap();

    store.save_current().await.unwrap();
    let current = store.editor.current().unwrap();
    let stamp = current.extra.get("updatedAt").cloned();
    assert!(stamp.is_some());
    assert_eq!(store.editor.history().len(), 2);
    assert_eq!(store.editor.selected(), Some(first.clone()));

    let second = store.editor.add_element("task", 50.0, 10.0).unwrap();
    store
        .update_process(&id, &json!({ "status": "active" }))
        .await
        .unwrap();
    let current = store.editor.current().unwrap();
    assert!(current.is_active());
    assert!(current.contains(&second));
    assert_ne!(current.extra.get("updatedAt").cloned(), stamp);

    let undone = store.editor.undo().unwrap();
    assert!(undone.is_active());
    assert!(!undone.contains(&second));
    assert!(undone.contains(&first));
    session.end();
}

#[tokio::test]
async fn should_leave_editor_alone_when_other_process_changes() {
    let server = spawn_backend().await;
    let session = server.session();
    let store = &session.processes;

    let open = store.create_process(&ProcessDocument::new("Open")).await.unwrap();
    let other = store.create_process(&ProcessDocument::new("Other")).await.unwrap();
    store.open_process(open.clone());

    store
        .update_process(other.id.as_deref().unwrap(), &json!({ "status": "active" }))
        .await
        .unwrap();
    assert_eq!(store.editor.current().as_deref(), Some(&open));
    session.end();
}

#[tokio::test]
async fn should_manage_policies_and_rules() {
    let server = spawn_backend().await;
    let session = server.session();
    let store = &session.policies;

    let created = store.create_policy(&Policy::new("Retention")).await.unwrap();
    let policy_id = created.id.clone().unwrap();
    store.set_current_policy(Some(created));
    store
        .update_policy(&policy_id, &json!({ "status": "active" }))
        .await
        .unwrap();
    assert_eq!(
        store.snapshot().current_policy.and_then(|policy| policy.status),
        Some("active".to_string())
    );

    let rule = store
        .create_rule(&Rule::new("Four eyes").set_action("escalate"))
        .await
        .unwrap();
    let rule_id = rule.id.clone().unwrap();
    store.set_current_rule(Some(rule));
    store.delete_rule(&rule_id).await.unwrap();
    assert!(store.snapshot().rules.is_empty());
    assert!(store.snapshot().current_rule.is_none());

    store.delete_policy(&policy_id).await.unwrap();
    assert!(store.snapshot().policies.is_empty());
    assert!(store.snapshot().current_policy.is_none());

    store.load_policies().await.unwrap();
    store.load_rules().await.unwrap();
    assert!(error_messages(&session.notifications).is_empty());
    session.end();
}

#[tokio::test]
async fn should_store_compliance_analysis() {
    let server = spawn_backend().await;
    let session = server.session();

    session
        .policies
        .analyze_compliance("7", &["p1".to_string()])
        .await
        .unwrap();
    let state = session.policies.snapshot();
    assert_eq!(state.compliance_matrix.len(), 1);
    assert_eq!(state.waste_analysis.len(), 1);
    assert_eq!(
        session.notifications.pending().last().map(|n| n.message.clone()),
        Some("Compliance analysis completed".to_string())
    );
    session.end();
}

#[tokio::test]
async fn should_log_in_and_out() {
    let server = spawn_backend().await;
    let tokens = Rc::new(MemoryTokenStore::new());
    let session = server.session_with(tokens.clone());

    assert!(session.auth.snapshot().is_loading);
    assert!(session.auth.restore().await.is_none());
    assert!(!session.auth.snapshot().is_authenticated);

    let user = session.auth.login("ada@example.com", TEST_PASSWORD).await.unwrap();
    let state = session.auth.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(user));
    assert_eq!(state.token.as_deref(), Some(TEST_TOKEN));
    assert_eq!(tokens.load().unwrap().as_deref(), Some(TEST_TOKEN));

    session.auth.logout();
    assert_eq!(session.auth.snapshot(), AuthState::default());
    assert_eq!(tokens.load().unwrap(), None);
    session.end();
}

#[tokio::test]
async fn should_reject_bad_credentials() {
    let server = spawn_backend().await;
    let session = server.anonymous_session();

    assert!(session.auth.login("ada@example.com", "wrong").await.is_err());
    let state = session.auth.snapshot();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(
        error_messages(&session.notifications),
        vec!["Login failed. Please check your credentials."]
    );
    session.end();
}

#[tokio::test]
async fn should_restore_stored_session() {
    let server = spawn_backend().await;
    let session = server.session();

    let user = session.auth.restore().await.unwrap();
    assert_eq!(user.email, "user@example.com");
    assert!(session.auth.snapshot().is_authenticated);
    session.end();
}

#[tokio::test]
async fn should_register_new_account() {
    let server = spawn_backend().await;
    let session = server.anonymous_session();
    let registration = Registration {
        email: "grace@example.com".to_string(),
        password: "hopper".to_string(),
        name: Some("Grace".to_string()),
        ..Registration::default()
    };

    let user = session.auth.register(&registration).await.unwrap();
    assert_eq!(user.email, "grace@example.com");
    assert!(session.auth.snapshot().is_authenticated);
    assert_eq!(
        session.notifications.pending().last().map(|n| n.message.clone()),
        Some("Registration successful!".to_string())
    );
    session.end();
}

#[test]
fn should_pick_token_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = StudioConfig {
        token_dir: Some(dir.path().to_path_buf()),
        ..StudioConfig::default()
    };
    let session = Session::start(&config).unwrap();
    session.client.tokens().save("abc").unwrap();
    assert!(dir.path().join("storage.json").exists());
    session.end();
}
