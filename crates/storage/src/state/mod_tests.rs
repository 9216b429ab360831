// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use trk_core::entities::{
    FileSyncState, Job, JobId, JobStatus, Project, ProjectId, Session, SessionWindow,
    SessionWindowId, WindowMessage, WindowMessageId,
};
use trk_core::Event;

use super::MaterializedState;

fn window(id: SessionWindowId, start_offset_hours: i64, active: bool) -> SessionWindow {
    let now = Utc::now();
    SessionWindow {
        id,
        window_start: now + chrono::Duration::hours(start_offset_hours),
        window_end: now + chrono::Duration::hours(start_offset_hours + 5),
        reset_time: now + chrono::Duration::hours(start_offset_hours + 5),
        total_input_tokens: 0,
        total_output_tokens: 0,
        total_tokens: 0,
        message_count: 0,
        session_count: 0,
        total_cost: 0.0,
        is_active: active,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn project_upserted_inserts_by_id() {
    let mut state = MaterializedState::default();
    let project = Project::builder().build();
    state.apply_event(&Event::ProjectUpserted { project: project.clone() });
    assert_eq!(state.projects.get(&project.id), Some(&project));
}

#[test]
fn applying_project_upserted_twice_is_idempotent() {
    let mut state = MaterializedState::default();
    let project = Project::builder().build();
    let event = Event::ProjectUpserted { project: project.clone() };
    state.apply_event(&event);
    state.apply_event(&event);
    assert_eq!(state.projects.len(), 1);
}

#[test]
fn session_upserted_inserts_by_external_id() {
    let mut state = MaterializedState::default();
    let now = Utc::now();
    let session = Session::new("sess-1", "demo", "/home/dev/demo", now, now);
    state.apply_event(&Event::SessionUpserted { session: session.clone() });
    assert_eq!(state.sessions.get("sess-1"), Some(&session));
}

#[test]
fn message_upserted_preserves_earliest_created_at() {
    let mut state = MaterializedState::default();
    let now = Utc::now();
    let earlier = now - chrono::Duration::hours(1);

    let mut msg = trk_core::entities::Message {
        id: "msg-1".into(),
        session_id: "sess-1".into(),
        parent_uuid: None,
        is_sidechain: false,
        user_type: None,
        message_type: None,
        message_role: None,
        model: None,
        content: None,
        input_tokens: 0,
        cache_creation_input_tokens: 0,
        cache_read_input_tokens: 0,
        output_tokens: 0,
        service_tier: None,
        request_id: None,
        timestamp: now,
        created_at: earlier,
    };
    state.apply_event(&Event::MessageUpserted {
        message: Box::new(msg.clone()),
        session_id: "sess-1".into(),
    });

    msg.created_at = now;
    msg.output_tokens = 42;
    state.apply_event(&Event::MessageUpserted {
        message: Box::new(msg),
        session_id: "sess-1".into(),
    });

    let stored = state.messages.get("msg-1").expect("message present");
    assert_eq!(stored.created_at, earlier);
    assert_eq!(stored.output_tokens, 42);
}

#[test]
fn window_created_then_stats_updated() {
    let mut state = MaterializedState::default();
    let id = SessionWindowId::new();
    let w = window(id, 0, true);
    state.apply_event(&Event::WindowCreated { window: w.clone() });

    let updated_at = Utc::now();
    state.apply_event(&Event::WindowStatsUpdated {
        window_id: id,
        total_input_tokens: 10,
        total_output_tokens: 20,
        total_tokens: 30,
        message_count: 2,
        session_count: 1,
        total_cost: 0.5,
        updated_at,
    });

    let stored = state.windows.get(&id).expect("window present");
    assert_eq!(stored.total_tokens, 30);
    assert_eq!(stored.message_count, 2);
    assert_eq!(stored.updated_at, updated_at);
}

#[test]
fn stats_update_for_unknown_window_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply_event(&Event::WindowStatsUpdated {
        window_id: SessionWindowId::new(),
        total_input_tokens: 1,
        total_output_tokens: 1,
        total_tokens: 2,
        message_count: 1,
        session_count: 1,
        total_cost: 0.0,
        updated_at: Utc::now(),
    });
    assert!(state.windows.is_empty());
}

#[test]
fn window_message_linked_is_insert_or_ignore() {
    let mut state = MaterializedState::default();
    let window_id = SessionWindowId::new();
    let link = WindowMessage {
        id: WindowMessageId::new(),
        session_window_id: window_id,
        message_id: "msg-1".into(),
        created_at: Utc::now(),
    };
    state.apply_event(&Event::WindowMessageLinked { link: link.clone() });
    state.apply_event(&Event::WindowMessageLinked { link });
    assert_eq!(state.window_messages.len(), 1);
    assert_eq!(state.window_for_message("msg-1"), Some(window_id));
}

#[test]
fn windows_reset_clears_windows_and_links() {
    let mut state = MaterializedState::default();
    let id = SessionWindowId::new();
    state.apply_event(&Event::WindowCreated { window: window(id, 0, true) });
    state.apply_event(&Event::WindowMessageLinked {
        link: WindowMessage {
            id: WindowMessageId::new(),
            session_window_id: id,
            message_id: "msg-1".into(),
            created_at: Utc::now(),
        },
    });
    state.apply_event(&Event::WindowsReset);
    assert!(state.windows.is_empty());
    assert!(state.window_messages.is_empty());
}

#[test]
fn active_window_picks_greatest_window_start() {
    let mut state = MaterializedState::default();
    let older = window(SessionWindowId::new(), -5, true);
    let newer = window(SessionWindowId::new(), 0, true);
    state.apply_event(&Event::WindowCreated { window: older });
    state.apply_event(&Event::WindowCreated { window: newer.clone() });
    assert_eq!(state.active_window().map(|w| w.id), Some(newer.id));
}

#[test]
fn file_sync_state_updated_and_deleted() {
    let mut state = MaterializedState::default();
    let row = FileSyncState::fresh("/logs/a.jsonl", Utc::now());
    state.apply_event(&Event::FileSyncStateUpdated { state: row.clone() });
    assert!(state.file_sync.contains_key("/logs/a.jsonl"));

    state.apply_event(&Event::FileSyncStateDeleted { file_path: "/logs/a.jsonl".into() });
    assert!(!state.file_sync.contains_key("/logs/a.jsonl"));
}

#[test]
fn job_created_then_status_changed_sets_started_at_and_pid() {
    let mut state = MaterializedState::default();
    let project_id = ProjectId::new();
    let job = Job {
        id: JobId::new(),
        project_id,
        command: "echo hi".into(),
        execution_directory: "/tmp".into(),
        yolo_mode: false,
        status: JobStatus::Pending,
        priority: 0,
        created_at: Utc::now(),
        started_at: None,
        completed_at: None,
        output_log: None,
        error_log: None,
        exit_code: None,
        pid: None,
        scheduled_at: None,
        schedule_type: None,
        schedule_params: None,
    };
    let id = job.id;
    state.apply_event(&Event::JobCreated { job });

    let started_at = Utc::now();
    state.apply_event(&Event::JobStatusChanged {
        id,
        status: JobStatus::Running,
        started_at: Some(started_at),
        completed_at: None,
        pid: Some(4242),
        clear_pid: false,
    });

    let stored = state.jobs.get(&id).expect("job present");
    assert_eq!(stored.status, JobStatus::Running);
    assert_eq!(stored.started_at, Some(started_at));
    assert_eq!(stored.pid, Some(4242));
}

#[test]
fn job_status_changed_clears_pid_on_terminal_transition() {
    let mut state = MaterializedState::default();
    let job = Job::builder()
        .status(JobStatus::Running)
        .build();
    let id = job.id;
    state.apply_event(&Event::JobCreated { job });
    state.apply_event(&Event::JobStatusChanged {
        id,
        status: JobStatus::Completed,
        started_at: None,
        completed_at: Some(Utc::now()),
        pid: None,
        clear_pid: true,
    });
    assert_eq!(state.jobs.get(&id).unwrap().pid, None);
    assert_eq!(state.jobs.get(&id).unwrap().status, JobStatus::Completed);
}

#[test]
fn job_logs_updated_merges_without_touching_status() {
    let mut state = MaterializedState::default();
    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    state.apply_event(&Event::JobCreated { job });
    state.apply_event(&Event::JobLogsUpdated {
        id,
        output_log: Some("hello".into()),
        error_log: None,
        exit_code: Some(0),
    });
    let stored = state.jobs.get(&id).unwrap();
    assert_eq!(stored.output_log.as_deref(), Some("hello"));
    assert_eq!(stored.exit_code, Some(0));
    assert_eq!(stored.status, JobStatus::Running);
}

#[test]
fn job_deleted_removes_row() {
    let mut state = MaterializedState::default();
    let job = Job::builder().build();
    let id = job.id;
    state.apply_event(&Event::JobCreated { job });
    state.apply_event(&Event::JobDeleted { id });
    assert!(!state.jobs.contains_key(&id));
}

#[test]
fn messages_in_window_filters_by_link() {
    let mut state = MaterializedState::default();
    let window_id = SessionWindowId::new();
    state.apply_event(&Event::WindowCreated { window: window(window_id, 0, true) });

    let now = Utc::now();
    let msg = trk_core::entities::Message {
        id: "msg-1".into(),
        session_id: "sess-1".into(),
        parent_uuid: None,
        is_sidechain: false,
        user_type: None,
        message_type: None,
        message_role: None,
        model: None,
        content: None,
        input_tokens: 0,
        cache_creation_input_tokens: 0,
        cache_read_input_tokens: 0,
        output_tokens: 0,
        service_tier: None,
        request_id: None,
        timestamp: now,
        created_at: now,
    };
    state.apply_event(&Event::MessageUpserted {
        message: Box::new(msg),
        session_id: "sess-1".into(),
    });
    state.apply_event(&Event::WindowMessageLinked {
        link: WindowMessage {
            id: WindowMessageId::new(),
            session_window_id: window_id,
            message_id: "msg-1".into(),
            created_at: now,
        },
    });

    let linked = state.messages_in_window(window_id);
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, "msg-1");
}
