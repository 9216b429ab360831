// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `processLogEntry` (§4.E): the single operation the differential log
//! ingestor calls once per decoded log line.

use chrono::{DateTime, Utc};
use smol_str::SmolStr;
use trk_core::entities::{Project, ProjectId, Session, WindowMessage, WindowMessageId};
use trk_core::glossary::{coerce_content, convert_project_name_to_path, extract_project_name_from_cwd};
use trk_core::{Clock, CoreResult, Event, LogEntry, Message};

use super::Store;

impl<C: Clock> Store<C> {
    /// Resolve project, upsert session and message, link the message into
    /// its window, and recompute the window's and session's aggregates —
    /// all from a single decoded log line.
    pub fn process_log_entry(&mut self, entry: &LogEntry, fallback_project_name: &str) -> CoreResult<()> {
        let now = self.clock.now_utc();

        let (project_name, project_path) = match entry.cwd.as_deref() {
            Some(cwd) if !cwd.is_empty() => {
                (extract_project_name_from_cwd(cwd), cwd.to_string())
            }
            _ => (fallback_project_name.to_string(), convert_project_name_to_path(fallback_project_name)),
        };

        let project_id = self.upsert_project(&project_name, &project_path, now)?;
        self.upsert_session(&entry.session_id, &project_name, &project_path, project_id, entry.timestamp, now)?;

        let message = build_message(entry, now);
        let message_id = message.id.clone();
        self.emit(Event::MessageUpserted {
            message: Box::new(message),
            session_id: entry.session_id.clone(),
        })?;

        let window_id = self.get_or_create_window_for_message(entry.timestamp)?;
        if self.state.window_for_message(&message_id).is_none() {
            self.emit(Event::WindowMessageLinked {
                link: WindowMessage {
                    id: WindowMessageId::new(),
                    session_window_id: window_id,
                    message_id,
                    created_at: now,
                },
            })?;
        }
        self.update_window_stats(window_id)?;
        self.recompute_session_aggregates(&entry.session_id)?;
        Ok(())
    }

    fn upsert_project(&mut self, name: &str, path: &str, now: DateTime<Utc>) -> CoreResult<ProjectId> {
        if let Some(existing) = self.state.projects.values().find(|p| p.name == name && p.path == path) {
            return Ok(existing.id);
        }
        let project = Project::new(name, path, now);
        let id = project.id;
        self.emit(Event::ProjectUpserted { project })?;
        Ok(id)
    }

    fn upsert_session(
        &mut self,
        session_id: &str,
        project_name: &str,
        project_path: &str,
        project_id: ProjectId,
        message_timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        let mut session = match self.state.sessions.get(session_id) {
            Some(existing) => existing.clone(),
            None => Session::new(session_id, project_name, project_path, message_timestamp, now),
        };
        // start_time only ever moves earlier: the first-observed message wins.
        if message_timestamp < session.start_time {
            session.start_time = message_timestamp;
        }
        session.project_id = Some(project_id);
        self.emit(Event::SessionUpserted { session })
    }

    fn recompute_session_aggregates(&mut self, session_id: &str) -> CoreResult<()> {
        let Some(mut session) = self.state.sessions.get(session_id).cloned() else {
            return Ok(());
        };

        let mut total_input_tokens = 0u64;
        let mut total_output_tokens = 0u64;
        let mut message_count = 0u64;
        let mut end_time: Option<DateTime<Utc>> = None;

        for message in self.state.messages.values().filter(|m| m.session_id == session_id) {
            message_count += 1;
            if message.is_assistant() {
                total_input_tokens += message.input_tokens;
                total_output_tokens += message.output_tokens;
            }
            end_time = Some(end_time.map_or(message.timestamp, |t| t.max(message.timestamp)));
        }

        session.total_input_tokens = total_input_tokens;
        session.total_output_tokens = total_output_tokens;
        session.total_tokens = total_input_tokens + total_output_tokens;
        session.message_count = message_count;
        session.end_time = end_time;

        self.emit(Event::SessionUpserted { session })
    }
}

fn build_message(entry: &LogEntry, now: DateTime<Utc>) -> Message {
    let message = entry.message.as_ref();
    let usage = message.and_then(|m| m.usage.as_ref());

    Message {
        id: entry.uuid.clone(),
        session_id: entry.session_id.clone(),
        parent_uuid: entry.parent_uuid.clone(),
        is_sidechain: entry.is_sidechain,
        user_type: entry.user_type.clone(),
        message_type: message.and_then(|m| m.message_type.clone()),
        message_role: message.and_then(|m| m.role.clone()).map(SmolStr::from),
        model: message.and_then(|m| m.model.clone()),
        content: message.and_then(|m| m.content.as_ref()).map(coerce_content),
        input_tokens: usage.map(|u| u.input_tokens).unwrap_or_default(),
        cache_creation_input_tokens: usage.map(|u| u.cache_creation_input_tokens).unwrap_or_default(),
        cache_read_input_tokens: usage.map(|u| u.cache_read_input_tokens).unwrap_or_default(),
        output_tokens: usage.map(|u| u.output_tokens).unwrap_or_default(),
        service_tier: usage.and_then(|u| u.service_tier.clone()),
        request_id: entry.request_id.clone(),
        timestamp: entry.timestamp,
        created_at: now,
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
