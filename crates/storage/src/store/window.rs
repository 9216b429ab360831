// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Window aggregator operations (§4.D).

use std::collections::{HashMap, HashSet};

use trk_core::entities::{SessionWindow, SessionWindowId, WindowMessage, WindowMessageId};
use trk_core::{time, Clock, CoreResult, Event};
use chrono::{DateTime, Utc};

use super::Store;

impl<C: Clock> Store<C> {
    fn find_window_containing(&self, t: DateTime<Utc>) -> Option<SessionWindowId> {
        self.state.windows.values().find(|w| w.contains(t)).map(|w| w.id)
    }

    /// Find the window containing `t`, creating one anchored on
    /// `truncate_to_minute(t)` if none exists. The lookup is repeated with
    /// the freshly computed `window_start` right before insertion as a
    /// race guard against a concurrent creator.
    pub fn get_or_create_window_for_message(&mut self, t: DateTime<Utc>) -> CoreResult<SessionWindowId> {
        if let Some(id) = self.find_window_containing(t) {
            return Ok(id);
        }

        let window_start = time::truncate_to_minute(t);
        let window_end = time::window_end_for(window_start);

        if let Some(id) = self.find_window_containing(window_start) {
            return Ok(id);
        }

        let now = self.clock.now_utc();
        let window = SessionWindow {
            id: SessionWindowId::new(),
            window_start,
            window_end,
            reset_time: window_end,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_tokens: 0,
            message_count: 0,
            session_count: 0,
            total_cost: 0.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = window.id;
        self.emit(Event::WindowCreated { window })?;
        Ok(id)
    }

    /// Recompute `window_id`'s counters from its currently linked messages:
    /// token totals over every linked message, `message_count` over
    /// assistant-role messages only, `session_count` distinct over all
    /// linked messages, and `total_cost` by grouping assistant messages by
    /// model and calling the injected pricing function once per group.
    pub fn update_window_stats(&mut self, window_id: SessionWindowId) -> CoreResult<()> {
        let messages = self.state.messages_in_window(window_id);

        let mut total_input_tokens = 0u64;
        let mut total_output_tokens = 0u64;
        let mut message_count = 0u64;
        let mut sessions: HashSet<&str> = HashSet::new();
        let mut by_model: HashMap<String, (u64, u64, u64, u64)> = HashMap::new();

        for message in &messages {
            total_input_tokens += message.input_tokens;
            total_output_tokens += message.output_tokens;
            sessions.insert(message.session_id.as_str());

            if message.is_assistant() {
                message_count += 1;
                let model = message.model.clone().unwrap_or_default();
                let entry = by_model.entry(model).or_insert((0, 0, 0, 0));
                entry.0 += message.input_tokens;
                entry.1 += message.output_tokens;
                entry.2 += message.cache_creation_input_tokens;
                entry.3 += message.cache_read_input_tokens;
            }
        }

        let total_cost: f64 = by_model
            .iter()
            .map(|(model, (input, output, cache_creation, cache_read))| {
                (self.pricing)(model, *input, *output, *cache_creation, *cache_read)
            })
            .sum();

        let updated_at = self.clock.now_utc();
        self.emit(Event::WindowStatsUpdated {
            window_id,
            total_input_tokens,
            total_output_tokens,
            total_tokens: total_input_tokens + total_output_tokens,
            message_count,
            session_count: sessions.len() as u64,
            total_cost,
            updated_at,
        })
    }

    /// Repair operation: drop every window and link, then rebuild them
    /// oldest-message-first so windows/links end up exactly as they would
    /// from a from-scratch ingest.
    pub fn recalculate_all_windows(&mut self) -> CoreResult<()> {
        self.emit(Event::WindowsReset)?;

        loop {
            let oldest_unlinked_timestamp = {
                let mut unlinked: Vec<DateTime<Utc>> = self
                    .state
                    .messages
                    .values()
                    .filter(|m| self.state.window_for_message(&m.id).is_none())
                    .map(|m| m.timestamp)
                    .collect();
                unlinked.sort();
                unlinked.first().copied()
            };

            let Some(timestamp) = oldest_unlinked_timestamp else { break };
            let window_id = self.get_or_create_window_for_message(timestamp)?;
            // get_or_create_window_for_message just returned this id, so the window exists.
            #[allow(clippy::expect_used)]
            let window = self.state.windows.get(&window_id).cloned().expect("window was just created or found");

            let to_link: Vec<String> = self
                .state
                .messages
                .values()
                .filter(|m| window.contains(m.timestamp) && self.state.window_for_message(&m.id).is_none())
                .map(|m| m.id.clone())
                .collect();

            let now = self.clock.now_utc();
            for message_id in to_link {
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
        }
        Ok(())
    }

    pub fn get_active_window(&self) -> Option<SessionWindow> {
        self.state.active_window().cloned()
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
