// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use trk_core::Event;

use super::MaterializedState;

pub fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::WindowCreated { window } => {
            state.windows.insert(window.id, window.clone());
        }
        Event::WindowStatsUpdated {
            window_id,
            total_input_tokens,
            total_output_tokens,
            total_tokens,
            message_count,
            session_count,
            total_cost,
            updated_at,
        } => {
            if let Some(window) = state.windows.get_mut(window_id) {
                window.total_input_tokens = *total_input_tokens;
                window.total_output_tokens = *total_output_tokens;
                window.total_tokens = *total_tokens;
                window.message_count = *message_count;
                window.session_count = *session_count;
                window.total_cost = *total_cost;
                window.updated_at = *updated_at;
            }
        }
        Event::WindowMessageLinked { link } => {
            // Insert-or-ignore: a message belongs to at most one window.
            let already_linked =
                state.window_messages.iter().any(|wm| wm.message_id == link.message_id);
            if !already_linked {
                state.window_messages.push(link.clone());
            }
        }
        Event::WindowsReset => {
            state.windows.clear();
            state.window_messages.clear();
        }
        _ => {}
    }
}
