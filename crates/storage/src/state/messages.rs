// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use trk_core::Event;

use super::MaterializedState;

pub fn apply(state: &mut MaterializedState, event: &Event) {
    if let Event::MessageUpserted { message, .. } = event {
        // Preserve the earliest-observed created_at (§3, invariant 5): if a
        // row already exists, keep its created_at instead of the incoming one.
        let created_at = state
            .messages
            .get(message.id.as_str())
            .map(|existing| existing.created_at)
            .unwrap_or(message.created_at);
        let mut stored = (**message).clone();
        stored.created_at = created_at;
        state.messages.insert(stored.id.clone(), stored);
    }
}
