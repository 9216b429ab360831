// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use trk_core::Event;

use super::MaterializedState;

pub fn apply(state: &mut MaterializedState, event: &Event) {
    if let Event::SessionUpserted { session } = event {
        // Assignment, not merge: the caller (Store) is responsible for
        // computing the correct `start_time`/aggregate values before
        // emitting the event, so applying it twice is a no-op.
        state.sessions.insert(session.id.clone(), session.clone());
    }
}
