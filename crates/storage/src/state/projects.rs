// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use trk_core::Event;

use super::MaterializedState;

pub fn apply(state: &mut MaterializedState, event: &Event) {
    if let Event::ProjectUpserted { project } = event {
        state.projects.insert(project.id, project.clone());
    }
}
