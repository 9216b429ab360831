// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use trk_core::Event;

use super::MaterializedState;

pub fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::FileSyncStateUpdated { state: row } => {
            state.file_sync.insert(row.file_path.clone(), row.clone());
        }
        Event::FileSyncStateDeleted { file_path } => {
            state.file_sync.remove(file_path);
        }
        _ => {}
    }
}
