// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project rows. Uniqueness is `(name, path)`; deletion is soft via
//! `is_active = false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque project identifier.
    pub struct ProjectId("prj-");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path: String,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub language: Option<String>,
    pub framework: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            path: path.into(),
            description: None,
            repository_url: None,
            language: None,
            framework: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    crate::setters! {
        option { description: String, repository_url: String, language: String, framework: String }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ProjectBuilder => Project {
        into { name: String = "demo", path: String = "/home/dev/demo" }
        set { is_active: bool = true }
        computed {
            id: ProjectId = ProjectId::new(),
            description: Option<String> = None,
            repository_url: Option<String> = None,
            language: Option<String> = None,
            framework: Option<String> = None,
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now()
        }
    }
}
