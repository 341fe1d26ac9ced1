// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory template registry.
//!
//! Stores [`NotificationTemplate`] records keyed by id, supporting
//! registration, lookup, filtering by channel or kind, and removal. Template
//! authoring lives in out-of-scope admin surfaces; the registry only has to
//! serve reads on the dispatch path, so it implements [`TemplateSource`].

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use herald_core::traits::TemplateSource;
use herald_core::types::{Channel, NotificationTemplate, TemplateKind};

/// Registry of notification templates keyed by id.
pub struct TemplateRegistry {
    templates: RwLock<HashMap<String, NotificationTemplate>>,
}

impl TemplateRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-seeded with the built-in templates.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for template in crate::builtin::builtin_templates() {
            registry.add(template);
        }
        registry
    }

    /// Insert or replace a template.
    pub fn add(&self, template: NotificationTemplate) {
        self.templates
            .write()
            .expect("template registry lock poisoned")
            .insert(template.id.clone(), template);
    }

    /// Remove a template by id. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.templates
            .write()
            .expect("template registry lock poisoned")
            .remove(id)
            .is_some()
    }

    /// Apply an in-place edit to a template, stamping `updated_at`.
    /// Returns whether the template existed.
    pub fn update(&self, id: &str, edit: impl FnOnce(&mut NotificationTemplate)) -> bool {
        let mut templates = self
            .templates
            .write()
            .expect("template registry lock poisoned");
        match templates.get_mut(id) {
            Some(template) => {
                edit(template);
                template.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<NotificationTemplate> {
        self.templates
            .read()
            .expect("template registry lock poisoned")
            .get(id)
            .cloned()
    }

    /// All templates, sorted by id.
    pub fn all(&self) -> Vec<NotificationTemplate> {
        let mut templates: Vec<NotificationTemplate> = self
            .templates
            .read()
            .expect("template registry lock poisoned")
            .values()
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    pub fn by_channel(&self, channel: Channel) -> Vec<NotificationTemplate> {
        self.all()
            .into_iter()
            .filter(|t| t.channel == channel)
            .collect()
    }

    pub fn by_kind(&self, kind: TemplateKind) -> Vec<NotificationTemplate> {
        self.all().into_iter().filter(|t| t.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.templates
            .read()
            .expect("template registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSource for TemplateRegistry {
    fn get_template(&self, id: &str) -> Option<NotificationTemplate> {
        self.get(id)
    }
}
