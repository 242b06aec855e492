//! Inbound semantic-model descriptors and their flattening into a
//! [`FieldCatalog`].
//!
//! The host hands over views (one data source each) and, optionally, topics
//! grouping several views around a base view. The builder only needs the
//! `{name, fullName, type?}` projection.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Field, FieldCatalog, FieldType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub name: String,

    #[serde(default)]
    pub dimensions: Vec<FieldDescriptor>,

    #[serde(default)]
    pub measures: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_view: Option<String>,

    #[serde(default)]
    pub views: Vec<String>,
}

/// On-disk catalog consumed by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub views: Vec<ViewDescriptor>,

    #[serde(default)]
    pub topics: Vec<TopicDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogScope {
    View(String),
    Topic(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("view not found in catalog: {name}")]
    UnknownView { name: String },

    #[error("topic not found in catalog: {name}")]
    UnknownTopic { name: String },

    #[error("topic `{topic}` references unknown view `{view}`")]
    TopicViewMissing { topic: String, view: String },
}

impl CatalogDocument {
    pub fn view(&self, name: &str) -> Result<&ViewDescriptor, CatalogError> {
        self.views
            .iter()
            .find(|view| view.name == name)
            .ok_or_else(|| CatalogError::UnknownView {
                name: name.to_string(),
            })
    }

    pub fn topic(&self, name: &str) -> Result<&TopicDescriptor, CatalogError> {
        self.topics
            .iter()
            .find(|topic| topic.name == name)
            .ok_or_else(|| CatalogError::UnknownTopic {
                name: name.to_string(),
            })
    }

    pub fn field_catalog(&self, scope: &CatalogScope) -> Result<FieldCatalog, CatalogError> {
        match scope {
            CatalogScope::View(name) => Ok(flatten_view(self.view(name)?)),
            CatalogScope::Topic(name) => flatten_topic(self.topic(name)?, &self.views),
        }
    }
}

pub fn load_catalog_document(path: &Path) -> Result<CatalogDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog {}", path.display()))
}

#[must_use]
pub fn flatten_view(view: &ViewDescriptor) -> FieldCatalog {
    let mut catalog = FieldCatalog::default();
    append_view(&mut catalog, view);
    catalog
}

/// Base view first, then member views in declared order. A view listed
/// twice contributes its fields once.
pub fn flatten_topic(
    topic: &TopicDescriptor,
    views: &[ViewDescriptor],
) -> Result<FieldCatalog, CatalogError> {
    let mut catalog = FieldCatalog::default().with_topic(topic.name.clone());
    let mut seen = BTreeSet::new();

    for view_name in topic.base_view.iter().chain(topic.views.iter()) {
        if !seen.insert(view_name.as_str()) {
            continue;
        }
        let view = views
            .iter()
            .find(|view| &view.name == view_name)
            .ok_or_else(|| CatalogError::TopicViewMissing {
                topic: topic.name.clone(),
                view: view_name.clone(),
            })?;
        append_view(&mut catalog, view);
    }

    Ok(catalog)
}

fn append_view(catalog: &mut FieldCatalog, view: &ViewDescriptor) {
    for descriptor in &view.dimensions {
        catalog.dimensions.push(Field::new(
            descriptor.name.clone(),
            full_name(view, descriptor),
            FieldType::parse(&descriptor.field_type),
        ));
    }
    for descriptor in &view.measures {
        // Measure descriptors usually carry the aggregation kind as their type.
        let field_type = FieldType::parse(&descriptor.field_type).unwrap_or(FieldType::Number);
        catalog.measures.push(Field::new(
            descriptor.name.clone(),
            full_name(view, descriptor),
            Some(field_type),
        ));
    }
}

fn full_name(view: &ViewDescriptor, descriptor: &FieldDescriptor) -> String {
    let view_name = descriptor.view_name.as_deref().unwrap_or(&view.name);
    format!("{view_name}.{}", descriptor.name)
}
