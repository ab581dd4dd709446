//! Certificate templates: a named, version-less design document with a
//! `Draft → Published` lifecycle.

use crate::error::{Error, Result};
use crate::model::canvas::Point;
use crate::model::certificate::{merge_with_defaults, DesignElements, ElementName};
use crate::store::Document;
use crate::validation::{self, not_blank};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemplateStatus {
    #[default]
    Draft,
    Published,
}

/// A stored certificate template.
///
/// Fields are private so every mutation goes through a method that refreshes
/// `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CertificateTemplate {
    id: String,
    #[validate(custom(function = "not_blank"), length(max = 120))]
    name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    description: String,
    #[serde(default)]
    status: TemplateStatus,
    #[serde(default, deserialize_with = "deserialize_design")]
    #[validate(nested)]
    design_elements: DesignElements,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn deserialize_design<'de, D>(deserializer: D) -> std::result::Result<DesignElements, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Value::deserialize(deserializer)?;
    merge_with_defaults(&stored).map_err(D::Error::custom)
}

impl CertificateTemplate {
    /// A fresh draft with a generated id and the default design.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            status: TemplateStatus::Draft,
            design_elements: DesignElements::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TemplateStatus {
        self.status
    }

    pub fn design(&self) -> &DesignElements {
        &self.design_elements
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_published(&self) -> bool {
        self.status == TemplateStatus::Published
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    /// Applies an arbitrary edit to the design document.
    pub fn update_design<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut DesignElements),
    {
        edit(&mut self.design_elements);
        self.touch();
    }

    /// Moves `element` to `point` (logical canvas units, not clamped).
    ///
    /// Only the two coordinate fields owned by the element change. The logo
    /// has no persisted position: the call is accepted and ignored, and the
    /// template is left untouched. Returns whether anything changed.
    pub fn set_element_position(&mut self, element: ElementName, point: Point) -> bool {
        let moved = self.design_elements.set_position(element, point);
        if moved {
            self.touch();
        }
        moved
    }

    /// Takes over the editable content of `incoming` (name, description,
    /// design). Identity, creation time and status stay as they are: the
    /// status only moves forward through `publish`.
    pub fn apply_edit(&mut self, incoming: CertificateTemplate) {
        self.name = incoming.name;
        self.description = incoming.description;
        self.design_elements = incoming.design_elements;
        self.touch();
    }

    /// `Draft → Published`. The design has to pass validation first.
    pub fn publish(&mut self) -> Result<()> {
        if self.is_published() {
            return Err(Error::InvalidTransition(format!(
                "template `{}` is already published",
                self.id
            )));
        }
        validation::check(self)?;
        self.status = TemplateStatus::Published;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

impl Document for CertificateTemplate {
    const COLLECTION: &'static str = "certificate_templates";

    fn id(&self) -> &str {
        &self.id
    }
}
