//! Field profiles
//!
//! A profile decides which optional item fields exist, which categories are
//! allowed and whether input is validated at all:
//!
//! | Profile     | Categories                                        | Urgency | Validation |
//! |-------------|---------------------------------------------------|---------|------------|
//! | `basic`     | free text                                         | no      | none       |
//! | `grocery`   | Fruits, Vegetables, Dairy, Meat, Snacks, Pantry   | yes     | all fields |
//! | `household` | Groceries, Household, Personal Care, Electronics  | yes     | all fields |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::{ItemFields, Urgency};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown category '{value}' (expected one of: {})", .allowed.join(", "))]
    UnknownCategory {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Unknown urgency '{0}' (expected one of: Low, Medium, High)")]
    UnknownUrgency(String),
}

pub const GROCERY_CATEGORIES: &[&str] =
    &["Fruits", "Vegetables", "Dairy", "Meat", "Snacks", "Pantry"];

pub const HOUSEHOLD_CATEGORIES: &[&str] =
    &["Groceries", "Household", "Personal Care", "Electronics"];

/// Which optional fields an item store supports and how input is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldProfile {
    /// Allowed categories; `None` means free text
    pub categories: Option<&'static [&'static str]>,

    /// Whether items carry an urgency
    pub urgency: bool,

    /// Whether empty or unknown values are rejected
    pub validate: bool,
}

impl FieldProfile {
    pub const BASIC: FieldProfile = FieldProfile {
        categories: None,
        urgency: false,
        validate: false,
    };

    pub const GROCERY: FieldProfile = FieldProfile {
        categories: Some(GROCERY_CATEGORIES),
        urgency: true,
        validate: true,
    };

    pub const HOUSEHOLD: FieldProfile = FieldProfile {
        categories: Some(HOUSEHOLD_CATEGORIES),
        urgency: true,
        validate: true,
    };

    /// Checks submitted fields and returns them in stored form.
    ///
    /// Urgency is dropped for profiles without it. Enumerated categories and
    /// urgencies match case-insensitively and are stored with canonical
    /// spelling. Profiles that don't validate accept anything else verbatim.
    pub fn normalize(&self, mut fields: ItemFields) -> Result<ItemFields, ValidationError> {
        if !self.urgency {
            fields.urgency = None;
        }

        if !self.validate {
            return Ok(fields);
        }

        if fields.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if fields.quantity.trim().is_empty() {
            return Err(ValidationError::MissingField("quantity"));
        }

        let category = take_filled(&mut fields.category, "category")?;
        fields.category = Some(self.canonical_category(&category)?);

        if self.urgency {
            let urgency = take_filled(&mut fields.urgency, "urgency")?;
            let urgency: Urgency = urgency.parse().map_err(ValidationError::UnknownUrgency)?;
            fields.urgency = Some(urgency.as_str().to_string());
        }

        Ok(fields)
    }

    fn canonical_category(&self, category: &str) -> Result<String, ValidationError> {
        match self.categories {
            None => Ok(category.to_string()),
            Some(allowed) => allowed
                .iter()
                .find(|c| c.eq_ignore_ascii_case(category.trim()))
                .map(|c| (*c).to_string())
                .ok_or_else(|| ValidationError::UnknownCategory {
                    value: category.to_string(),
                    allowed,
                }),
        }
    }
}

impl Default for FieldProfile {
    fn default() -> Self {
        FieldProfile::GROCERY
    }
}

fn take_filled(value: &mut Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .take()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::MissingField(field))
}

/// Named profile presets, as used in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Basic,
    #[default]
    Grocery,
    Household,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Basic => "basic",
            ProfileKind::Grocery => "grocery",
            ProfileKind::Household => "household",
        }
    }

    pub fn profile(&self) -> FieldProfile {
        match self {
            ProfileKind::Basic => FieldProfile::BASIC,
            ProfileKind::Grocery => FieldProfile::GROCERY,
            ProfileKind::Household => FieldProfile::HOUSEHOLD,
        }
    }
}
