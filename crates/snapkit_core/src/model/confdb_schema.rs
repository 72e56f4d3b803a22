//! Confdb schema assertion model.
//!
//! # Responsibility
//! - Define the store-side `confdb-schema` assertion record.
//! - Define its user-editable projection and the validation applied to
//!   edited content.
//!
//! # Invariants
//! - `name` and every view name are lowercase alphanumeric words joined by
//!   single hyphens.
//! - A schema always declares at least one view with at least one rule.

use crate::model::assertion::{parse_yaml, AssertionValidationError, EditableAssertion};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static SCHEMA_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9](?:-?[a-z0-9])*$").expect("valid schema name regex"));

/// Access granted by one view rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleAccess {
    Read,
    Write,
    ReadWrite,
}

/// Maps one request path of a view onto a storage path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfdbRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    pub storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<RuleAccess>,
    /// Nested rules scoped under this rule's request/storage prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ConfdbRule>>,
}

/// Named view exposed by a confdb schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfdbView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub rules: Vec<ConfdbRule>,
}

/// Confdb schema assertion as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfdbSchema {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub revision: u32,
    /// RFC 3339 timestamp of the revision.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub views: BTreeMap<String, ConfdbView>,
    /// JSON text describing the storage schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_key_sha3_384: Option<String>,
}

impl ConfdbSchema {
    /// Date part (`YYYY-MM-DD`) of the revision timestamp.
    pub fn revision_date(&self) -> &str {
        self.timestamp
            .split_once('T')
            .map_or(self.timestamp.as_str(), |(date, _)| date)
    }
}

/// User-editable projection of a confdb schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EditableConfdbSchema {
    pub account_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub revision: u32,
    pub views: BTreeMap<String, ConfdbView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl EditableConfdbSchema {
    /// Projects a stored assertion onto its editable fields.
    pub fn from_assertion(schema: &ConfdbSchema) -> Self {
        Self {
            account_id: schema.account_id.clone(),
            name: schema.name.clone(),
            summary: schema.summary.clone(),
            revision: schema.revision,
            views: schema.views.clone(),
            body: schema.body.clone(),
        }
    }

    /// Renders the editable fields as a YAML document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Checks field invariants that the YAML shape cannot express.
    pub fn validate(&self, label: &str) -> Result<(), AssertionValidationError> {
        if self.account_id.trim().is_empty() {
            return Err(AssertionValidationError::invalid(
                label,
                "account-id",
                "must not be empty",
            ));
        }
        if !SCHEMA_NAME_RE.is_match(&self.name) {
            return Err(AssertionValidationError::invalid(
                label,
                "name",
                format!("invalid name `{}`", self.name),
            ));
        }
        if self.views.is_empty() {
            return Err(AssertionValidationError::invalid(
                label,
                "views",
                "at least one view is required",
            ));
        }

        for (view_name, view) in &self.views {
            if !SCHEMA_NAME_RE.is_match(view_name) {
                return Err(AssertionValidationError::invalid(
                    label,
                    format!("views.{view_name}"),
                    "invalid view name",
                ));
            }
            if view.rules.is_empty() {
                return Err(AssertionValidationError::invalid(
                    label,
                    format!("views.{view_name}.rules"),
                    "at least one rule is required",
                ));
            }
            validate_rules(label, view_name, &view.rules)?;
        }
        Ok(())
    }
}

impl EditableAssertion for EditableConfdbSchema {
    fn from_yaml_str(source: &str, label: &str) -> Result<Self, AssertionValidationError> {
        let schema: Self = parse_yaml(source, label)?;
        schema.validate(label)?;
        Ok(schema)
    }
}

fn validate_rules(
    label: &str,
    view_name: &str,
    rules: &[ConfdbRule],
) -> Result<(), AssertionValidationError> {
    for rule in rules {
        if rule.storage.trim().is_empty() {
            return Err(AssertionValidationError::invalid(
                label,
                format!("views.{view_name}.rules.storage"),
                "must not be empty",
            ));
        }
        if let Some(content) = &rule.content {
            validate_rules(label, view_name, content)?;
        }
    }
    Ok(())
}

/// Default YAML document offered when creating a new confdb schema.
pub fn confdb_schema_template(name: &str, account_id: &str) -> String {
    format!(
        r#"account-id: {account_id}
name: {name}
# summary: Describe the purpose of this confdb schema
# The revision for this confdb schema
# revision: 0
views:
  wifi-setup:
    rules:
      - request: ssids
        storage: wifi.ssids
      - request: ssid
        storage: wifi.ssid
        access: read-write
      - request: password
        storage: wifi.psk
        access: write
      - request: status
        storage: wifi.status
        access: read
      - request: private.{{placeholder}}
        storage: private.{{placeholder}}
body: |-
  {{
    "storage": {{
      "schema": {{
        "wifi": {{
          "values": "any"
        }}
      }}
    }}
  }}
"#
    )
}
