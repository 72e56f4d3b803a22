//! Confdb schema assertion kind.

use crate::model::confdb_schema::{confdb_schema_template, ConfdbSchema, EditableConfdbSchema};
use crate::service::assertion_service::{AssertionError, AssertionKind, NormalizedAssertions};
use crate::store::confdb_schema_store::ConfdbSchemaStore;
use serde_json::Value;

const CONFDB_SCHEMA_HEADERS: [&str; 4] = ["Account-ID", "Name", "Revision", "When"];

/// Confdb schema capabilities backed by a store.
pub struct ConfdbSchemas<S> {
    store: S,
}

impl<S: ConfdbSchemaStore> ConfdbSchemas<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ConfdbSchemaStore> AssertionKind for ConfdbSchemas<S> {
    type Assertion = ConfdbSchema;
    type Editable = EditableConfdbSchema;

    fn assertion_name(&self) -> &'static str {
        "confdb schema"
    }

    fn get_assertions(&self, name: Option<&str>) -> Result<Vec<ConfdbSchema>, AssertionError> {
        Ok(self.store.get_confdb_schemas(name)?)
    }

    fn normalize_assertions(&self, assertions: &[ConfdbSchema]) -> NormalizedAssertions {
        NormalizedAssertions {
            headers: CONFDB_SCHEMA_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: assertions
                .iter()
                .map(|schema| {
                    vec![
                        Value::from(schema.account_id.as_str()),
                        Value::from(schema.name.as_str()),
                        Value::from(schema.revision),
                        Value::from(schema.revision_date()),
                    ]
                })
                .collect(),
        }
    }

    fn generate_yaml_from_model(&self, assertion: &ConfdbSchema) -> Result<String, AssertionError> {
        EditableConfdbSchema::from_assertion(assertion)
            .to_yaml()
            .map_err(|err| AssertionError::Render(err.to_string()))
    }

    fn generate_yaml_from_template(&self, name: &str, account_id: &str) -> String {
        confdb_schema_template(name, account_id)
    }
}
