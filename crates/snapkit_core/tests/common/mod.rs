#![allow(dead_code)]

use snapkit_core::store::StoreResult;
use snapkit_core::{ConfdbSchema, ConfdbSchemaStore, Console, Editor, EditorError};
use std::cell::Cell;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Store returning a fixed list and counting queries.
#[derive(Default)]
pub struct FakeStore {
    pub schemas: Vec<ConfdbSchema>,
    pub queries: Cell<usize>,
}

impl FakeStore {
    pub fn with(schemas: Vec<ConfdbSchema>) -> Self {
        Self {
            schemas,
            queries: Cell::new(0),
        }
    }
}

impl ConfdbSchemaStore for FakeStore {
    fn get_confdb_schemas(&self, name: Option<&str>) -> StoreResult<Vec<ConfdbSchema>> {
        self.queries.set(self.queries.get() + 1);
        Ok(self
            .schemas
            .iter()
            .filter(|schema| name.map_or(true, |name| schema.name == name))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingConsole {
    pub messages: Vec<String>,
    pub progress: Vec<(String, bool)>,
    pub questions: Vec<String>,
    pub answers: VecDeque<bool>,
}

impl RecordingConsole {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl Console for RecordingConsole {
    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn progress(&mut self, text: &str, permanent: bool) {
        self.progress.push((text.to_string(), permanent));
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

pub enum EditAction {
    Keep,
    Write(String),
    Fail,
}

/// Editor replaying one action per invocation; records what it was shown.
#[derive(Default)]
pub struct ScriptedEditor {
    pub actions: VecDeque<EditAction>,
    pub seen: Vec<String>,
}

impl ScriptedEditor {
    pub fn new(actions: Vec<EditAction>) -> Self {
        Self {
            actions: actions.into(),
            seen: Vec::new(),
        }
    }
}

impl Editor for ScriptedEditor {
    fn edit(&mut self, path: &Path) -> Result<(), EditorError> {
        self.seen.push(fs::read_to_string(path).unwrap());
        match self.actions.pop_front().unwrap_or(EditAction::Keep) {
            EditAction::Keep => Ok(()),
            EditAction::Write(text) => {
                fs::write(path, text).unwrap();
                Ok(())
            }
            EditAction::Fail => Err(EditorError::Failed {
                program: "scripted".to_string(),
                code: Some(1),
            }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn schema(account_id: &str, name: &str, revision: u32, timestamp: &str) -> ConfdbSchema {
    ConfdbSchema {
        account_id: account_id.to_string(),
        authority_id: Some(account_id.to_string()),
        name: name.to_string(),
        revision,
        timestamp: timestamp.to_string(),
        summary: None,
        views: serde_yaml::from_str(
            "wifi-setup:\n  rules:\n    - request: ssids\n      storage: wifi.ssids\n",
        )
        .unwrap(),
        body: None,
        sign_key_sha3_384: Some("signing-key".to_string()),
    }
}

pub fn dir_is_empty(path: &Path) -> bool {
    fs::read_dir(path).unwrap().next().is_none()
}
