//! Scripted remote executor.

use std::sync::Mutex;

use edgeproof_core::exec::RemoteExecutor;
use edgeproof_core::types::{ExecOutput, ExecutionTarget};

/// Answers by command keyword. The last scripted answer repeats.
/// A command containing the panic keyword panics inside the scenario task.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<Vec<(String, Vec<ExecOutput>)>>,
    panic_on: Option<String>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, keyword: &str, outputs: Vec<ExecOutput>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .push((keyword.to_owned(), outputs));
        self
    }

    pub fn ok(self, keyword: &str, output: &str) -> Self {
        self.on(keyword, vec![ExecOutput::success(output)])
    }

    /// Overrides an earlier script for the same keyword.
    pub fn failing(self, keyword: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(0, (keyword.to_owned(), vec![ExecOutput::failure("")]));
        self
    }

    pub fn panicking_on(mut self, keyword: &str) -> Self {
        self.panic_on = Some(keyword.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, keyword: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(keyword)).count()
    }
}

impl RemoteExecutor for ScriptedExecutor {
    async fn run(&self, target: &ExecutionTarget, command: &str) -> ExecOutput {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{target}: {command}"));

        if let Some(keyword) = &self.panic_on {
            if command.contains(keyword.as_str()) {
                panic!("scripted panic on '{command}'");
            }
        }

        let mut scripts = self.scripts.lock().unwrap();
        match scripts
            .iter_mut()
            .find(|(keyword, _)| command.contains(keyword.as_str()))
        {
            Some((_, outputs)) if outputs.len() > 1 => outputs.remove(0),
            Some((_, outputs)) => outputs.first().cloned().unwrap_or_default(),
            None => ExecOutput::success(""),
        }
    }
}
