//! Scripted backend for shell tests.
//!
//! Every command answers with the last reply set for it; anything
//! unscripted is rejected, so a test fails loudly when the shell issues a
//! call nobody expected.

use async_trait::async_trait;
use huevo_client::{ClientError, ClientResult, CommandClient, CommandTransport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    replies: HashMap<String, Value>,
    failures: HashMap<String, String>,
    calls: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> CommandClient {
        CommandClient::new(Arc::new(self.clone()))
    }

    pub fn reply(&self, command: &str, value: Value) {
        let mut script = self.script.lock().unwrap();
        script.failures.remove(command);
        script.replies.insert(command.to_string(), value);
    }

    pub fn fail(&self, command: &str, message: &str) {
        self.script
            .lock()
            .unwrap()
            .failures
            .insert(command.to_string(), message.to_string());
    }

    /// Arguments of every call to `command`, oldest first.
    pub fn calls_to(&self, command: &str) -> Vec<Value> {
        self.script
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(name, _)| name == command)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }
}

#[async_trait]
impl CommandTransport for ScriptedBackend {
    async fn invoke(&self, command: &str, args: Value) -> ClientResult<Value> {
        let mut script = self.script.lock().unwrap();
        script.calls.push((command.to_string(), args));

        if let Some(message) = script.failures.get(command) {
            return Err(ClientError::Rejected {
                command: command.to_string(),
                message: message.clone(),
            });
        }
        script
            .replies
            .get(command)
            .cloned()
            .ok_or_else(|| ClientError::Rejected {
                command: command.to_string(),
                message: format!("sin respuesta para {command}"),
            })
    }
}
