use crate::recognizer_trait::SpeechRecognizer;
use audiomatch_core::RecognizerError;
use std::collections::HashMap;

pub struct PluginRegistry {
    factories: HashMap<String, fn() -> Box<dyn SpeechRecognizer>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("google", || {
            Box::new(crate::google::GoogleRecognizer::new())
        });
        registry.register("scripted", || {
            Box::new(crate::scripted::ScriptedRecognizer::new())
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn SpeechRecognizer>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn SpeechRecognizer>, RecognizerError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| RecognizerError::EngineNotFound(name.to_string()))
    }

    pub fn list_engines(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
