pub mod google;
pub mod recognizer_trait;
pub mod registry;
pub mod scripted;

pub use google::GoogleRecognizer;
pub use recognizer_trait::SpeechRecognizer;
pub use registry::PluginRegistry;
pub use scripted::ScriptedRecognizer;
