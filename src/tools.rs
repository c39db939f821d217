//! Capability table exposed to the agent layer
//!
//! Each operation is registered once at startup under a stable name with a
//! JSON schema for its input and output. Callers discover tools with
//! [`ToolRegistry::list`] and run them with [`ToolRegistry::invoke`].

use crate::catalog::{render_format, supported_muscles};
use crate::error::ScrapeError;
use crate::orchestrator::{PageLauncher, QueryOrchestrator};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

pub const GET_SUPPORTED_MUSCLES: &str = "get_supported_muscles";
pub const GET_EXERCISES_BY_MUSCLE: &str = "get_exercises_by_muscle";
pub const GET_FORMAT: &str = "get_format";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ToolHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub output_schema: Value,
    handler: ToolHandler,
}

impl ToolSpec {
    pub fn new(
        name: &'static str,
        description: &'static str,
        input_schema: Value,
        output_schema: Value,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            description,
            input_schema,
            output_schema,
            handler,
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
        }
    }
}

/// Serializable view of a registered tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ExercisesArgs {
    muscle: String,
    gender: String,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool with the same name
    pub fn register(&mut self, spec: ToolSpec) {
        if self.tools.insert(spec.name, spec).is_some() {
            log::warn!("Tool registered twice; keeping the latest");
        }
    }

    /// The three fitness tools backed by `orchestrator`
    pub fn with_fitness_tools<L: PageLauncher>(orchestrator: Arc<QueryOrchestrator<L>>) -> Self {
        let mut registry = Self::new();

        registry.register(ToolSpec::new(
            GET_SUPPORTED_MUSCLES,
            "Return a list of supported muscle names for training video search.",
            empty_input_schema(),
            json!({ "type": "array", "items": { "type": "string" } }),
            handler(|_args| async { Ok::<Value, ToolError>(json!(supported_muscles())) }),
        ));

        registry.register(ToolSpec::new(
            GET_EXERCISES_BY_MUSCLE,
            "Return a list of exercises (with video URLs) for a specific muscle and gender.",
            json!({
                "type": "object",
                "properties": {
                    "muscle": { "type": "string" },
                    "gender": { "type": "string" }
                },
                "required": ["muscle", "gender"]
            }),
            exercises_output_schema(),
            handler(move |args| {
                let orchestrator = Arc::clone(&orchestrator);
                async move {
                    let args: ExercisesArgs = serde_json::from_value(args)
                        .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
                    let result = orchestrator.fetch_exercises(&args.muscle, &args.gender).await?;
                    Ok::<Value, ToolError>(serde_json::to_value(result)?)
                }
            }),
        ));

        registry.register(ToolSpec::new(
            GET_FORMAT,
            "Return the JSON output format",
            empty_input_schema(),
            json!({ "type": "object", "required": ["render"] }),
            handler(|_args| async { Ok::<Value, ToolError>(render_format()) }),
        ));

        registry
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors for every tool, sorted by name
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(ToolSpec::descriptor).collect()
    }

    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let spec = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        log::info!("Invoking tool {}", name);
        (spec.handler)(args).await
    }
}

fn handler<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

fn empty_input_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn exercises_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "muscle": { "type": "string" },
            "exercises": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "sideUrl": { "type": "string" },
                        "frontUrl": { "type": "string" },
                        "notes": { "type": "string" },
                        "tips": { "type": "string" }
                    },
                    "required": ["name", "sideUrl", "frontUrl", "notes", "tips"]
                }
            }
        },
        "required": ["muscle", "exercises"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserError;
    use crate::collector::{CollectorConfig, LazyPage};
    use std::time::Duration;

    struct OnePage(Vec<String>);

    impl LazyPage for OnePage {
        fn video_sources(&self) -> Result<Vec<String>, BrowserError> {
            Ok(self.0.clone())
        }
        fn scroll_by(&self, _pixels: u32) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    struct OnePageLauncher;

    impl PageLauncher for OnePageLauncher {
        type Page = OnePage;

        fn open(&self, url: &str) -> Result<OnePage, BrowserError> {
            if url.contains("/male/") {
                Ok(OnePage(vec![
                    "https://cdn.test/male-bodyweight-push-up-side.mp4".to_string(),
                    "https://cdn.test/male-bodyweight-push-up-front.mp4".to_string(),
                ]))
            } else {
                Err(BrowserError::InitializationError("no chrome".to_string()))
            }
        }
    }

    fn registry() -> ToolRegistry {
        let orchestrator = QueryOrchestrator::new(
            OnePageLauncher,
            CollectorConfig {
                settle_delay: Duration::ZERO,
                ..CollectorConfig::default()
            },
            "https://catalog.test",
        );
        ToolRegistry::with_fitness_tools(Arc::new(orchestrator))
    }

    #[test]
    fn test_registry_lists_tools() {
        let registry = registry();
        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["get_exercises_by_muscle", "get_format", "get_supported_muscles"]
        );
        let spec = registry.get(GET_EXERCISES_BY_MUSCLE).unwrap();
        assert_eq!(spec.input_schema["required"], json!(["muscle", "gender"]));
    }

    #[tokio::test]
    async fn test_invoke_supported_muscles() {
        let value = registry().invoke(GET_SUPPORTED_MUSCLES, json!({})).await.unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(14));
    }

    #[tokio::test]
    async fn test_invoke_exercises() {
        let value = registry()
            .invoke(GET_EXERCISES_BY_MUSCLE, json!({ "muscle": "Chest", "gender": "Male" }))
            .await
            .unwrap();

        assert_eq!(value["muscle"], "Chest");
        assert_eq!(value["exercises"][0]["name"], "Push Up");
        assert_eq!(
            value["exercises"][0]["frontUrl"],
            "https://cdn.test/male-bodyweight-push-up-front.mp4"
        );
    }

    #[tokio::test]
    async fn test_invoke_errors() {
        let registry = registry();

        let err = registry.invoke("get_weather", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));

        let err = registry
            .invoke(GET_EXERCISES_BY_MUSCLE, json!({ "muscle": "Chest" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = registry
            .invoke(GET_EXERCISES_BY_MUSCLE, json!({ "muscle": "Chest", "gender": "female" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Scrape(_)));
    }

    #[tokio::test]
    async fn test_invoke_format() {
        let value = registry().invoke(GET_FORMAT, Value::Null).await.unwrap();
        assert!(value["render"].is_array());
    }
}
