//! Tool catalog and dispatch for the executor agent.
//!
//! The catalog is a closed set of kinds, each carrying its name, description,
//! and parameter schema for model-driven selection. Dispatch always produces
//! a textual result: unknown tool names and tool faults come back as
//! `{"error": ...}` payloads so the calling loop can feed them into the
//! conversation instead of aborting.

pub mod calculator;
pub mod web_search;

use serde_json::{json, Value};

/// The closed set of tools offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Web search via DuckDuckGo.
    WebSearch,
    /// Math expression evaluation.
    Calculator,
}

impl ToolKind {
    /// All declared tools, in catalog order.
    pub const ALL: [ToolKind; 2] = [ToolKind::WebSearch, ToolKind::Calculator];

    /// The wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::WebSearch => "web_search",
            ToolKind::Calculator => "calculator",
        }
    }

    /// Resolve a wire name to a tool kind.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Natural-language description steering model selection.
    pub fn description(self) -> &'static str {
        match self {
            ToolKind::WebSearch => {
                "Search the web for current information. Use this when you need \
                 up-to-date facts, statistics, or information not in your training data."
            }
            ToolKind::Calculator => {
                "Evaluate a mathematical expression. Use this for calculations, \
                 math operations, and numeric processing. Supports basic operators \
                 (+, -, *, /, ^, %) and math functions (sin, cos, sqrt, log, etc.)."
            }
        }
    }

    /// JSON schema of the tool's parameters.
    pub fn parameters_schema(self) -> Value {
        match self {
            ToolKind::WebSearch => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 5)",
                        "default": 5
                    }
                },
                "required": ["query"]
            }),
            ToolKind::Calculator => json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "Mathematical expression to evaluate (e.g., '2 + 2', 'sqrt(16)', 'sin(pi()/2)')"
                    }
                },
                "required": ["expression"]
            }),
        }
    }
}

/// Render the full tool catalog in OpenAI function-calling format.
pub fn catalog_schema() -> Value {
    let tools: Vec<Value> = ToolKind::ALL
        .into_iter()
        .map(|kind| {
            json!({
                "type": "function",
                "function": {
                    "name": kind.name(),
                    "description": kind.description(),
                    "parameters": kind.parameters_schema()
                }
            })
        })
        .collect();

    Value::Array(tools)
}

/// Resolves named tool calls to their implementations.
#[derive(Clone)]
pub struct ToolDispatch {
    http_client: reqwest::Client,
}

impl ToolDispatch {
    /// Create a dispatcher with its own HTTP client for network tools.
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Execute a named tool call and return its textual result.
    ///
    /// Never fails: unknown names and tool faults are returned as
    /// `{"error": ...}` payloads.
    pub async fn execute(&self, name: &str, args: &Value) -> String {
        tracing::debug!(tool = name, %args, "Executing tool call");
        match ToolKind::from_name(name) {
            Some(ToolKind::WebSearch) => web_search::run(&self.http_client, args).await,
            Some(ToolKind::Calculator) => calculator::run(args),
            None => json!({"error": format!("Unknown tool '{}'", name)}).to_string(),
        }
    }
}

impl Default for ToolDispatch {
    fn default() -> Self {
        Self::new()
    }
}
