//! The fixed set of local functions the model may call.
//!
//! The registry is closed: every tool is a variant of [`BuiltinTool`] and maps to a
//! pure function from arguments to a JSON result. Nothing is loaded at runtime.
use serde_json::{json, Value};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolCall};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum BuiltinTool {
    GetWeather,
    Calculate,
}

impl BuiltinTool {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinTool::GetWeather => "get_weather",
            BuiltinTool::Calculate => "calculate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|tool| tool.name() == name)
    }

    pub fn descriptor(&self) -> Tool {
        match self {
            BuiltinTool::GetWeather => Tool::new(
                self.name(),
                "Get the current weather for a location",
                json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "The city name, e.g. Paris"
                        },
                        "unit": {
                            "type": "string",
                            "enum": ["celsius", "fahrenheit"],
                            "description": "Temperature unit"
                        }
                    },
                    "required": ["location"]
                }),
            ),
            BuiltinTool::Calculate => Tool::new(
                self.name(),
                "Evaluate an arithmetic expression using + - * / and parentheses",
                json!({
                    "type": "object",
                    "properties": {
                        "expression": {
                            "type": "string",
                            "description": "The expression to evaluate, e.g. (2 + 3) * 4"
                        }
                    },
                    "required": ["expression"]
                }),
            ),
        }
    }

    pub fn run(&self, arguments: &Value) -> ToolResult<Value> {
        match self {
            BuiltinTool::GetWeather => get_weather(arguments),
            BuiltinTool::Calculate => calculate(arguments),
        }
    }
}

/// Descriptors for every builtin tool, in a stable order
pub fn registry() -> Vec<Tool> {
    BuiltinTool::iter().map(|tool| tool.descriptor()).collect()
}

/// Run a tool call and return its JSON result.
///
/// This never fails: unknown names and malformed arguments come back as
/// `{"error": "..."}` so the model can read what went wrong.
pub fn execute_tool_call(call: &ToolCall) -> Value {
    match dispatch(call) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(tool = %call.name, id = %call.id, "tool call failed: {}", e);
            json!({ "error": e.to_string() })
        }
    }
}

fn dispatch(call: &ToolCall) -> ToolResult<Value> {
    let tool = BuiltinTool::from_name(&call.name)
        .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
    let arguments = call
        .parsed_arguments()
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    tool.run(&arguments)
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> ToolResult<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing string field '{}'", key)))
}

fn get_weather(arguments: &Value) -> ToolResult<Value> {
    let location = required_str(arguments, "location")?;
    let unit = arguments
        .get("unit")
        .and_then(Value::as_str)
        .unwrap_or("celsius");

    let temperature = match unit {
        "celsius" => 22,
        "fahrenheit" => 72,
        other => {
            return Err(ToolError::InvalidArguments(format!(
                "unsupported unit '{}'",
                other
            )))
        }
    };

    Ok(json!({
        "location": location,
        "temperature": temperature,
        "unit": unit,
        "condition": "Sunny",
    }))
}

/// Longest expression handed to the evaluator
const MAX_EXPRESSION_LEN: usize = 256;
/// Deepest parenthesis nesting handed to the evaluator
const MAX_NESTING: usize = 32;

fn calculate(arguments: &Value) -> ToolResult<Value> {
    let expression = required_str(arguments, "expression")?;
    check_expression(expression)?;

    let result = evalexpr::eval_float(&float_literals(expression))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    if !result.is_finite() {
        return Err(ToolError::ExecutionError(
            "division by zero or overflow".to_string(),
        ));
    }

    Ok(json!({
        "expression": expression,
        "result": result,
    }))
}

/// Only plain arithmetic reaches the evaluator, and only expressions small enough
/// to evaluate without deep recursion.
fn check_expression(expression: &str) -> ToolResult<()> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(ToolError::InvalidArguments(format!(
            "expression longer than {} characters",
            MAX_EXPRESSION_LEN
        )));
    }

    let mut depth = 0usize;
    for c in expression.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ToolError::InvalidArguments(format!(
                        "parentheses nested deeper than {}",
                        MAX_NESTING
                    )));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            '+' | '-' | '*' | '/' | '.' => {}
            c if c.is_ascii_digit() || c.is_whitespace() => {}
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "unexpected '{}' in expression",
                    other
                )))
            }
        }
    }
    Ok(())
}

/// Rewrite integer literals as floats so `7 / 2` divides like a calculator
fn float_literals(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len() + 8);
    let mut literal = String::new();
    for c in expression.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() || c == '.' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            out.push_str(&literal);
            if !literal.contains('.') {
                out.push_str(".0");
            }
            literal.clear();
        }
        out.push(c);
    }
    out.pop();
    out
}
