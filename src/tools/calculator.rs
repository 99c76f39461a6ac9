//! Math expression evaluation tool.
//!
//! Evaluates expressions with fasteval, which resolves only its built-in
//! math functions. No variable or name lookup is wired in, so the evaluation
//! namespace cannot reach program state.

use fasteval::ez_eval;
use serde::Deserialize;
use serde_json::{json, Value};

/// Longest accepted expression, in bytes.
const MAX_EXPRESSION_LEN: usize = 1000;

/// Arguments for the calculator tool.
#[derive(Debug, Deserialize)]
struct CalculatorArgs {
    /// Expression to evaluate.
    expression: String,
}

/// Evaluate a math expression and return a JSON payload.
///
/// All faults, including malformed arguments, come back as
/// `{"error": ...}` so the model can retry with a corrected call.
pub fn run(args: &Value) -> String {
    let args: CalculatorArgs = match serde_json::from_value(args.clone()) {
        Ok(args) => args,
        Err(e) => return json!({"error": format!("Invalid arguments: {}", e)}).to_string(),
    };

    if args.expression.is_empty() {
        return json!({"error": "Calculation failed: expression cannot be empty"}).to_string();
    }
    if args.expression.len() > MAX_EXPRESSION_LEN {
        return json!({
            "error": format!(
                "Calculation failed: expression is too long (max {} characters)",
                MAX_EXPRESSION_LEN
            )
        })
        .to_string();
    }

    // Empty namespace: fasteval falls back to its built-in math functions
    // (sin, cos, sqrt, log, pi(), e(), ...) and nothing else.
    let mut namespace = |_name: &str, _args: Vec<f64>| -> Option<f64> { None };

    match ez_eval(&args.expression, &mut namespace) {
        Ok(result) if result.is_nan() => json!({"result": "NaN"}).to_string(),
        Ok(result) if result.is_infinite() => {
            let formatted = if result.is_sign_positive() {
                "Infinity"
            } else {
                "-Infinity"
            };
            json!({"result": formatted}).to_string()
        }
        Ok(result) => json!({"result": result}).to_string(),
        Err(e) => json!({"error": format!("Calculation failed: {}", e)}).to_string(),
    }
}
