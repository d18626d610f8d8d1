//! Prompt rendering
//!
//! Prompts never call the backend. They validate their arguments with the
//! same validator tools use, fill declared defaults, then expand a template
//! into one instructional message.

mod catalog;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{JunggoError, Result};
use crate::registry::Registry;
use crate::types::{PromptScript, ResolvedArguments, ResultEnvelope, Schema, StepLine, StepStyle};
use crate::validate::validate;

pub use catalog::prompt_definitions;

/// Output of a prompt render, ready to be sent as a single user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub name: String,
    pub description: String,
    pub text: String,
    /// Tools the rendered text tells the agent to call, in order
    pub tools: Vec<String>,
}

impl RenderedPrompt {
    /// Guidance text only; prompts carry no structured payload
    pub fn into_envelope(self) -> ResultEnvelope {
        ResultEnvelope::guidance(self.text)
    }
}

/// Renders registered prompts
#[derive(Clone)]
pub struct PromptOrchestrator {
    registry: Arc<Registry>,
}

impl PromptOrchestrator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn render(&self, name: &str, raw_arguments: &Value) -> Result<RenderedPrompt> {
        let prompt = self.registry.prompt(name)?;
        let mut args =
            validate(&prompt.args_schema, raw_arguments).map_err(JunggoError::InvalidArguments)?;
        apply_defaults(&prompt.args_schema, &mut args);

        let script = (prompt.template)(&args);
        debug!(prompt = name, steps = script.steps.len(), "prompt rendered");

        Ok(RenderedPrompt {
            name: prompt.name.clone(),
            description: prompt.description.clone(),
            tools: referenced_tools(&script),
            text: join_script(&script),
        })
    }
}

fn apply_defaults(schema: &Schema, args: &mut ResolvedArguments) {
    for field in schema.fields() {
        if let Some(default) = &field.default {
            if !args.contains(&field.name) {
                args.insert(field.name.clone(), default.clone());
            }
        }
    }
}

fn referenced_tools(script: &PromptScript) -> Vec<String> {
    let mut tools: Vec<String> = Vec::new();
    for tool in script.steps.iter().flat_map(|s| s.tools.iter()) {
        if !tools.contains(tool) {
            tools.push(tool.clone());
        }
    }
    tools
}

/// Intro, numbered step headings with their lines, then the closing
fn join_script(script: &PromptScript) -> String {
    let mut out = String::new();
    out.push_str(&script.intro);
    for (i, step) in script.steps.iter().enumerate() {
        let heading = match script.style {
            StepStyle::Stage => format!("\n\n## {}단계: {}", i + 1, step.heading),
            StepStyle::Numbered => format!("\n\n### {}. {}", i + 1, step.heading),
        };
        out.push_str(&heading);
        for (j, line) in step.lines.iter().enumerate() {
            match line {
                StepLine::Bullet(text) => {
                    out.push_str("\n- ");
                    out.push_str(text);
                }
                StepLine::Text(text) => {
                    out.push_str(if j == 0 { "\n" } else { "\n\n" });
                    out.push_str(text);
                }
            }
        }
    }
    if !script.closing.is_empty() {
        out.push_str("\n\n");
        out.push_str(&script.closing);
    }
    out
}
