//! Registry of tools, prompts and resource templates
//!
//! Built once with [`RegistryBuilder`], then frozen into an immutable
//! [`Registry`] shared behind an `Arc`. Names are unique per kind.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{JunggoError, Result};
use crate::types::{FieldKind, PromptDefinition, ResourceTemplate, Schema, ToolDefinition};

const TOOL: &str = "tool";
const PROMPT: &str = "prompt";
const RESOURCE: &str = "resource";

/// A resource template matched against a concrete URI
#[derive(Debug)]
pub struct ResourceMatch<'a> {
    pub template: &'a ResourceTemplate,
    pub variables: std::collections::BTreeMap<String, String>,
}

/// Mutable registry used during start-up
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    inner: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, checking its path placeholders against its input schema
    pub fn register_tool(&mut self, tool: ToolDefinition) -> Result<&mut Self> {
        if self.inner.tool_index.contains_key(&tool.name) {
            return Err(duplicate(TOOL, &tool.name));
        }
        check_tool(&tool)?;
        self.inner
            .tool_index
            .insert(tool.name.clone(), self.inner.tools.len());
        self.inner.tools.push(tool);
        Ok(self)
    }

    pub fn register_prompt(&mut self, prompt: PromptDefinition) -> Result<&mut Self> {
        if self.inner.prompt_index.contains_key(&prompt.name) {
            return Err(duplicate(PROMPT, &prompt.name));
        }
        check_schema(&prompt.name, &prompt.args_schema)?;
        self.inner
            .prompt_index
            .insert(prompt.name.clone(), self.inner.prompts.len());
        self.inner.prompts.push(prompt);
        Ok(self)
    }

    pub fn register_resource(&mut self, resource: ResourceTemplate) -> Result<&mut Self> {
        if self.inner.resources.iter().any(|r| r.name == resource.name) {
            return Err(duplicate(RESOURCE, &resource.name));
        }
        self.inner.resources.push(resource);
        Ok(self)
    }

    /// Finish registration; every tool a prompt references must exist
    pub fn freeze(self) -> Result<Arc<Registry>> {
        for prompt in &self.inner.prompts {
            if let Some(missing) = prompt
                .references
                .iter()
                .find(|name| !self.inner.tool_index.contains_key(*name))
            {
                return Err(JunggoError::MalformedDefinition {
                    name: prompt.name.clone(),
                    reason: format!("references unregistered tool '{}'", missing),
                });
            }
        }
        Ok(Arc::new(self.inner))
    }
}

/// Immutable, shareable registry
#[derive(Debug, Default)]
pub struct Registry {
    tools: Vec<ToolDefinition>,
    tool_index: HashMap<String, usize>,
    prompts: Vec<PromptDefinition>,
    prompt_index: HashMap<String, usize>,
    resources: Vec<ResourceTemplate>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn tool(&self, name: &str) -> Result<&ToolDefinition> {
        self.tool_index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| unknown(TOOL, name))
    }

    pub fn prompt(&self, name: &str) -> Result<&PromptDefinition> {
        self.prompt_index
            .get(name)
            .map(|&i| &self.prompts[i])
            .ok_or_else(|| unknown(PROMPT, name))
    }

    /// First registered template whose URI pattern matches `uri`
    pub fn resource_for_uri(&self, uri: &str) -> Result<ResourceMatch<'_>> {
        self.resources
            .iter()
            .find_map(|template| {
                template
                    .uri_template
                    .match_uri(uri)
                    .map(|variables| ResourceMatch {
                        template,
                        variables,
                    })
            })
            .ok_or_else(|| unknown(RESOURCE, uri))
    }

    /// Tools in registration order
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn prompts(&self) -> &[PromptDefinition] {
        &self.prompts
    }

    pub fn resource_templates(&self) -> &[ResourceTemplate] {
        &self.resources
    }
}

fn check_tool(tool: &ToolDefinition) -> Result<()> {
    check_schema(&tool.name, &tool.input_schema)?;
    if let Some(field) = tool.input_schema.fields().iter().find(|f| f.default.is_some()) {
        return Err(malformed(
            &tool.name,
            format!("tool field '{}' declares a default", field.name),
        ));
    }
    for placeholder in tool.path.placeholders() {
        match tool.input_schema.get(&placeholder) {
            Some(field) if field.required && !matches!(field.kind, FieldKind::Object(_)) => {}
            Some(_) => {
                return Err(malformed(
                    &tool.name,
                    format!("path placeholder '{}' must be a required scalar field", placeholder),
                ))
            }
            None => {
                return Err(malformed(
                    &tool.name,
                    format!("path placeholder '{}' has no input field", placeholder),
                ))
            }
        }
    }
    if let Some(output) = &tool.output_schema {
        check_schema(&tool.name, output)?;
    }
    Ok(())
}

fn check_schema(name: &str, schema: &Schema) -> Result<()> {
    match schema.duplicate_field() {
        Some(field) => Err(malformed(name, format!("field '{}' declared twice", field))),
        None => Ok(()),
    }
}

fn duplicate(kind: &'static str, name: &str) -> JunggoError {
    JunggoError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

fn unknown(kind: &'static str, name: &str) -> JunggoError {
    JunggoError::UnknownName {
        kind,
        name: name.to_string(),
    }
}

fn malformed(name: &str, reason: String) -> JunggoError {
    JunggoError::MalformedDefinition {
        name: name.to_string(),
        reason,
    }
}
