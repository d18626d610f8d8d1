//! Core types for Junggo
//!
//! Tool, prompt and resource definitions are plain data: a name, some
//! human-facing text and a [`Schema`]. Everything that acts on them
//! (validation, request building, dispatch) lives in its own module.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::Result;

/// `{name}` placeholder inside path and URI templates
pub(crate) static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

// =============================================================================
// Schema
// =============================================================================

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object(Schema),
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object(_) => "object",
        }
    }
}

/// One named parameter of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<String>,
    /// Only honored for prompt arguments; tool arguments are never defaulted
    pub default: Option<Value>,
}

impl Field {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            nullable: false,
            description: None,
            default: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, FieldKind::Object(schema))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Human-readable expected type, e.g. `string` or `string | null`
    pub fn expected(&self) -> String {
        if self.nullable {
            format!("{} | null", self.kind.type_name())
        } else {
            self.kind.type_name().to_string()
        }
    }

    /// JSON Schema fragment for this field
    pub fn json_schema(&self) -> Value {
        let mut schema = match &self.kind {
            FieldKind::Object(inner) => inner.to_json_schema(),
            kind => json!({ "type": kind.type_name() }),
        };
        if self.nullable {
            schema["type"] = json!([self.kind.type_name(), "null"]);
        }
        if let Some(description) = &self.description {
            schema["description"] = json!(description);
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// Ordered set of fields describing an object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field name declared twice, searching nested objects too
    pub fn duplicate_field(&self) -> Option<String> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Some(field.name.clone());
            }
            if let FieldKind::Object(inner) = &field.kind {
                if let Some(dup) = inner.duplicate_field() {
                    return Some(format!("{}.{}", field.name, dup));
                }
            }
        }
        None
    }

    /// Render as a JSON Schema object, the shape MCP clients expect
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.json_schema()))
            .collect();
        let required: Vec<&str> = self.required_fields().map(|f| f.name.as_str()).collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A `/`-separated path with `{name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty segments of the template, placeholders left in place
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> Vec<String> {
        PLACEHOLDER_PATTERN
            .captures_iter(&self.0)
            .map(|c| c[1].to_string())
            .collect()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resource URI template such as `greeting://{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate(String);

impl UriTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract template variables from a concrete URI, `None` when it does not match
    pub fn match_uri(&self, uri: &str) -> Option<BTreeMap<String, String>> {
        let mut pattern = String::from("^");
        let mut names = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER_PATTERN.captures_iter(&self.0) {
            let whole = caps.get(0)?;
            pattern.push_str(&regex::escape(&self.0[last..whole.start()]));
            pattern.push_str("([^/]+)");
            names.push(caps[1].to_string());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&self.0[last..]));
        pattern.push('$');

        let re = Regex::new(&pattern).ok()?;
        let caps = re.captures(uri)?;
        Some(
            names
                .into_iter()
                .enumerate()
                .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name, m.as_str().to_string())))
                .collect(),
        )
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// A callable operation backed by exactly one backend GET
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    pub input_schema: Schema,
    pub output_schema: Option<Schema>,
    pub path: PathTemplate,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: description.into(),
            input_schema: Schema::new(),
            output_schema: None,
            path: PathTemplate::new(path),
        }
    }

    pub fn param(mut self, field: Field) -> Self {
        self.input_schema = self.input_schema.field(field);
        self
    }

    pub fn output(mut self, schema: Schema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Input fields that end up in the query string, in declaration order
    pub fn query_fields(&self) -> impl Iterator<Item = &Field> {
        let placeholders = self.path.placeholders();
        self.input_schema
            .fields()
            .iter()
            .filter(move |f| !placeholders.contains(&f.name))
    }
}

/// A line inside a prompt step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepLine {
    /// Rendered as `- text`
    Bullet(String),
    /// Plain paragraph, set apart from the bullets before it
    Text(String),
}

impl StepLine {
    pub fn text(&self) -> &str {
        match self {
            StepLine::Bullet(text) | StepLine::Text(text) => text,
        }
    }
}

/// One instructional step of a rendered prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStep {
    pub heading: String,
    pub lines: Vec<StepLine>,
    /// Tool names the agent is expected to call during this step
    pub tools: Vec<String>,
}

impl PromptStep {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            lines: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(StepLine::Bullet(line.into()));
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.lines.push(StepLine::Text(text.into()));
        self
    }

    /// Add a line that tells the agent to call `tool`
    pub fn call(mut self, tool: &str, line: impl Into<String>) -> Self {
        if !self.tools.iter().any(|t| t == tool) {
            self.tools.push(tool.to_string());
        }
        self.lines.push(StepLine::Bullet(line.into()));
        self
    }
}

/// How step headings are numbered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStyle {
    /// `## 1단계: heading`
    Stage,
    /// `### 1. heading`
    Numbered,
}

/// Output of a prompt template before it is joined into one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptScript {
    pub intro: String,
    pub style: StepStyle,
    pub steps: Vec<PromptStep>,
    pub closing: String,
}

/// Pure function from resolved arguments to instructional steps
pub type PromptTemplate = fn(&ResolvedArguments) -> PromptScript;

/// A named guidance template referencing tools from the catalog
#[derive(Clone)]
pub struct PromptDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    pub args_schema: Schema,
    /// Every tool name the template may reference, checked against the registry
    pub references: Vec<String>,
    pub template: PromptTemplate,
}

/// Renders the text of a resource from its URI variables
pub type ResourceRender = fn(&BTreeMap<String, String>) -> String;

/// A read-only text resource addressed by a URI template
#[derive(Clone)]
pub struct ResourceTemplate {
    pub name: String,
    pub title: String,
    pub description: String,
    pub uri_template: UriTemplate,
    pub mime_type: Option<String>,
    pub render: ResourceRender,
}

impl fmt::Debug for PromptDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptDefinition")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("args_schema", &self.args_schema)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ResourceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceTemplate")
            .field("name", &self.name)
            .field("uri_template", &self.uri_template)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Validation results
// =============================================================================

/// Caller input after type validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedArguments {
    values: BTreeMap<String, Value>,
}

impl ResolvedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

/// Why a single parameter failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    Missing,
    TypeMismatch { actual: String },
    /// The value would make its path segment empty or a dot segment
    UnroutablePathValue { value: String },
}

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Dotted path for nested fields, e.g. `address.city`
    pub parameter: String,
    pub expected: String,
    #[serde(flatten)]
    pub reason: FailureReason,
}

impl ValidationFailure {
    pub fn new(
        parameter: impl Into<String>,
        expected: impl Into<String>,
        reason: FailureReason,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            expected: expected.into(),
            reason,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::Missing => {
                write!(f, "'{}' is required ({})", self.parameter, self.expected)
            }
            FailureReason::TypeMismatch { actual } => write!(
                f,
                "'{}' expected {}, got {}",
                self.parameter, self.expected, actual
            ),
            FailureReason::UnroutablePathValue { value } => write!(
                f,
                "'{}' cannot be used as a {}: {:?}",
                self.parameter, self.expected, value
            ),
        }
    }
}

/// JSON type name of a value as reported in validation failures
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Successful result of a tool call or prompt render
///
/// Tool envelopes always carry both the text and the structured payload;
/// prompt envelopes carry text only.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    display_text: String,
    structured_payload: Option<Value>,
}

impl ResultEnvelope {
    /// Wrap a backend payload; the text is its compact JSON serialization
    pub fn from_payload(payload: Value) -> Result<Self> {
        let display_text = serde_json::to_string(&payload)?;
        Ok(Self {
            display_text,
            structured_payload: Some(payload),
        })
    }

    pub fn guidance(text: impl Into<String>) -> Self {
        Self {
            display_text: text.into(),
            structured_payload: None,
        }
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn structured_payload(&self) -> Option<&Value> {
        self.structured_payload.as_ref()
    }

    pub fn into_parts(self) -> (String, Option<Value>) {
        (self.display_text, self.structured_payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_template_placeholders() {
        let path = PathTemplate::new("/complaints/{complaintId}/responses");
        assert_eq!(path.placeholders(), vec!["complaintId"]);
        assert_eq!(
            path.segments().collect::<Vec<_>>(),
            vec!["complaints", "{complaintId}", "responses"]
        );
    }

    #[test]
    fn test_query_fields_skip_path_params() {
        let tool = ToolDefinition::new("t", "T", "d", "/complaints/user/{userId}")
            .param(Field::string("userId").required())
            .param(Field::number("limit"))
            .param(Field::number("offset"));
        let names: Vec<_> = tool.query_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["limit", "offset"]);
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = Schema::new()
            .field(Field::string("id").required())
            .field(Field::string("profileImageUrl").nullable())
            .field(Field::object(
                "address",
                Schema::new().field(Field::string("city").required()),
            ));
        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["id"]));
        assert_eq!(
            rendered["properties"]["profileImageUrl"]["type"],
            json!(["string", "null"])
        );
        assert_eq!(
            rendered["properties"]["address"]["required"],
            json!(["city"])
        );
    }

    #[test]
    fn test_empty_schema_has_no_required_key() {
        let rendered = Schema::new().to_json_schema();
        assert!(rendered.get("required").is_none());
    }

    #[test]
    fn test_duplicate_field_detection() {
        let schema = Schema::new()
            .field(Field::string("id"))
            .field(Field::number("id"));
        assert_eq!(schema.duplicate_field(), Some("id".to_string()));

        let nested = Schema::new().field(Field::object(
            "address",
            Schema::new()
                .field(Field::string("city"))
                .field(Field::string("city")),
        ));
        assert_eq!(nested.duplicate_field(), Some("address.city".to_string()));
    }

    #[test]
    fn test_uri_template_matching() {
        let template = UriTemplate::new("greeting://{name}");
        let vars = template.match_uri("greeting://alice").unwrap();
        assert_eq!(vars.get("name").map(String::as_str), Some("alice"));
        assert!(template.match_uri("other://alice").is_none());
        assert!(template.match_uri("greeting://").is_none());
    }

    #[test]
    fn test_envelope_pairs_text_and_payload() {
        let envelope = ResultEnvelope::from_payload(json!({"id": "c-123"})).unwrap();
        assert_eq!(envelope.display_text(), r#"{"id":"c-123"}"#);
        assert_eq!(envelope.structured_payload(), Some(&json!({"id": "c-123"})));

        let null_envelope = ResultEnvelope::from_payload(Value::Null).unwrap();
        assert_eq!(null_envelope.display_text(), "null");
        assert_eq!(null_envelope.structured_payload(), Some(&Value::Null));
    }

    #[test]
    fn test_prompt_step_records_tools_once() {
        let step = PromptStep::new("Look up")
            .call("fetch-complaint", "first")
            .call("fetch-complaint", "again");
        assert_eq!(step.tools, vec!["fetch-complaint"]);
        assert_eq!(step.lines.len(), 2);
    }
}
