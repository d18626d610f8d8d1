//! Built-in catalog: the backend tools, the complaint prompts and the
//! greeting resource
//!
//! Each tool is one row: name, title, description, route and fields. The
//! dispatcher knows nothing about individual tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{ResourcePaths, ServerConfig};
use crate::error::Result;
use crate::prompts::prompt_definitions;
use crate::registry::{Registry, RegistryBuilder};
use crate::types::{Field, ResourceTemplate, Schema, ToolDefinition, UriTemplate};

fn tool(name: &str, title: &str, description: &str, path: String) -> ToolDefinition {
    ToolDefinition::new(name, title, description, path)
}

fn paged(tool: ToolDefinition) -> ToolDefinition {
    tool.param(Field::number("limit")).param(Field::number("offset"))
}

fn required(name: &str) -> Field {
    Field::string(name).required()
}

/// Shape of a customer user record as returned by the backend
pub fn customer_user_schema() -> Schema {
    Schema::new()
        .field(required("id"))
        .field(required("email"))
        .field(required("password"))
        .field(required("firstName"))
        .field(required("lastName"))
        .field(required("phoneNumber"))
        .field(required("birthDate"))
        .field(required("role"))
        .field(Field::boolean("isActive").required())
        .field(Field::string("profileImageUrl").required().nullable())
        .field(
            Field::object(
                "preferences",
                Schema::new()
                    .field(required("language"))
                    .field(Field::boolean("newsletter").required())
                    .field(Field::boolean("notifications").required()),
            )
            .required(),
        )
        .field(
            Field::object(
                "address",
                Schema::new()
                    .field(required("city"))
                    .field(required("street"))
                    .field(required("zipCode")),
            )
            .required(),
        )
        .field(Field::number("loginCount").required())
        .field(required("lastLoginAt"))
        .field(required("lastLoginIp"))
        .field(
            Field::object(
                "metadata",
                Schema::new()
                    .field(required("source"))
                    .field(required("version")),
            )
            .required(),
        )
        .field(required("createdAt"))
        .field(required("updatedAt"))
}

/// Every backend tool, in listing order
pub fn tool_definitions(resources: &ResourcePaths) -> Vec<ToolDefinition> {
    let users = &resources.users;
    let logs = &resources.user_logs;

    vec![
        // Customers and staff
        tool(
            "fetch-user",
            "User Fetcher",
            "Get user data by ID",
            format!("/{}/{{id}}", users),
        )
        .param(required("id"))
        .output(customer_user_schema()),
        tool(
            "fetch-internal-user",
            "Internal User Fetcher",
            "Get internal user (employee) data by ID",
            "/internal-users/{id}".to_string(),
        )
        .param(required("id")),
        tool(
            "fetch-internal-user-by-employee-id",
            "Internal User Fetcher by Employee ID",
            "Get internal user by employee ID (e.g., CS-0001, DEV-0001)",
            "/internal-users/employee/{employeeId}".to_string(),
        )
        .param(required("employeeId")),
        tool(
            "fetch-all-internal-users",
            "All Internal Users Fetcher",
            "Get all internal users with optional filters (department, role)",
            "/internal-users".to_string(),
        )
        .param(Field::string("department"))
        .param(Field::string("role")),
        tool(
            "fetch-available-agents",
            "Available CS Agents Fetcher",
            "Get all available CS agents sorted by workload",
            "/internal-users/available-agents".to_string(),
        ),
        // Activity logs
        paged(
            tool(
                "fetch-user-logs",
                "User Logs Fetcher",
                "Get user logs by user ID with pagination",
                format!("/{}/user/{{userId}}", logs),
            )
            .param(required("userId")),
        ),
        tool(
            "fetch-user-log-stats",
            "User Log Statistics Fetcher",
            "Get user log statistics by user ID",
            format!("/{}/user/{{userId}}/stats", logs),
        )
        .param(required("userId")),
        paged(tool(
            "fetch-all-user-logs",
            "All User Logs Fetcher",
            "Get all user logs with pagination",
            format!("/{}", logs),
        )),
        paged(
            tool(
                "fetch-logs-by-event-type",
                "User Logs by Event Type Fetcher",
                "Get user logs by event type with pagination",
                format!("/{}/event/{{eventType}}", logs),
            )
            .param(required("eventType")),
        ),
        // Complaints
        paged(
            tool(
                "fetch-all-complaints",
                "All Complaints Fetcher",
                "Get all customer complaints with optional filters",
                "/complaints".to_string(),
            )
            .param(Field::string("category"))
            .param(Field::string("status"))
            .param(Field::string("priority"))
            .param(Field::string("assignedTo")),
        ),
        tool(
            "fetch-complaint",
            "Complaint Fetcher",
            "Get complaint by ID",
            "/complaints/{id}".to_string(),
        )
        .param(required("id")),
        tool(
            "fetch-complaint-by-ticket-number",
            "Complaint Fetcher by Ticket Number",
            "Get complaint by ticket number (e.g., CS-2025-01-00001)",
            "/complaints/ticket/{ticketNumber}".to_string(),
        )
        .param(required("ticketNumber")),
        paged(
            tool(
                "fetch-complaints-by-user",
                "User Complaints Fetcher",
                "Get complaints by user ID",
                "/complaints/user/{userId}".to_string(),
            )
            .param(required("userId")),
        ),
        paged(
            tool(
                "fetch-complaints-by-category",
                "Category Complaints Fetcher",
                "Get complaints by category (가격정보, 상품정보, 배송구매, etc.)",
                "/complaints/category/{category}".to_string(),
            )
            .param(required("category")),
        ),
        tool(
            "fetch-pending-complaints",
            "Pending Complaints Fetcher",
            "Get all pending complaints (not resolved or closed)",
            "/complaints/pending".to_string(),
        ),
        tool(
            "fetch-complaint-stats",
            "Complaint Statistics Fetcher",
            "Get complaint statistics (total, by status, by category, by priority)",
            "/complaints/stats".to_string(),
        ),
        tool(
            "fetch-complaint-responses",
            "Complaint Responses Fetcher",
            "Get all responses for a complaint",
            "/complaints/{complaintId}/responses".to_string(),
        )
        .param(required("complaintId")),
    ]
}

fn greet(vars: &BTreeMap<String, String>) -> String {
    format!("Hello, {}!", vars.get("name").map(String::as_str).unwrap_or_default())
}

pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate {
        name: "greeting".to_string(),
        title: "Greeting Resource".to_string(),
        description: "Dynamic greeting generator".to_string(),
        uri_template: UriTemplate::new("greeting://{name}"),
        mime_type: Some("text/plain".to_string()),
        render: greet,
    }]
}

/// Register the full built-in catalog and freeze it
pub fn default_registry(config: &ServerConfig) -> Result<Arc<Registry>> {
    let mut builder = RegistryBuilder::new();
    for tool in tool_definitions(&config.resources) {
        builder.register_tool(tool)?;
    }
    for prompt in prompt_definitions() {
        builder.register_prompt(prompt)?;
    }
    for resource in resource_templates() {
        builder.register_resource(resource)?;
    }
    builder.freeze()
}
