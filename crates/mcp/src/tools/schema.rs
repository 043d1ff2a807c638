// Schema tools: bases, tables, and fields

use crate::progress::Progress;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_array, json_schema_object, json_schema_string, text_result, Tool,
};
use airtable_api::{AirtableClient, CreateTableRequest, FieldSpec, FieldUpdate, UpdateTableRequest};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;

fn field_spec_schema() -> serde_json::Value {
    json_schema_object(
        serde_json::json!({
            "name": json_schema_string("Name of the field"),
            "type": json_schema_string(
                "Type of the field (e.g., singleLineText, multilineText, number, etc.)"
            ),
            "description": json_schema_string("Description of the field"),
            "options": {
                "type": "object",
                "description": "Field-specific options"
            }
        }),
        vec!["name", "type"],
    )
}

/// Tool to list all bases the token can access
pub struct ListBasesTool {
    client: Arc<AirtableClient>,
}

impl ListBasesTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ListBasesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_bases".to_string(),
            description: "List all accessible Airtable bases".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
        }
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let bases = self.client.list_bases().await?;
        text_result(&bases)
    }
}

/// Tool to list the tables of a base
pub struct ListTablesTool {
    client: Arc<AirtableClient>,
}

impl ListTablesTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListTablesArgs {
    base_id: String,
}

#[async_trait::async_trait]
impl Tool for ListTablesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_tables".to_string(),
            description: "List all tables in a base".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                }),
                vec!["base_id"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: ListTablesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for list_tables")?;

        let tables = self.client.list_tables(&args.base_id).await?;
        text_result(&tables)
    }
}

/// Tool to create a table in a base
pub struct CreateTableTool {
    client: Arc<AirtableClient>,
}

impl CreateTableTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateTableArgs {
    base_id: String,
    table_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: Option<Vec<FieldSpec>>,
}

#[async_trait::async_trait]
impl Tool for CreateTableTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_table".to_string(),
            description: "Create a new table in a base".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the new table"),
                    "description": json_schema_string("Description of the table"),
                    "fields": json_schema_array(
                        field_spec_schema(),
                        "Initial fields for the table"
                    ),
                }),
                vec!["base_id", "table_name"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress,
    ) -> Result<CallToolResult> {
        let args: CreateTableArgs =
            serde_json::from_value(arguments).context("Invalid arguments for create_table")?;

        progress.send(0, "Creating table");

        let request = CreateTableRequest {
            name: args.table_name,
            description: args.description,
            fields: args
                .fields
                .map(|fields| fields.into_iter().map(FieldSpec::normalize).collect()),
        };
        let table = self.client.create_table(&args.base_id, &request).await?;

        progress.send(100, "Table created");
        text_result(&table)
    }
}

/// Tool to update a table's name or description
pub struct UpdateTableTool {
    client: Arc<AirtableClient>,
}

impl UpdateTableTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateTableArgs {
    base_id: String,
    table_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait::async_trait]
impl Tool for UpdateTableTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_table".to_string(),
            description: "Update a table's schema".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_id": json_schema_string("ID of the table to update"),
                    "name": json_schema_string("New name for the table"),
                    "description": json_schema_string("New description for the table"),
                }),
                vec!["base_id", "table_id"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress,
    ) -> Result<CallToolResult> {
        let args: UpdateTableArgs =
            serde_json::from_value(arguments).context("Invalid arguments for update_table")?;

        progress.send(0, "Updating table");

        let request = UpdateTableRequest {
            name: args.name,
            description: args.description,
        };
        let table = self
            .client
            .update_table(&args.base_id, &args.table_id, &request)
            .await?;

        progress.send(100, "Table updated");
        text_result(&table)
    }
}

/// Tool to create a field in a table
pub struct CreateFieldTool {
    client: Arc<AirtableClient>,
}

impl CreateFieldTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateFieldArgs {
    base_id: String,
    table_id: String,
    field: FieldSpec,
}

#[async_trait::async_trait]
impl Tool for CreateFieldTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_field".to_string(),
            description: "Create a new field in a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_id": json_schema_string("ID of the table"),
                    "field": field_spec_schema(),
                }),
                vec!["base_id", "table_id", "field"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: CreateFieldArgs =
            serde_json::from_value(arguments).context("Invalid arguments for create_field")?;

        let field = args.field.normalize();
        let created = self
            .client
            .create_field(&args.base_id, &args.table_id, &field)
            .await?;
        text_result(&created)
    }
}

/// Tool to update a field in a table
pub struct UpdateFieldTool {
    client: Arc<AirtableClient>,
}

impl UpdateFieldTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateFieldArgs {
    base_id: String,
    table_id: String,
    field_id: String,
    updates: FieldUpdate,
}

#[async_trait::async_trait]
impl Tool for UpdateFieldTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_field".to_string(),
            description: "Update a field in a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_id": json_schema_string("ID of the table"),
                    "field_id": json_schema_string("ID of the field to update"),
                    "updates": json_schema_object(
                        serde_json::json!({
                            "name": json_schema_string("New name for the field"),
                            "description": json_schema_string("New description for the field"),
                            "options": {
                                "type": "object",
                                "description": "New field-specific options"
                            }
                        }),
                        vec![]
                    ),
                }),
                vec!["base_id", "table_id", "field_id", "updates"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: UpdateFieldArgs =
            serde_json::from_value(arguments).context("Invalid arguments for update_field")?;

        let updates = args.updates.normalize();
        let updated = self
            .client
            .update_field(&args.base_id, &args.table_id, &args.field_id, &updates)
            .await?;
        text_result(&updated)
    }
}
