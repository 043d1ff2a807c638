// Record tools: list, search, and CRUD on individual records

use crate::progress::Progress;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_number, json_schema_object, json_schema_string, text_result, Tool};
use airtable_api::AirtableClient;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;

/// Tool to list records in a table
pub struct ListRecordsTool {
    client: Arc<AirtableClient>,
}

impl ListRecordsTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListRecordsArgs {
    base_id: String,
    table_name: String,
    #[serde(default)]
    max_records: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_records".to_string(),
            description: "List records in a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the table"),
                    "max_records": json_schema_number("Maximum number of records to return"),
                }),
                vec!["base_id", "table_name"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: ListRecordsArgs =
            serde_json::from_value(arguments).context("Invalid arguments for list_records")?;

        let records = self
            .client
            .list_records(&args.base_id, &args.table_name, args.max_records)
            .await?;
        text_result(&records)
    }
}

/// Tool to create a record in a table
pub struct CreateRecordTool {
    client: Arc<AirtableClient>,
}

impl CreateRecordTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateRecordArgs {
    base_id: String,
    table_name: String,
    fields: serde_json::Map<String, serde_json::Value>,
}

#[async_trait::async_trait]
impl Tool for CreateRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_record".to_string(),
            description: "Create a new record in a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the table"),
                    "fields": {
                        "type": "object",
                        "description": "Record fields as key-value pairs"
                    },
                }),
                vec!["base_id", "table_name", "fields"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress,
    ) -> Result<CallToolResult> {
        let args: CreateRecordArgs =
            serde_json::from_value(arguments).context("Invalid arguments for create_record")?;

        progress.send(0, "Creating record");
        let record = self
            .client
            .create_record(&args.base_id, &args.table_name, &args.fields)
            .await?;
        progress.send(100, "Record created");

        text_result(&record)
    }
}

/// Tool to update an existing record
pub struct UpdateRecordTool {
    client: Arc<AirtableClient>,
}

impl UpdateRecordTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateRecordArgs {
    base_id: String,
    table_name: String,
    record_id: String,
    fields: serde_json::Map<String, serde_json::Value>,
}

#[async_trait::async_trait]
impl Tool for UpdateRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_record".to_string(),
            description: "Update an existing record in a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the table"),
                    "record_id": json_schema_string("ID of the record to update"),
                    "fields": {
                        "type": "object",
                        "description": "Record fields to update as key-value pairs"
                    },
                }),
                vec!["base_id", "table_name", "record_id", "fields"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress,
    ) -> Result<CallToolResult> {
        let args: UpdateRecordArgs =
            serde_json::from_value(arguments).context("Invalid arguments for update_record")?;

        progress.send(0, "Updating record");
        let record = self
            .client
            .update_record(&args.base_id, &args.table_name, &args.record_id, &args.fields)
            .await?;
        progress.send(100, "Record updated");

        text_result(&record)
    }
}

/// Tool to delete a record
pub struct DeleteRecordTool {
    client: Arc<AirtableClient>,
}

impl DeleteRecordTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteRecordArgs {
    base_id: String,
    table_name: String,
    record_id: String,
}

#[async_trait::async_trait]
impl Tool for DeleteRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "delete_record".to_string(),
            description: "Delete a record from a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the table"),
                    "record_id": json_schema_string("ID of the record to delete"),
                }),
                vec!["base_id", "table_name", "record_id"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: DeleteRecordArgs =
            serde_json::from_value(arguments).context("Invalid arguments for delete_record")?;

        let deleted = self
            .client
            .delete_record(&args.base_id, &args.table_name, &args.record_id)
            .await?;
        text_result(&deleted)
    }
}

/// Tool to search records by field value
pub struct SearchRecordsTool {
    client: Arc<AirtableClient>,
}

impl SearchRecordsTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchRecordsArgs {
    base_id: String,
    table_name: String,
    field_name: String,
    value: String,
}

#[async_trait::async_trait]
impl Tool for SearchRecordsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_records".to_string(),
            description: "Search for records in a table".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the table"),
                    "field_name": json_schema_string("Name of the field to search in"),
                    "value": json_schema_string("Value to search for"),
                }),
                vec!["base_id", "table_name", "field_name", "value"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: SearchRecordsArgs =
            serde_json::from_value(arguments).context("Invalid arguments for search_records")?;

        let records = self
            .client
            .search_records(&args.base_id, &args.table_name, &args.field_name, &args.value)
            .await?;
        text_result(&records)
    }
}

/// Tool to fetch a single record by id
pub struct GetRecordTool {
    client: Arc<AirtableClient>,
}

impl GetRecordTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetRecordArgs {
    base_id: String,
    table_name: String,
    record_id: String,
}

#[async_trait::async_trait]
impl Tool for GetRecordTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_record".to_string(),
            description: "Get a single record by its ID".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "base_id": json_schema_string("ID of the base"),
                    "table_name": json_schema_string("Name of the table"),
                    "record_id": json_schema_string("ID of the record to retrieve"),
                }),
                vec!["base_id", "table_name", "record_id"],
            ),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _progress: Progress,
    ) -> Result<CallToolResult> {
        let args: GetRecordArgs =
            serde_json::from_value(arguments).context("Invalid arguments for get_record")?;

        let record = self
            .client
            .get_record(&args.base_id, &args.table_name, &args.record_id)
            .await?;
        text_result(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airtable_api::RetryConfig;
    use serde_json::json;
    use tokio::sync::mpsc;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Arc<AirtableClient> {
        Arc::new(
            AirtableClient::builder()
                .base_url(server.uri())
                .api_key("pat-test-key")
                .retry_config(RetryConfig::no_retry())
                .build()
                .unwrap(),
        )
    }

    fn record_body() -> serde_json::Value {
        json!({
            "id": "rec123",
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": {"Name": "Test Record", "Status": "Active"}
        })
    }

    #[tokio::test]
    async fn test_create_record_emits_progress_bookends() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app123/Tasks"))
            .and(body_partial_json(json!({"fields": {"Name": "Test Record"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_body()))
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let progress = Progress::new(Some(json!("job-1")), tx);

        let tool = CreateRecordTool::new(client(&server));
        let result = tool
            .execute(
                json!({
                    "base_id": "app123",
                    "table_name": "Tasks",
                    "fields": {"Name": "Test Record"}
                }),
                progress,
            )
            .await
            .unwrap();
        assert!(result.is_error.is_none());

        let first: serde_json::Value =
            serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(first["params"]["progress"], json!(0));
        let second: serde_json::Value =
            serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(second["params"]["progress"], json!(100));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_record_without_token_stays_silent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/app123/Tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_body()))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let tool = CreateRecordTool::new(client(&server));
        tool.execute(
            json!({
                "base_id": "app123",
                "table_name": "Tasks",
                "fields": {"Name": "Test Record"}
            }),
            Progress::new(None, tx),
        )
        .await
        .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_search_records_filters_by_field_value() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/app123/Tasks"))
            .and(query_param("filterByFormula", "{Status} = \"Active\""))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"records": [record_body()]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = SearchRecordsTool::new(client(&server));
        let result = tool
            .execute(
                json!({
                    "base_id": "app123",
                    "table_name": "Tasks",
                    "field_name": "Status",
                    "value": "Active"
                }),
                Progress::disabled(),
            )
            .await
            .unwrap();

        let crate::protocol::ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("rec123"));
    }

    #[tokio::test]
    async fn test_delete_record_reports_acknowledgement() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/app123/Tasks/rec123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "rec123", "deleted": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = DeleteRecordTool::new(client(&server));
        let result = tool
            .execute(
                json!({
                    "base_id": "app123",
                    "table_name": "Tasks",
                    "record_id": "rec123"
                }),
                Progress::disabled(),
            )
            .await
            .unwrap();

        let crate::protocol::ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("\"deleted\": true"));
    }

    #[tokio::test]
    async fn test_remote_failure_propagates_status_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/app123/Tasks/rec404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"type": "NOT_FOUND", "message": "Record not found"}
            })))
            .mount(&server)
            .await;

        let tool = GetRecordTool::new(client(&server));
        let error = tool
            .execute(
                json!({
                    "base_id": "app123",
                    "table_name": "Tasks",
                    "record_id": "rec404"
                }),
                Progress::disabled(),
            )
            .await
            .unwrap_err();

        let message = format!("{error:#}");
        assert!(message.contains("404"));
        assert!(message.contains("Record not found"));
    }
}
