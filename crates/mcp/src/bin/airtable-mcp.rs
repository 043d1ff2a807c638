// Standalone MCP server binary

use airtable_mcp::config::ServerConfig;
use airtable_mcp::server::McpServer;
use airtable_mcp::tools::*;
use airtable_api::{AirtableClient, AIRTABLE_API_URL};
use anyhow::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing API key is fatal before anything else starts.
    let config = ServerConfig::from_env()?;

    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Airtable MCP server starting...");

    let client = Arc::new(
        AirtableClient::builder()
            .base_url(AIRTABLE_API_URL)
            .api_key(config.api_key)
            .build()?,
    );

    let mut registry = ToolRegistry::new();

    // Schema tools
    registry.register(Arc::new(ListBasesTool::new(client.clone())));
    registry.register(Arc::new(ListTablesTool::new(client.clone())));
    registry.register(Arc::new(CreateTableTool::new(client.clone())));
    registry.register(Arc::new(UpdateTableTool::new(client.clone())));
    registry.register(Arc::new(CreateFieldTool::new(client.clone())));
    registry.register(Arc::new(UpdateFieldTool::new(client.clone())));

    // Record tools
    registry.register(Arc::new(ListRecordsTool::new(client.clone())));
    registry.register(Arc::new(CreateRecordTool::new(client.clone())));
    registry.register(Arc::new(UpdateRecordTool::new(client.clone())));
    registry.register(Arc::new(DeleteRecordTool::new(client.clone())));
    registry.register(Arc::new(SearchRecordsTool::new(client.clone())));
    registry.register(Arc::new(GetRecordTool::new(client)));

    tracing::info!("Registered {} tools", registry.list_schemas().len());

    let server = McpServer::new(registry);
    server.run().await
}
