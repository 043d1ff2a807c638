// MCP server: JSON-RPC dispatch over stdio

use crate::progress::Progress;
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListResourcesResult, ListToolsResult, ReadResourceParams, ResourcesCapability,
    ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::resources::Resources;
use crate::tools::ToolRegistry;
use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server speaking line-delimited JSON-RPC 2.0 on stdin/stdout.
///
/// Requests are processed one at a time: a tool invocation (including its
/// retry backoff waits) completes before the next line is read. Outbound
/// messages all flow through one writer task so progress notifications stay
/// ordered ahead of their response.
pub struct McpServer {
    registry: ToolRegistry,
    resources: Resources,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_resources(registry, Resources::new(root))
    }

    pub fn with_resources(registry: ToolRegistry, resources: Resources) -> Self {
        Self {
            registry,
            resources,
        }
    }

    /// Run until stdin closes or the process receives an interrupt.
    pub async fn run(&self) -> Result<()> {
        let (outbound, mut rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(message) = rx.recv().await {
                stdout.write_all(message.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("received interrupt, shutting down");
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        None => {
                            tracing::info!("stdin closed, shutting down");
                            break;
                        }
                        Some(line) => {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            if let Some(response) = self.handle_line(line, &outbound).await {
                                outbound.send(serde_json::to_string(&response)?).ok();
                            }
                        }
                    }
                }
            }
        }

        // Close the transport: dropping the last sender ends the writer.
        drop(outbound);
        writer.await??;
        Ok(())
    }

    async fn handle_line(
        &self,
        line: &str,
        outbound: &mpsc::UnboundedSender<String>,
    ) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(%error, "failed to parse request");
                return Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(),
                ));
            }
        };

        let Some(id) = request.id else {
            // Client notifications (e.g. notifications/initialized) get no
            // response.
            tracing::debug!(method = %request.method, "ignoring notification");
            return None;
        };

        Some(
            self.handle_request(id, &request.method, request.params, outbound)
                .await,
        )
    }

    async fn handle_request(
        &self,
        id: serde_json::Value,
        method: &str,
        params: Option<serde_json::Value>,
        outbound: &mpsc::UnboundedSender<String>,
    ) -> JsonRpcResponse {
        tracing::debug!(%method, "handling request");

        match method {
            "initialize" => {
                // Echo the client's protocol version when it sent one.
                let protocol_version = params
                    .as_ref()
                    .and_then(|params| params.get("protocolVersion"))
                    .and_then(|version| version.as_str())
                    .unwrap_or(PROTOCOL_VERSION)
                    .to_string();

                JsonRpcResponse::success(
                    id,
                    InitializeResult {
                        protocol_version,
                        capabilities: ServerCapabilities {
                            tools: ToolsCapability {
                                list_changed: false,
                            },
                            resources: ResourcesCapability {
                                list_changed: false,
                            },
                        },
                        server_info: ServerInfo {
                            name: "airtable-server".to_string(),
                            version: env!("CARGO_PKG_VERSION").to_string(),
                        },
                    },
                )
            }
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                ListToolsResult {
                    tools: self.registry.list_schemas(),
                },
            ),
            "tools/call" => self.handle_tool_call(id, params, outbound).await,
            "resources/list" => JsonRpcResponse::success(
                id,
                ListResourcesResult {
                    resources: self.resources.list(),
                },
            ),
            "resources/read" => self.handle_resource_read(id, params).await,
            _ => JsonRpcResponse::error(id, JsonRpcError::method_not_found(method)),
        }
    }

    async fn handle_tool_call(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
        outbound: &mpsc::UnboundedSender<String>,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            Ok(None) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("missing tool call params"),
                )
            }
            Err(error) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("invalid tool call params: {error}")),
                )
            }
        };

        let Some(tool) = self.registry.get(&params.name) else {
            return JsonRpcResponse::error(id, JsonRpcError::unknown_tool(&params.name));
        };

        let token = params.meta.and_then(|meta| meta.progress_token);
        let progress = Progress::new(token, outbound.clone());

        match tool.execute(params.arguments, progress).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                tracing::error!(tool = %params.name, error = format!("{error:#}"), "tool call failed");
                // Argument shape problems are the caller's fault; everything
                // else (remote failures included) surfaces as an internal
                // error with the original status and message intact.
                let rpc_error = if error.downcast_ref::<serde_json::Error>().is_some() {
                    JsonRpcError::invalid_params(format!("{error:#}"))
                } else {
                    JsonRpcError::internal_error(format!("{error:#}"))
                };
                JsonRpcResponse::error(id, rpc_error)
            }
        }
    }

    async fn handle_resource_read(
        &self,
        id: serde_json::Value,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let params: ReadResourceParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            _ => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("missing resource read params"),
                )
            }
        };

        if !Resources::supports(&params.uri) {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_request("Unsupported URI"));
        }

        match self.resources.read(&params.uri).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, JsonRpcError::internal_error(format!("{error:#}"))),
        }
    }
}
