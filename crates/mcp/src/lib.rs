// MCP (Model Context Protocol) server for Airtable
// Exposes bases, tables, fields, and records as tools to agent clients

pub mod config;
pub mod progress;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use server::McpServer;
