pub mod records;
mod registry;
pub mod schema;

pub use records::{
    CreateRecordTool, DeleteRecordTool, GetRecordTool, ListRecordsTool, SearchRecordsTool,
    UpdateRecordTool,
};
pub use registry::{
    json_schema_array, json_schema_number, json_schema_object, json_schema_string, Tool,
    ToolRegistry,
};
pub use schema::{
    CreateFieldTool, CreateTableTool, ListBasesTool, ListTablesTool, UpdateFieldTool,
    UpdateTableTool,
};

use crate::protocol::{CallToolResult, ToolContent};

/// Wrap a serializable payload as a single pretty-printed text block.
pub(crate) fn text_result<T: serde::Serialize>(value: &T) -> anyhow::Result<CallToolResult> {
    Ok(CallToolResult {
        content: vec![ToolContent::text(serde_json::to_string_pretty(value)?)],
        is_error: None,
    })
}
