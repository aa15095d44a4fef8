//! MCP protocol surface: bridges the tool catalog, resource templates, and
//! prompt registry onto `rmcp`'s `ServerHandler`.
//!
//! The handler is deliberately thin: every tool call funnels through
//! `dispatch::dispatch`, which owns validation, budgeting, and usage
//! tracking.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorCode, GetPromptRequestParams,
    GetPromptResult, Implementation, ListPromptsResult, ListResourceTemplatesResult,
    ListResourcesResult, ListToolsResult, PaginatedRequestParams, ProtocolVersion,
    ReadResourceRequestParams, ReadResourceResult, ResourceContents, ServerCapabilities,
    ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::catalog::{self, TOOL_CATALOG};
use crate::dispatch;
use crate::prompts;
use crate::resources;
use crate::state::AppState;

#[derive(Clone)]
pub struct ResearchService {
    state: Arc<AppState>,
}

impl ResearchService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn to_mcp_tool(descriptor: &catalog::ToolDescriptor) -> Tool {
        let schema = catalog::input_schema(descriptor.name);
        let input_schema = match schema {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        };
        Tool {
            name: descriptor.name.into(),
            title: None,
            description: Some(descriptor.summary.into()),
            input_schema,
            output_schema: None,
            annotations: None,
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

impl ServerHandler for ResearchService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "web-research-mcp".to_string(),
                title: Some("Web Research Assistant".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(catalog::tool_instructions()),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = TOOL_CATALOG.iter().map(Self::to_mcp_tool).collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !TOOL_CATALOG.iter().any(|t| t.name == request.name) {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", request.name),
                None,
            ));
        }

        let arguments = request.arguments.unwrap_or_default();
        let outcome = dispatch::dispatch(&self.state, &request.name, &arguments).await;
        if outcome.success {
            Ok(CallToolResult::success(vec![Content::text(outcome.body)]))
        } else {
            Ok(CallToolResult::error(vec![Content::text(outcome.body)]))
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListResourcesResult::with_all_items(Vec::new())))
    }

    fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourceTemplatesResult, McpError>> + Send + '_
    {
        std::future::ready(Ok(ListResourceTemplatesResult::with_all_items(
            resources::resource_templates(),
        )))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let json = resources::resolve(&self.state, &request.uri)
            .await
            .map_err(|err| McpError::new(ErrorCode::INVALID_PARAMS, err.to_string(), None))?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(json, request.uri)],
        })
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListPromptsResult::with_all_items(prompts::prompt_list())))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        prompts::resolve(&request.name, &arguments).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no prompt registered with name: {}", request.name),
                None,
            )
        })
    }
}
