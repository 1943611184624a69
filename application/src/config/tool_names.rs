//! Well-known tool server and tool identifiers

pub const PRICING_SERVER: &str = "awslabs.cost-analysis-mcp-server";
pub const PRICING_API_TOOL: &str = "get_pricing_from_api";
pub const PRICING_WEB_TOOL: &str = "get_pricing_from_web";

pub const DOCS_SERVER: &str = "awslabs.aws-documentation-mcp-server";
pub const DOCS_SEARCH_TOOL: &str = "search_documentation";

pub const TERRAFORM_SERVER: &str = "awslabs.terraform-mcp-server";
pub const TERRAFORM_TOOL: &str = "generate_terraform";

pub const CORE_SERVER: &str = "awslabs.core-mcp-server";
pub const CORE_PROMPT_TOOL: &str = "prompt_understanding";
