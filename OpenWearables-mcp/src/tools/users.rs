use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use open_wearables_domain::entities::UserQueryParams;

use super::{default_limit, iso, tool};
use crate::error::ToolError;
use crate::protocol::McpTool;
use crate::server::ServerContext;

const MAX_USERS_PER_PAGE: u32 = 100;

pub(super) fn definitions() -> Vec<McpTool> {
    vec![
        tool(
            "list_users",
            "List users in the system. Use this tool to find user IDs that can be used with other tools.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of users to return (1-100, default 20)",
                        "default": 20
                    },
                    "page": {
                        "type": "integer",
                        "description": "Page number for pagination (default 1)",
                        "default": 1
                    },
                    "search": {
                        "type": "string",
                        "description": "Optional search term to filter by name or email"
                    }
                }
            }),
        ),
        tool(
            "get_user",
            "Get details for a specific user, including email, name and creation date.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "The UUID of the user"}
                },
                "required": ["user_id"]
            }),
        ),
    ]
}

#[derive(Debug, Deserialize)]
pub(super) struct ListUsersArgs {
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default)]
    search: Option<String>,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub(super) struct GetUserArgs {
    user_id: String,
}

#[instrument(skip(ctx))]
pub(super) async fn list_users(ctx: &ServerContext, args: ListUsersArgs) -> Result<Value, ToolError> {
    let params = UserQueryParams {
        page: args.page,
        limit: args.limit.min(MAX_USERS_PER_PAGE),
        search: args.search,
    };
    let page = ctx.users.list_users(params).await?;

    let users: Vec<Value> = page
        .items
        .iter()
        .map(|user| {
            json!({
                "id": user.id.to_string(),
                "email": user.email,
                "first_name": user.first_name,
                "last_name": user.last_name,
                "created_at": iso(user.created_at),
            })
        })
        .collect();

    Ok(json!({
        "users": users,
        "pagination": {
            "total": page.total,
            "page": page.page,
            "limit": page.limit,
            "pages": page.pages(),
        },
    }))
}

#[instrument(skip(ctx))]
pub(super) async fn get_user(ctx: &ServerContext, args: GetUserArgs) -> Result<Value, ToolError> {
    let user = ctx.users.get_user(&args.user_id).await?;
    Ok(json!({
        "id": user.id.to_string(),
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "external_user_id": user.external_user_id,
        "created_at": iso(user.created_at),
    }))
}
