use serde::{Deserialize, Serialize};

use bazaar_auth::{AuthContext, Permission};
use bazaar_core::{Page, UserId, page};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    /// Role name; defaults to the signup role.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// `{"role": null}` removes the user's role.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct GrantPermissionRequest {
    pub permission: String,
}

/// Query for `GET /items`: pagination plus an optional product filter.
///
/// Kept flat (no `#[serde(flatten)]` of [`Page`]) so numbers parse from the query string.
#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    pub product_id: Option<String>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    page::DEFAULT_LIMIT
}

impl ItemListQuery {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemKeys {
    pub key: String,
    pub box_key: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchItemsRequest {
    pub product_id: String,
    pub items: Vec<ItemKeys>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: UserId,
    pub email: String,
    pub permissions: Vec<Permission>,
}

impl From<&AuthContext> for WhoAmI {
    fn from(ctx: &AuthContext) -> Self {
        Self {
            user_id: ctx.user_id(),
            email: ctx.email().to_string(),
            permissions: ctx.permissions().iter().cloned().collect(),
        }
    }
}
