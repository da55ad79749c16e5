use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// User account model (arena-owned, referenced by id)
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket model (arena-owned, referenced by id)
///
/// `created_by` and `assigned_to` are user ids resolved via store lookup,
/// never embedded user objects. `assigned_to` is non-owning: deleting the
/// assignee clears the reference instead of cascading.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Comment model (arena-owned, referenced by id)
///
/// `internal` marks staff-only notes. The public API currently always stores
/// false; the flag is kept on the entity so stored data stays compatible with
/// clients that set it.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub internal: bool,
    pub created_at: DateTime<Utc>,
}

/// Role enum (wire format `ROLE_*`)
///
/// Authorization uses exact membership checks against per-action role sets,
/// never ordering comparisons, so this enum deliberately does not implement
/// `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_TECHNICIAN")]
    Technician,
    #[serde(rename = "ROLE_MANAGER")]
    Manager,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Convert to the wire-format string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Technician => "ROLE_TECHNICIAN",
            Role::Manager => "ROLE_MANAGER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_TECHNICIAN" => Ok(Role::Technician),
            "ROLE_MANAGER" => Ok(Role::Manager),
            "ROLE_ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Ticket status enum
///
/// Declaration order drives `sortBy=status`. Transitions are unordered field
/// updates: any status may be written over any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Ticket priority enum (declaration order drives `sortBy=priority`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Allowed `sortBy` keys for ticket listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketSortKey {
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
    Priority,
}

impl FromStr for TicketSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(TicketSortKey::CreatedAt),
            "updatedAt" => Ok(TicketSortKey::UpdatedAt),
            "title" => Ok(TicketSortKey::Title),
            "status" => Ok(TicketSortKey::Status),
            "priority" => Ok(TicketSortKey::Priority),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

/// Sort direction for ticket listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

/// User response (public view, no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            enabled: user.enabled,
            created_at: user.created_at,
        }
    }
}

/// Ticket response with embedded user views and comment count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_by: UserResponse,
    pub assigned_to: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub comment_count: u64,
}

/// Comment response with embedded author view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub user: UserResponse,
    pub created_at: DateTime<Utc>,
}

/// Authentication response returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: UserResponse,
}

/// Paged listing envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub size: u64,
    pub number: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> PageResponse<T> {
    /// Slice a fully filtered and sorted listing into one page.
    ///
    /// `size` must already be clamped to a positive value by the caller.
    #[must_use]
    pub fn paginate(items: Vec<T>, page: u64, size: u64) -> Self {
        let total_elements = items.len() as u64;
        let total_pages = total_elements.div_ceil(size);

        let content: Vec<T> = items
            .into_iter()
            .skip((page.saturating_mul(size)) as usize)
            .take(size as usize)
            .collect();

        Self {
            content,
            total_elements,
            total_pages,
            size,
            number: page,
            first: page == 0,
            last: total_pages == 0 || page >= total_pages - 1,
        }
    }
}
