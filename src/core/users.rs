//! User business logic: the admin CRM table and the signed-in user's panel data.

use crate::entities::{
    ChatMessage, ChatMessageColumn, NotificationColumn, User, UserColumn, UserNotification,
};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions, Select};

/// Role filter of the users table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleFilter {
    #[default]
    All,
    Admins,
    Users,
}

impl RoleFilter {
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "admin" => Self::Admins,
            "user" => Self::Users,
            _ => Self::All,
        }
    }
}

/// Users newest first, searched on name or email.
pub async fn admin_list_users(client: &QueryClient, search: &str, role: RoleFilter) -> Result<Vec<User>> {
    let mut select = Select::<User>::new()
        .columns("*, cities(name)")
        .order_by(UserColumn::CreatedAt, false);
    if !search.trim().is_empty() {
        select = select.any_ilike(&[UserColumn::Name, UserColumn::Email], search);
    }
    select = match role {
        RoleFilter::All => select,
        RoleFilter::Admins => select.eq(UserColumn::IsAdmin, true),
        RoleFilter::Users => select.eq(UserColumn::IsAdmin, false),
    };
    client.fetch_select(select).await
}

/// Unread notifications of one user, newest first.
pub async fn unread_notifications(client: &QueryClient, user_id: &str) -> Result<Vec<UserNotification>> {
    client
        .fetch(
            &QueryOptions::<UserNotification>::new()
                .filter(NotificationColumn::UserId, user_id)
                .filter(NotificationColumn::IsRead, false)
                .order(NotificationColumn::CreatedAt, false),
        )
        .await
}

/// One user's conversation with the team, oldest first.
pub async fn chat_history(client: &QueryClient, user_id: &str, limit: u64) -> Result<Vec<ChatMessage>> {
    client
        .fetch(
            &QueryOptions::<ChatMessage>::new()
                .filter(ChatMessageColumn::UserId, user_id)
                .order(ChatMessageColumn::CreatedAt, true)
                .limit(limit),
        )
        .await
}
