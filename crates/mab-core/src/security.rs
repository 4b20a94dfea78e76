use std::collections::HashSet;

use crate::domain::UserId;

// ============== Authorization ==============

/// Static set of Telegram user ids allowed to use the bot.
///
/// Built once at startup and never mutated; membership is the only rule.
#[derive(Clone, Debug, Default)]
pub struct AllowList {
    users: HashSet<i64>,
}

impl AllowList {
    pub fn new(users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    /// Messages without a sender (channel posts, anonymous admins) are rejected.
    pub fn is_authorized(&self, user_id: Option<UserId>) -> bool {
        let Some(user_id) = user_id else {
            return false;
        };
        self.users.contains(&user_id.0)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
