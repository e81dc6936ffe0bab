use serde::Deserialize;
use uuid::Uuid;

/// The acting user, passed explicitly on every request (`?user_id=`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}
