use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::notifications;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct InsertNotificationEntity {
    pub id: Uuid,
    pub recipient_id: String,
    pub owner_kind: String,
    pub listing_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
