use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into};
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::notifications::InsertNotificationEntity,
        repositories::notifications::NotificationEmitter,
        value_objects::notifications::NewNotification,
    },
    infra::{
        db::postgres::{postgres_connection::PgPoolSquad, schema::notifications},
        push::push_client::{PushClient, PushMessage},
    },
};

/// Stores the in-app notification, then hands it to push delivery.
pub struct NotificationPostgres {
    db_pool: Arc<PgPoolSquad>,
    push_client: Option<Arc<PushClient>>,
}

impl NotificationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, push_client: Option<Arc<PushClient>>) -> Self {
        Self {
            db_pool,
            push_client,
        }
    }
}

#[async_trait]
impl NotificationEmitter for NotificationPostgres {
    async fn emit(&self, notification: NewNotification) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);
        let row = InsertNotificationEntity {
            id: Uuid::new_v4(),
            recipient_id: notification.recipient_id.clone(),
            owner_kind: notification.owner_kind.to_string(),
            listing_id: notification.listing_id.clone(),
            kind: notification.kind.to_string(),
            title: notification.kind.title().to_string(),
            body: notification.kind.body().to_string(),
            read: false,
            created_at: Utc::now(),
        };

        let notification_id = task::spawn_blocking(move || -> Result<Uuid> {
            let mut conn = db_pool.get()?;

            let id = insert_into(notifications::table)
                .values(&row)
                .returning(notifications::id)
                .get_result::<Uuid>(&mut conn)?;
            Ok(id)
        })
        .await??;

        info!(
            %notification_id,
            listing_id = %notification.listing_id,
            kind = %notification.kind,
            "notifications: stored"
        );

        let Some(push_client) = &self.push_client else {
            return Ok(());
        };

        if let Err(err) = push_client.send(&PushMessage::from(&notification)).await {
            warn!(
                listing_id = %notification.listing_id,
                kind = %notification.kind,
                error = ?err,
                "notifications: push delivery failed"
            );
        }

        Ok(())
    }
}
