use crate::domain::value_objects::enums::{
    notification_kinds::NotificationKind, owner_kinds::OwnerKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_id: String,
    pub owner_kind: OwnerKind,
    pub listing_id: String,
    pub kind: NotificationKind,
}
