use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    #[serde(rename = "warning-5-days")]
    WarningFiveDays,
    #[serde(rename = "warning-final-day")]
    WarningFinalDay,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::WarningFiveDays => "warning-5-days",
            NotificationKind::WarningFinalDay => "warning-final-day",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::WarningFiveDays => "Tu publicidad vence pronto",
            NotificationKind::WarningFinalDay => "Tu publicidad vence hoy",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            NotificationKind::WarningFiveDays => {
                "Tu espacio publicitario vence en 5 días. Renovalo para seguir visible."
            }
            NotificationKind::WarningFinalDay => {
                "Tu espacio publicitario vence en las próximas 24 horas. Renovalo para no perder visibilidad."
            }
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
