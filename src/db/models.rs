use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Profile role. Stored as its lowercase name in `users.role`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Father,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Father => "father",
            Role::Superadmin => "superadmin",
        }
    }

    /// Father and superadmin both reach the admin area.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Father | Role::Superadmin)
    }

    /// Only fathers approve, reject or delete public events.
    pub fn can_moderate_events(&self) -> bool {
        matches!(self, Role::Father)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "father" => Ok(Role::Father),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(AppError::BadRequest(format!("Unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Submitted,
    Interviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::NotStarted,
        ApplicationStatus::InProgress,
        ApplicationStatus::Submitted,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::NotStarted => "Not Started",
            ApplicationStatus::InProgress => "In Progress",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown application status '{s}'")))
    }
}

/// Moderation state of a public event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for EventStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "rejected" => Ok(EventStatus::Rejected),
            other => Err(AppError::Internal(format!("Corrupt event status '{other}'"))),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar item kind. Public events only accept `Workshop` and `InfoSession`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Deadline,
    Workshop,
    #[serde(rename = "Info Session")]
    InfoSession,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Deadline => "Deadline",
            EventType::Workshop => "Workshop",
            EventType::InfoSession => "Info Session",
        }
    }

    pub fn allowed_for_public(&self) -> bool {
        !matches!(self, EventType::Deadline)
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deadline" => Ok(EventType::Deadline),
            "Workshop" => Ok(EventType::Workshop),
            "Info Session" => Ok(EventType::InfoSession),
            other => Err(AppError::BadRequest(format!("Unknown event type '{other}'"))),
        }
    }
}
