//! Public event moderation: the transition table and the operations built on it.
//!
//! | from \ action | approve  | reject(reason)       |
//! |---------------|----------|----------------------|
//! | pending       | approved | rejected             |
//! | approved      | approved | invalid              |
//! | rejected      | invalid  | rejected (new reason)|
//!
//! Nothing ever returns to `pending`. Concurrent moderators are last-write-wins.

use crate::db::models::{EventStatus, Role};
use crate::db::pool::Db;
use crate::db::queries;
use crate::error::AppError;
use crate::feed::{ChangeFeed, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject { reason: String },
}

impl ModerationAction {
    /// Builds a rejection, refusing blank reasons before anything is stored.
    pub fn reject(reason: &str) -> Result<Self, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "reason: a rejection reason is required".to_string(),
            ));
        }
        Ok(ModerationAction::Reject {
            reason: reason.to_string(),
        })
    }

    fn target(&self) -> EventStatus {
        match self {
            ModerationAction::Approve => EventStatus::Approved,
            ModerationAction::Reject { .. } => EventStatus::Rejected,
        }
    }
}

/// Resulting state after a valid transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: EventStatus,
    pub rejection_reason: Option<String>,
}

/// The single transition function. Every status change goes through here.
pub fn transition(current: EventStatus, action: ModerationAction) -> Result<Outcome, AppError> {
    let target = action.target();
    match (current, action) {
        (EventStatus::Pending | EventStatus::Approved, ModerationAction::Approve) => Ok(Outcome {
            status: EventStatus::Approved,
            rejection_reason: None,
        }),
        (EventStatus::Pending | EventStatus::Rejected, ModerationAction::Reject { reason }) => {
            if reason.trim().is_empty() {
                return Err(AppError::Validation(
                    "reason: a rejection reason is required".to_string(),
                ));
            }
            Ok(Outcome {
                status: EventStatus::Rejected,
                rejection_reason: Some(reason),
            })
        }
        (from, _) => Err(AppError::InvalidTransition { from, to: target }),
    }
}

fn ensure_moderator(role: Role) -> Result<(), AppError> {
    if role.can_moderate_events() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Applies `action` to the stored event on behalf of a caller with `role`.
pub async fn moderate(
    db: &Db,
    feed: &ChangeFeed,
    role: Role,
    event_id: &str,
    action: ModerationAction,
) -> Result<entity::public_event::Model, AppError> {
    ensure_moderator(role)?;

    let event = queries::events::find_public(db, event_id)
        .await?
        .ok_or(AppError::EventNotFound)?;
    let current: EventStatus = event.status.parse()?;

    let outcome = transition(current, action)?;
    let updated =
        queries::events::save_moderation(db, event, outcome.status, outcome.rejection_reason).await?;

    tracing::info!(event_id, from = %current, to = %outcome.status, "public event moderated");
    feed.publish(Topic::PublicEvents);
    Ok(updated)
}

/// Hard delete. Irreversible, so the caller must pass an explicit confirmation.
pub async fn delete(
    db: &Db,
    feed: &ChangeFeed,
    role: Role,
    event_id: &str,
    confirmed: bool,
) -> Result<(), AppError> {
    ensure_moderator(role)?;
    if !confirmed {
        return Err(AppError::ConfirmationRequired);
    }

    queries::events::delete_public(db, event_id).await?;

    tracing::info!(event_id, "public event deleted");
    feed.publish(Topic::PublicEvents);
    Ok(())
}

/// Admin view of the moderation queue.
#[derive(Debug, Clone, Default)]
pub struct Partitioned {
    pub pending: Vec<entity::public_event::Model>,
    /// Approved and rejected, most recently created first.
    pub historical: Vec<entity::public_event::Model>,
}

/// Splits events (already newest-first) into the pending queue and history.
pub fn partition(events: Vec<entity::public_event::Model>) -> Partitioned {
    let mut partitioned = Partitioned::default();
    for event in events {
        match event.status.parse::<EventStatus>() {
            Ok(EventStatus::Pending) => partitioned.pending.push(event),
            Ok(EventStatus::Approved | EventStatus::Rejected) => partitioned.historical.push(event),
            Err(_) => tracing::warn!(event_id = %event.id, status = %event.status, "skipping event with unknown status"),
        }
    }
    partitioned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject(reason: &str) -> ModerationAction {
        ModerationAction::Reject {
            reason: reason.to_string(),
        }
    }

    #[test]
    fn pending_moves_to_approved_or_rejected() {
        let approved = transition(EventStatus::Pending, ModerationAction::Approve).unwrap();
        assert_eq!(approved.status, EventStatus::Approved);
        assert_eq!(approved.rejection_reason, None);

        let rejected = transition(EventStatus::Pending, reject("Image too small")).unwrap();
        assert_eq!(rejected.status, EventStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Image too small"));
    }

    #[test]
    fn approve_is_idempotent() {
        let outcome = transition(EventStatus::Approved, ModerationAction::Approve).unwrap();
        assert_eq!(outcome.status, EventStatus::Approved);
    }

    #[test]
    fn blank_reason_is_refused() {
        assert!(matches!(
            transition(EventStatus::Pending, reject("   ")),
            Err(AppError::Validation(_))
        ));
        assert!(ModerationAction::reject("").is_err());
        assert_eq!(
            ModerationAction::reject("  late  ").unwrap(),
            reject("late")
        );
    }

    #[test]
    fn cross_terminal_moves_are_invalid() {
        assert!(matches!(
            transition(EventStatus::Approved, reject("changed mind")),
            Err(AppError::InvalidTransition {
                from: EventStatus::Approved,
                to: EventStatus::Rejected
            })
        ));
        assert!(matches!(
            transition(EventStatus::Rejected, ModerationAction::Approve),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn only_fathers_moderate() {
        assert!(ensure_moderator(Role::Father).is_ok());
        assert!(matches!(ensure_moderator(Role::Superadmin), Err(AppError::Forbidden)));
        assert!(matches!(ensure_moderator(Role::User), Err(AppError::Forbidden)));
    }
}
