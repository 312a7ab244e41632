use serde::Serialize;

use crate::db::models::Role;
use crate::session::SessionSnapshot;

/// Navigation policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    AuthenticatedOnly,
    UserOnly,
    AdminOnly,
}

/// Where a refused navigation is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    Login,
    Dashboard,
    Admin,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/login",
            Redirect::Dashboard => "/dashboard",
            Redirect::Admin => "/admin",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Redirect(Redirect),
    /// The role is not known yet; show a neutral loading state.
    Pending,
}

impl Guard {
    /// Pure decision over the current session. Never redirects while loading.
    pub fn evaluate(&self, session: &SessionSnapshot) -> Decision {
        if session.loading {
            return Decision::Pending;
        }
        self.decide(session.identity.is_some(), session.role)
    }

    /// Decision for a caller whose identity presence and role are settled.
    pub fn decide(&self, signed_in: bool, role: Option<Role>) -> Decision {
        if !signed_in {
            return match self {
                Guard::AdminOnly => Decision::Redirect(Redirect::Dashboard),
                Guard::AuthenticatedOnly | Guard::UserOnly => Decision::Redirect(Redirect::Login),
            };
        }

        let is_admin = role.is_some_and(|r| r.is_admin());
        match self {
            Guard::AuthenticatedOnly => Decision::Allow,
            Guard::UserOnly if is_admin => Decision::Redirect(Redirect::Admin),
            Guard::UserOnly => Decision::Allow,
            Guard::AdminOnly if is_admin => Decision::Allow,
            Guard::AdminOnly => Decision::Redirect(Redirect::Dashboard),
        }
    }
}
