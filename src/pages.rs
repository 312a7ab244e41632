use serde::Serialize;

use crate::guards::Guard;

/// Service detail slugs served under `/services/:slug`.
pub const SERVICE_SLUGS: [&str; 6] = [
    "student-assessment-profiling",
    "profile-building",
    "scholarship-roadmap",
    "preparation-classes",
    "personal-essay-prep",
    "visa-interview-prep",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "page", content = "slug", rename_all = "snake_case")]
pub enum Page {
    Home,
    Services,
    GlobalScholarshipProgram,
    SchoolConsulting,
    ProfessionalTrainings,
    ServiceDetail(String),
    Contact,
    Media,
    Events,
    Dashboard,
    Admin,
    Login,
    Signup,
    Inquiry,
    Application,
    NotFound,
}

impl Page {
    /// Maps a browser path (query and fragment ignored) to its page.
    pub fn resolve(path: &str) -> Page {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Page::Home,
            "/services" => Page::Services,
            "/services/global-scholarship-program" => Page::GlobalScholarshipProgram,
            "/services/school-consulting" => Page::SchoolConsulting,
            "/services/professional-trainings" => Page::ProfessionalTrainings,
            "/contact" => Page::Contact,
            "/media" => Page::Media,
            "/events" => Page::Events,
            "/dashboard" => Page::Dashboard,
            "/admin" => Page::Admin,
            "/login" => Page::Login,
            "/signup" => Page::Signup,
            "/inquiry" => Page::Inquiry,
            "/application" => Page::Application,
            other => match other.strip_prefix("/services/") {
                Some(slug) if SERVICE_SLUGS.contains(&slug) => Page::ServiceDetail(slug.to_string()),
                _ => Page::NotFound,
            },
        }
    }

    pub fn guard(&self) -> Option<Guard> {
        match self {
            Page::Dashboard => Some(Guard::UserOnly),
            Page::Admin => Some(Guard::AdminOnly),
            _ => None,
        }
    }
}
