pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod guards;
pub mod handlers;
pub mod moderation;
pub mod pages;
pub mod rate_limit;
pub mod routes;
pub mod seed;
pub mod session;
pub mod subscriptions;

use db::pool::Db;

use config::Config;
use feed::ChangeFeed;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub jwt: auth::jwt::JwtManager,
    pub config: Config,
    pub feed: ChangeFeed,
}

impl AsRef<AppState> for AppState {
    fn as_ref(&self) -> &AppState {
        self
    }
}
