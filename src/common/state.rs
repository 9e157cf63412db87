// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use super::config::Config;
use crate::auth::otp::OtpService;
use crate::auth::tokens::TokenService;
use crate::auth::transport::TokenTransport;
use crate::auth::users::UsersService;
use crate::export::services::SharesService;
use crate::folders::services::FoldersService;
use crate::notes::services::NotesService;
use crate::services::{EmailSender, IdentityProvider, PdfRenderer};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub transport: Arc<dyn TokenTransport>,
    pub mailer: Arc<dyn EmailSender>,
    /// Absent when OAuth client settings are not configured
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub pdf: Arc<dyn PdfRenderer>,
}

impl AppState {
    pub fn users(&self) -> UsersService {
        UsersService::new(self.db.clone())
    }

    pub fn otps(&self) -> OtpService {
        OtpService::new(self.db.clone())
    }

    pub fn folders(&self) -> FoldersService {
        FoldersService::new(self.db.clone())
    }

    pub fn notes(&self) -> NotesService {
        NotesService::new(self.db.clone())
    }

    pub fn shares(&self) -> SharesService {
        SharesService::new(self.db.clone())
    }
}
