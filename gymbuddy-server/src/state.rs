use crate::db::Database;
use crate::password::DEFAULT_ITERATIONS;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    /// PBKDF2 rounds for passwords hashed at registration
    pub password_iterations: u32,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let session_manager = SessionManager::new(db.clone());
        Self {
            db,
            session_manager,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_session_ttl_days(db: Database, ttl_days: i64) -> Self {
        let session_manager = SessionManager::with_ttl_days(db.clone(), ttl_days);
        Self {
            db,
            session_manager,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations;
        self
    }

    /// Get authenticated user ID from session token
    pub fn get_authenticated_user_id_from_token(&self, token: &str) -> Option<uuid::Uuid> {
        self.session_manager.validate_session(token).ok()
    }
}
