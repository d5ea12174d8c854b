use std::sync::Arc;

use crate::application::{ChatService, DocumentService, Session, SharedSession};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub document_service: Arc<DocumentService>,
    pub chat_service: Arc<ChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        document_service: Arc<DocumentService>,
        chat_service: Arc<ChatService>,
    ) -> Self {
        Self {
            session: Session::shared(),
            document_service,
            chat_service,
            config: Arc::new(config),
        }
    }
}
