use std::sync::Arc;
use crate::domain::ports::{
    JobRepository, ApplicationRepository, NotificationRepository,
    ConversationRepository, ApplicationViewRepository,
};
use crate::domain::services::lifecycle::LifecycleEngine;
use crate::domain::services::listings::ListingService;
use crate::domain::services::view_state::ViewStateTracker;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub job_repo: Arc<dyn JobRepository>,
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub conversation_repo: Arc<dyn ConversationRepository>,
    pub view_repo: Arc<dyn ApplicationViewRepository>,
    pub lifecycle: Arc<LifecycleEngine>,
    pub view_state: Arc<ViewStateTracker>,
    pub listings: Arc<ListingService>,
}
