use std::sync::Arc;

use crate::scoring::AffinityScorer;
use crate::store::OperationsStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OperationsStore>,
    pub scorer: Arc<dyn AffinityScorer>,
}
