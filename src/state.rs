use crate::clock::Clock;
use crate::progress::ProgressService;
use crate::unlock::UnlockPolicy;
use std::sync::Arc;

/// Shared, read-only handles. Progress itself is never cached here.
#[derive(Clone)]
pub struct AppState {
    pub service: ProgressService,
    pub policy: UnlockPolicy,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(service: ProgressService, policy: UnlockPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            service,
            policy,
            clock,
        }
    }
}
