use async_trait::async_trait;

use super::StoreError;
use crate::domain::EngineStatusSnapshot;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait EngineStatusSource: Send + Sync {
    async fn snapshot(&self) -> Result<EngineStatusSnapshot, StoreError>;
}
