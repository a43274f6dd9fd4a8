//! GetPlanStatusHandler - Query handler for a seller's current plan.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::plan::{PlanGrant, PlanState, UploadError};
use crate::ports::PlanGrantRepository;

#[derive(Debug, Clone)]
pub struct GetPlanStatusQuery {
    pub uid: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPlanStatusResult {
    pub state: PlanState,
    pub grant: Option<PlanGrant>,
}

pub struct GetPlanStatusHandler {
    grants: Arc<dyn PlanGrantRepository>,
}

impl GetPlanStatusHandler {
    pub fn new(grants: Arc<dyn PlanGrantRepository>) -> Self {
        Self { grants }
    }

    pub async fn handle(&self, query: GetPlanStatusQuery) -> Result<GetPlanStatusResult, UploadError> {
        let grant = self.grants.find_by_uid(&query.uid).await?;
        let state = PlanState::of(grant.as_ref(), Timestamp::now());
        Ok(GetPlanStatusResult { state, grant })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::catalog::Money;
    use crate::domain::foundation::{ItemId, PaymentId};

    fn grant(expires_in_days: i64) -> PlanGrant {
        let now = Timestamp::now();
        PlanGrant {
            uid: UserId::new("seller-1").unwrap(),
            plan_id: ItemId::new("plan-basic").unwrap(),
            upload_limit: 25,
            upload_limit_remaining: 7,
            max_price_per_item: Money::inr(50000),
            expires_at: now.add_days(expires_in_days),
            last_payment_id: PaymentId::new("pay_1").unwrap(),
            updated_at: now,
        }
    }

    fn query() -> GetPlanStatusQuery {
        GetPlanStatusQuery {
            uid: UserId::new("seller-1").unwrap(),
        }
    }

    #[tokio::test]
    async fn seller_without_grant_has_no_plan() {
        let handler = GetPlanStatusHandler::new(Arc::new(InMemoryStore::new()));
        let result = handler.handle(query()).await.unwrap();
        assert_eq!(result.state, PlanState::NoPlan);
        assert!(result.grant.is_none());
    }

    #[tokio::test]
    async fn live_grant_is_active() {
        let store = InMemoryStore::new();
        store.put_grant(grant(30)).await;
        let result = GetPlanStatusHandler::new(Arc::new(store))
            .handle(query())
            .await
            .unwrap();
        assert_eq!(result.state, PlanState::Active);
        assert_eq!(result.grant.unwrap().upload_limit_remaining, 7);
    }

    #[tokio::test]
    async fn lapsed_grant_is_expired_but_still_reported() {
        let store = InMemoryStore::new();
        store.put_grant(grant(-2)).await;
        let result = GetPlanStatusHandler::new(Arc::new(store))
            .handle(query())
            .await
            .unwrap();
        assert_eq!(result.state, PlanState::Expired);
        assert!(result.grant.is_some());
    }
}
