//! Seller plan grants and their activation records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::{Money, PlanTerms};
use crate::domain::commerce::ledger_key;
use crate::domain::foundation::{ItemId, OrderId, PaymentId, Timestamp, UserId};

/// Lifecycle of a seller's plan, derived lazily from the grant and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    NoPlan,
    Active,
    Expired,
}

impl PlanState {
    /// Derives the state at `now`. Expiry is inclusive: at `expires_at`
    /// the plan is already expired.
    pub fn of(grant: Option<&PlanGrant>, now: Timestamp) -> Self {
        match grant {
            None => PlanState::NoPlan,
            Some(g) if g.is_expired(now) => PlanState::Expired,
            Some(_) => PlanState::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanState::NoPlan => "no_plan",
            PlanState::Active => "active",
            PlanState::Expired => "expired",
        }
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A seller's current upload entitlement. One per seller; a new plan
/// payment overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanGrant {
    pub uid: UserId,
    pub plan_id: ItemId,
    pub upload_limit: u32,
    pub upload_limit_remaining: u32,
    pub max_price_per_item: Money,
    pub expires_at: Timestamp,
    pub last_payment_id: PaymentId,
    pub updated_at: Timestamp,
}

impl PlanGrant {
    /// Builds a fresh grant from the terms snapshotted on the order.
    pub fn activate(
        uid: UserId,
        plan_id: ItemId,
        terms: &PlanTerms,
        payment_id: PaymentId,
        now: Timestamp,
    ) -> Self {
        Self {
            uid,
            plan_id,
            upload_limit: terms.upload_limit,
            upload_limit_remaining: terms.upload_limit,
            max_price_per_item: terms.max_price_per_item.clone(),
            expires_at: now.add_days(i64::from(terms.duration_days)),
            last_payment_id: payment_id,
            updated_at: now,
        }
    }

    /// Applies this grant over the seller's current one. Quota and price cap
    /// come from the new plan; expiry never moves backwards.
    pub fn renewing(mut self, current: Option<&PlanGrant>) -> Self {
        if let Some(current) = current {
            self.expires_at = self.expires_at.max(current.expires_at);
        }
        self
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Takes one upload slot. Returns the remaining count, or `None` when
    /// the grant is expired or exhausted and nothing changed.
    pub fn take_slot(&mut self, now: Timestamp) -> Option<u32> {
        if self.is_expired(now) || self.upload_limit_remaining == 0 {
            return None;
        }
        self.upload_limit_remaining -= 1;
        self.updated_at = now;
        Some(self.upload_limit_remaining)
    }
}

/// Idempotency record for a plan payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanActivation {
    pub id: String,
    pub uid: UserId,
    pub plan_id: ItemId,
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl PlanActivation {
    pub fn new(grant: &PlanGrant, order_id: OrderId, created_at: Timestamp) -> Self {
        Self {
            id: Self::id_for(&grant.uid, &grant.plan_id, &grant.last_payment_id),
            uid: grant.uid.clone(),
            plan_id: grant.plan_id.clone(),
            payment_id: grant.last_payment_id.clone(),
            order_id,
            expires_at: grant.expires_at,
            created_at,
        }
    }

    pub fn id_for(uid: &UserId, plan_id: &ItemId, payment_id: &PaymentId) -> String {
        ledger_key(&[uid.as_str(), plan_id.as_str(), payment_id.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(limit: u32, days: u32) -> PlanTerms {
        PlanTerms {
            upload_limit: limit,
            max_price_per_item: Money::inr(99900),
            duration_days: days,
        }
    }

    fn activate(terms: &PlanTerms, payment: &str, now: Timestamp) -> PlanGrant {
        PlanGrant::activate(
            UserId::new("seller-1").unwrap(),
            ItemId::new("pack-25").unwrap(),
            terms,
            PaymentId::new(payment).unwrap(),
            now,
        )
    }

    fn grant(now: Timestamp) -> PlanGrant {
        activate(&pack(2, 30), "pay_1", now)
    }

    #[test]
    fn activate_fills_quota_and_sets_expiry_from_now() {
        let now = Timestamp::now();
        let g = grant(now);
        assert_eq!(g.upload_limit_remaining, 2);
        assert_eq!(g.expires_at, now.add_days(30));
    }

    #[test]
    fn shorter_renewal_keeps_later_expiry_but_resets_quota() {
        let now = Timestamp::now();
        let mut month = activate(&pack(25, 30), "pay_1", now);
        month.upload_limit_remaining = 3;
        let week = activate(&pack(5, 7), "pay_2", now).renewing(Some(&month));
        assert_eq!(week.expires_at, now.add_days(30));
        assert_eq!(week.upload_limit, 5);
        assert_eq!(week.upload_limit_remaining, 5);
    }

    #[test]
    fn renewal_after_lapse_extends_from_now() {
        let now = Timestamp::now();
        let old = activate(&pack(25, 30), "pay_1", now.add_days(-60));
        let renewed = activate(&pack(25, 30), "pay_2", now).renewing(Some(&old));
        assert_eq!(renewed.expires_at, now.add_days(30));
        let first = activate(&pack(25, 30), "pay_3", now).renewing(None);
        assert_eq!(first.expires_at, now.add_days(30));
    }

    #[test]
    fn state_is_derived_from_clock() {
        let now = Timestamp::now();
        let g = grant(now);
        assert_eq!(PlanState::of(None, now), PlanState::NoPlan);
        assert_eq!(PlanState::of(Some(&g), now), PlanState::Active);
        assert_eq!(PlanState::of(Some(&g), g.expires_at), PlanState::Expired);
    }

    #[test]
    fn take_slot_stops_at_zero() {
        let now = Timestamp::now();
        let mut g = grant(now);
        assert_eq!(g.take_slot(now), Some(1));
        assert_eq!(g.take_slot(now), Some(0));
        assert_eq!(g.take_slot(now), None);
        assert_eq!(g.upload_limit_remaining, 0);
    }

    #[test]
    fn take_slot_refuses_expired_grant() {
        let now = Timestamp::now();
        let mut g = grant(now);
        assert_eq!(g.take_slot(now.add_days(31)), None);
        assert_eq!(g.upload_limit_remaining, 2);
    }

    #[test]
    fn activation_id_depends_on_payment() {
        let now = Timestamp::now();
        let g = grant(now);
        let a = PlanActivation::new(&g, OrderId::new("order_1").unwrap(), now);
        assert_eq!(
            a.id,
            PlanActivation::id_for(&g.uid, &g.plan_id, &PaymentId::new("pay_1").unwrap())
        );
        assert_ne!(
            a.id,
            PlanActivation::id_for(&g.uid, &g.plan_id, &PaymentId::new("pay_2").unwrap())
        );
    }
}
