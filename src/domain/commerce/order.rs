//! Orders issued through the payment gateway.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::catalog::{ItemRef, Money, PlanTerms};
use crate::domain::foundation::{
    OrderId, StateMachine, Timestamp, UserId, ValidationError,
};

/// Lifecycle of an order.
///
/// `Paid -> Paid` is allowed so that re-delivered confirmations settle the
/// same order again without error. `Failed -> Paid` covers a later payment
/// attempt against the same gateway order that does capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "paid" => Ok(OrderStatus::Paid),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "order_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Created, Paid) | (Created, Failed) | (Failed, Paid) | (Paid, Paid)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Created => vec![Paid, Failed],
            Paid => vec![Paid],
            Failed => vec![Paid],
        }
    }
}

/// A pending or settled order. The amount, and for plans the plan terms,
/// are snapshots of the catalog at creation time and never come from the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub item: ItemRef,
    pub amount: Money,
    pub status: OrderStatus,
    pub note: Option<String>,
    /// Set for plan orders only.
    pub plan_terms: Option<PlanTerms>,
    pub created_at: Timestamp,
}

impl Order {
    /// Creates a new order in the `Created` state.
    pub fn new(
        order_id: OrderId,
        buyer_id: UserId,
        item: ItemRef,
        amount: Money,
        note: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            order_id,
            buyer_id,
            item,
            amount,
            status: OrderStatus::Created,
            note,
            plan_terms: None,
            created_at,
        }
    }

    pub fn with_plan_terms(mut self, terms: PlanTerms) -> Self {
        self.plan_terms = Some(terms);
        self
    }

    /// Moves the order to `Paid`.
    pub fn mark_paid(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OrderStatus::Paid)?;
        Ok(())
    }

    /// Moves the order to `Failed`.
    pub fn mark_failed(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OrderStatus::Failed)?;
        Ok(())
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }
}
