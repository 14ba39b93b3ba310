//! Order status state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Paid
///           └──► Canceled   (releases reserved stock)
/// ```
///
/// Requesting the current status again is a no-op. Every other pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created by the order saga; stock is reserved.
    #[default]
    Pending,

    /// Payment recorded (terminal state).
    Paid,

    /// Order canceled and stock released (terminal state).
    Canceled,
}

/// Outcome of applying a requested status to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Requested status equals the current status; nothing is written.
    Unchanged,

    /// A legal transition to perform.
    Apply {
        from: OrderStatus,
        to: OrderStatus,
        /// True when every line item's quantity must be returned to the catalog.
        restock: bool,
    },
}

impl OrderStatus {
    /// Parses a requested status, ignoring surrounding whitespace and case.
    pub fn parse(raw: &str) -> Result<Self, OrderError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "canceled" => Ok(OrderStatus::Canceled),
            _ => Err(OrderError::InvalidStatus {
                value: raw.to_string(),
            }),
        }
    }

    /// Returns true if `next` is reachable from this status in one step.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Paid) | (OrderStatus::Pending, OrderStatus::Canceled)
        )
    }

    /// Returns true if moving to `next` releases the order's reserved stock.
    pub fn releases_stock_on(&self, next: OrderStatus) -> bool {
        matches!((self, next), (OrderStatus::Pending, OrderStatus::Canceled))
    }

    /// Decides what a request to move to `requested` means for an order in this status.
    pub fn plan_change(self, requested: OrderStatus) -> Result<StatusChange, OrderError> {
        if self == requested {
            return Ok(StatusChange::Unchanged);
        }
        if !self.can_transition_to(requested) {
            return Err(OrderError::InvalidTransition {
                from: self,
                to: requested,
            });
        }
        Ok(StatusChange::Apply {
            from: self,
            to: requested,
            restock: self.releases_stock_on(requested),
        })
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Canceled)
    }

    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Canceled,
    ];

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!(OrderStatus::parse("  PAID ").unwrap(), OrderStatus::Paid);
        assert_eq!(OrderStatus::parse("Canceled").unwrap(), OrderStatus::Canceled);
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        for raw in ["wtf", "", "cancelled", "shipped"] {
            assert!(matches!(
                OrderStatus::parse(raw),
                Err(OrderError::InvalidStatus { .. })
            ));
        }
    }

    #[test]
    fn test_same_status_is_unchanged() {
        for status in ALL {
            assert_eq!(status.plan_change(status).unwrap(), StatusChange::Unchanged);
        }
    }

    #[test]
    fn test_only_pending_to_canceled_restocks() {
        assert_eq!(
            OrderStatus::Pending.plan_change(OrderStatus::Canceled).unwrap(),
            StatusChange::Apply {
                from: OrderStatus::Pending,
                to: OrderStatus::Canceled,
                restock: true,
            }
        );
        assert_eq!(
            OrderStatus::Pending.plan_change(OrderStatus::Paid).unwrap(),
            StatusChange::Apply {
                from: OrderStatus::Pending,
                to: OrderStatus::Paid,
                restock: false,
            }
        );
    }

    #[test]
    fn test_terminal_states_reject_every_change() {
        for from in [OrderStatus::Paid, OrderStatus::Canceled] {
            assert!(from.is_terminal());
            for to in ALL.into_iter().filter(|to| *to != from) {
                assert_eq!(
                    from.plan_change(to),
                    Err(OrderError::InvalidTransition { from, to })
                );
            }
        }
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_serialization_is_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Canceled).unwrap();
        assert_eq!(json, "\"canceled\"");
        let back: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(back, OrderStatus::Paid);
    }
}
