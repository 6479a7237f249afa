//! Request routing: classify, match, relay.
//!
//! A dispatch reads the request scope once, then either changes who is on
//! duty or finds the first on-duty member able to serve an order and relays
//! the order body to them and their answer back.
//!
//! Without a `relay_timeout` a worker that never answers stalls its dispatch
//! indefinitely. Hosts that need a bound either configure one or wrap
//! `dispatch` in their own deadline.
//!
//! A relay cut short between forwarding a body and reading the answer leaves
//! the worker's channel out of step: its late answer would be read by the
//! next order. Such a worker is taken off duty when the relay is dropped, and
//! any order already queued on it fails with a channel failure.

use crate::core::registry::{StaffMember, StaffRegistry};
use crate::domain::model::{Payload, RequestKind, Specialities, SPECIALITY_KEY};
use crate::domain::ports::Request;
use crate::utils::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// What to do with an order that requests no specialities at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyOrderPolicy {
    /// Every member trivially qualifies; the first on duty is chosen.
    #[default]
    MatchAny,
    /// Refuse the order as malformed.
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub relay_timeout: Option<Duration>,
    pub empty_order_policy: EmptyOrderPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    OnDuty { staff_id: String, replaced: bool },
    OffDuty { staff_id: String, was_on_duty: bool },
    Served { staff_id: String },
}

pub struct Dispatcher {
    registry: Arc<StaffRegistry>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<StaffRegistry>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    pub fn with_config(registry: Arc<StaffRegistry>, config: DispatcherConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<StaffRegistry> {
        &self.registry
    }

    pub async fn dispatch(&self, request: Arc<dyn Request>) -> Result<DispatchOutcome> {
        let kind = RequestKind::from_scope(request.scope())?;
        tracing::debug!("Classified request as {:?}", kind);

        match kind {
            RequestKind::StaffOnDuty { id, specialities } => {
                tracing::info!("Staff '{}' on duty with {}", id, specialities);
                let member = StaffMember::new(id.clone(), specialities, request);
                let replaced = self.registry.register(member).is_some();
                if replaced {
                    tracing::debug!("Staff '{}' re-registered, previous channel dropped", id);
                }
                Ok(DispatchOutcome::OnDuty {
                    staff_id: id,
                    replaced,
                })
            }
            RequestKind::StaffOffDuty { id } => {
                let was_on_duty = self.registry.deregister(&id).is_some();
                tracing::info!("Staff '{}' off duty (was on duty: {})", id, was_on_duty);
                Ok(DispatchOutcome::OffDuty {
                    staff_id: id,
                    was_on_duty,
                })
            }
            RequestKind::Order { specialities } => {
                let staff = self.select_staff(&specialities)?;
                tracing::debug!("Order for {} assigned to '{}'", specialities, staff.id());

                self.relay_with_deadline(request.as_ref(), &staff).await?;
                tracing::info!("Order for {} served by '{}'", specialities, staff.id());
                Ok(DispatchOutcome::Served {
                    staff_id: staff.id().to_string(),
                })
            }
        }
    }

    /// Picks the first on-duty member whose specialities cover `requested`.
    pub fn select_staff(&self, requested: &Specialities) -> Result<StaffMember> {
        if requested.is_empty() && self.config.empty_order_policy == EmptyOrderPolicy::Reject {
            return Err(DispatchError::invalid_scope(
                SPECIALITY_KEY,
                "order requests no specialities",
            ));
        }

        self.registry.find_first_capable(requested).ok_or_else(|| {
            tracing::warn!(
                "No suitable staff for {} among {} on duty",
                requested,
                self.registry.len()
            );
            DispatchError::NoSuitableStaffFound {
                requested: requested.clone(),
            }
        })
    }

    async fn relay_with_deadline(&self, order: &dyn Request, staff: &StaffMember) -> Result<()> {
        let registry = self.registry.as_ref();
        let Some(timeout) = self.config.relay_timeout else {
            return relay(registry, order, staff).await;
        };

        match tokio::time::timeout(timeout, relay(registry, order, staff)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Relay with '{}' timed out after {:?}", staff.id(), timeout);
                Err(DispatchError::RelayTimeout {
                    staff_id: staff.id().to_string(),
                    timeout,
                })
            }
        }
    }
}

async fn relay(registry: &StaffRegistry, order: &dyn Request, staff: &StaffMember) -> Result<()> {
    let body = order.receive().await?;
    let result = forward(registry, staff, body).await?;
    order.send(result).await
}

async fn forward(registry: &StaffRegistry, staff: &StaffMember, body: Payload) -> Result<Payload> {
    let mut in_flight = staff.lane().lock().await;
    if *in_flight {
        registry.evict(staff);
        return Err(DispatchError::channel(format!(
            "staff '{}' is out of step after an interrupted relay",
            staff.id()
        )));
    }

    *in_flight = true;
    let eviction = EvictOnDrop {
        registry,
        staff,
        armed: true,
    };
    staff.channel().send(body).await?;
    let result = staff.channel().receive().await?;
    eviction.disarm();
    *in_flight = false;
    Ok(result)
}

/// Takes a worker off duty unless its exchange ran to completion.
struct EvictOnDrop<'a> {
    registry: &'a StaffRegistry,
    staff: &'a StaffMember,
    armed: bool,
}

impl EvictOnDrop<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for EvictOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed && self.registry.evict(self.staff) {
            tracing::warn!(
                "Staff '{}' taken off duty, relay interrupted mid-exchange",
                self.staff.id()
            );
        }
    }
}
