use crate::adapters::channel::{channel_request, ChannelPeer};
use crate::config::scenario::{OrderConfig, ScenarioConfig, StaffConfig};
use crate::core::dispatcher::{DispatchOutcome, Dispatcher, DispatcherConfig};
use crate::core::registry::StaffRegistry;
use crate::domain::model::{Payload, Scope, Specialities, TYPE_KEY};
use crate::utils::error::{DispatchError, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result handed back to a customer whose order was served.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub staff_id: String,
    pub result: Payload,
}

impl OrderReceipt {
    /// The result as compact JSON, as printed in shift reports.
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.result)?)
    }
}

#[derive(Debug)]
pub struct OrderReport {
    pub index: usize,
    pub speciality: Specialities,
    pub result: Result<OrderReceipt>,
}

#[derive(Debug)]
pub struct ShiftReport {
    pub kitchen: String,
    pub on_duty: Vec<String>,
    pub orders: Vec<OrderReport>,
}

impl ShiftReport {
    pub fn served_count(&self) -> usize {
        self.orders.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.orders.len() - self.served_count()
    }
}

/// Host runtime around a [`Dispatcher`]: staff are simulated workers running
/// as tasks, customers are in-memory channel requests.
pub struct Kitchen {
    dispatcher: Arc<Dispatcher>,
    workers: JoinSet<()>,
}

impl Kitchen {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            workers: JoinSet::new(),
        }
    }

    /// Brings a worker on duty. It answers every body `b` with `"<prefix>-b"`
    /// until its channel leaves the registry.
    pub async fn staff_on_duty(&mut self, staff: &StaffConfig) -> Result<DispatchOutcome> {
        let speciality = Value::from(Vec::<String>::from(staff.speciality.clone()));
        let (request, peer) = channel_request(Scope::staff_on_duty(&staff.id, speciality));

        let outcome = self.dispatcher.dispatch(request).await?;
        self.workers.spawn(cook(
            staff.id.clone(),
            staff.result_prefix().to_string(),
            peer,
        ));
        Ok(outcome)
    }

    pub async fn staff_off_duty(&self, id: &str) -> Result<DispatchOutcome> {
        let (request, _peer) = channel_request(Scope::staff_off_duty(id));
        self.dispatcher.dispatch(request).await
    }

    pub async fn place_order(&self, order: &OrderConfig) -> Result<OrderReceipt> {
        place_order(&self.dispatcher, &order.speciality, order.payload.clone()).await
    }

    /// Stops every worker task still running.
    pub async fn close(mut self) {
        self.workers.shutdown().await;
    }
}

/// Submits one order as a customer would: send the body, wait for the dish.
pub async fn place_order(
    dispatcher: &Dispatcher,
    speciality: &Specialities,
    payload: Payload,
) -> Result<OrderReceipt> {
    let scope = Scope::order(Value::from(Vec::<String>::from(speciality.clone())));
    let (request, mut peer) = channel_request(scope);

    peer.send(payload).await?;
    let staff_id = served_by(dispatcher.dispatch(request).await?)?;

    let result = peer
        .recv()
        .await
        .ok_or_else(|| DispatchError::channel("dispatcher closed without a result"))?;
    Ok(OrderReceipt { staff_id, result })
}

/// An order scope that classified as a duty event was never an order.
fn served_by(outcome: DispatchOutcome) -> Result<String> {
    match outcome {
        DispatchOutcome::Served { staff_id } => Ok(staff_id),
        other => Err(DispatchError::invalid_scope(
            TYPE_KEY,
            format!("order was not served: {:?}", other),
        )),
    }
}

async fn cook(id: String, prefix: String, mut peer: ChannelPeer) {
    while let Some(body) = peer.recv().await {
        let dish = match &body {
            Value::String(item) => format!("{}-{}", prefix, item),
            other => format!("{}-{}", prefix, other),
        };
        tracing::debug!("'{}' prepared {}", id, dish);
        if peer.send(Value::String(dish)).await.is_err() {
            break;
        }
    }
    tracing::debug!("'{}' left the kitchen", id);
}

/// Runs a whole shift: staff on duty, off-duty events, then every order at
/// once.
pub async fn run_scenario(scenario: &ScenarioConfig, config: DispatcherConfig) -> Result<ShiftReport> {
    let registry = Arc::new(StaffRegistry::new());
    let dispatcher = Arc::new(Dispatcher::with_config(registry.clone(), config));
    let mut kitchen = Kitchen::new(dispatcher.clone());

    for staff in &scenario.staff {
        kitchen.staff_on_duty(staff).await?;
    }
    for offduty in &scenario.offduty {
        kitchen.staff_off_duty(&offduty.id).await?;
    }
    tracing::info!(
        "{} staff on duty for {}: {}",
        registry.len(),
        scenario.kitchen_name(),
        registry.ids().join(", ")
    );

    let mut orders = JoinSet::new();
    for (index, order) in scenario.orders.iter().cloned().enumerate() {
        let dispatcher = dispatcher.clone();
        orders.spawn(async move {
            let result = place_order(&dispatcher, &order.speciality, order.payload).await;
            OrderReport {
                index,
                speciality: order.speciality,
                result,
            }
        });
    }

    let mut reports = Vec::with_capacity(scenario.orders.len());
    while let Some(joined) = orders.join_next().await {
        let report = joined.map_err(|e| DispatchError::channel(format!("order task failed: {}", e)))?;
        if let Err(e) = &report.result {
            tracing::warn!("Order #{} for {} failed: {}", report.index, report.speciality, e);
        }
        reports.push(report);
    }
    reports.sort_by_key(|report| report.index);

    let on_duty = registry.ids();
    kitchen.close().await;

    Ok(ShiftReport {
        kitchen: scenario.kitchen_name().to_string(),
        on_duty,
        orders: reports,
    })
}
