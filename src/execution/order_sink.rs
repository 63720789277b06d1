use crate::models::OrderRequest;

/// Output capability for decided orders.
///
/// The engine hands each order over exactly once and never waits for
/// confirmation: transmission failures are the sink's problem and must not
/// feed back into the decision state. Live mode injects a venue-backed
/// sink, the accounting engine injects a recorder — the decision stack is
/// identical either way.
pub trait OrderSink {
    fn transmit_order(&mut self, order: OrderRequest);
}

/// Captures orders instead of transmitting them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    orders: Vec<OrderRequest>,
}

impl RecordingSink {
    /// Drain everything captured since the last call.
    pub fn take(&mut self) -> Vec<OrderRequest> {
        std::mem::take(&mut self.orders)
    }

    pub fn orders(&self) -> &[OrderRequest] {
        &self.orders
    }
}

impl OrderSink for RecordingSink {
    fn transmit_order(&mut self, order: OrderRequest) {
        self.orders.push(order);
    }
}
