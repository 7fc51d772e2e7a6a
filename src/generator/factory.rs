//! Randomized order construction

use crate::model::{EventEnvelope, LineItem, Order, OrderStatus, Warehouse};
use chrono::{DateTime, SubsecRound, Utc};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Builds synthetic orders from a random source
///
/// All randomness, including order and event ids, is drawn from the
/// wrapped generator, so a seeded factory reproduces the same orders.
#[derive(Debug)]
pub struct OrderFactory<R: Rng> {
    rng: R,
}

impl OrderFactory<SmallRng> {
    /// Factory seeded from the OS, or from `seed` when given
    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> OrderFactory<R> {
    const MAX_ITEMS: usize = 4;
    const MIN_PRICE_CENTS: i64 = 500;
    const MAX_PRICE_CENTS: i64 = 20_000;

    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// A version 4 uuid from the factory's random source
    fn next_uuid(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    fn make_item(&mut self) -> LineItem {
        let cents = self
            .rng
            .random_range(Self::MIN_PRICE_CENTS..=Self::MAX_PRICE_CENTS);
        LineItem {
            sku: format!("SKU-{}", self.rng.random_range(100..=999)),
            qty: self.rng.random_range(1..=3),
            price: Decimal::new(cents, 2),
        }
    }

    /// Build one order created at `now` (truncated to microseconds)
    pub fn make_order(&mut self, now: DateTime<Utc>) -> Order {
        let hex = self.next_uuid().simple().to_string().to_uppercase();
        let order_id = format!("ORD-{}", &hex[..8]);
        let customer_id = format!("CUST-{}", self.rng.random_range(1000..=9999));

        let item_count = self.rng.random_range(1..=Self::MAX_ITEMS);
        let items = (0..item_count).map(|_| self.make_item()).collect();

        let status = *OrderStatus::ALL
            .choose(&mut self.rng)
            .unwrap_or(&OrderStatus::Placed);
        let warehouse = *Warehouse::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Warehouse::Wh1);

        Order::new(
            order_id,
            now.trunc_subsecs(6),
            customer_id,
            items,
            status,
            warehouse,
        )
    }

    /// Build an order and wrap it in its creation event
    pub fn make_event(&mut self, now: DateTime<Utc>) -> EventEnvelope {
        let order = self.make_order(now);
        let event_id = self.next_uuid();
        EventEnvelope::created(order, event_id)
    }
}
