use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use mealmaker_auth::{User, USERS};
use mealmaker_delivery::DeliveryService;
use mealmaker_store::codec::{day_bounds, parse_object_id};
use mealmaker_store::{Collection, DocumentStore, Filter, SharedStore, Sort, Update};
use tracing::instrument;

use crate::models::{
    Order, OrderLine, OrderStatus, OrderView, UserSnapshot, ORDERS, ORDER_SEQUENCE,
};
use crate::OrderError;

/// Partner that receives orders placed without one.
pub const DEFAULT_PARTNER_ID: i64 = 1;

#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    /// 0 selects [`DEFAULT_PARTNER_ID`].
    pub partner_id: i64,
    pub dishes: Vec<OrderLine>,
    pub payment_type: String,
    pub delivery_type: String,
    pub quantity_total: i32,
    pub total: f64,
}

#[derive(Clone)]
pub struct OrderService {
    store: SharedStore,
    orders: Collection<Order>,
    users: Collection<User>,
    deliveries: DeliveryService,
}

impl OrderService {
    pub fn new(store: SharedStore, deliveries: DeliveryService) -> Self {
        Self {
            orders: Collection::new(store.clone(), ORDERS),
            users: Collection::new(store.clone(), USERS),
            store,
            deliveries,
        }
    }

    /// Places an order for an existing user. Nothing is written when the
    /// user cannot be found.
    #[instrument(skip(self, request))]
    pub async fn create(&self, user_id: &str, request: NewOrder) -> Result<Order, OrderError> {
        parse_object_id(user_id).map_err(|_| OrderError::InvalidId)?;
        let user = self
            .users
            .find_one(&Filter::by_id(user_id))
            .await?
            .ok_or(OrderError::UserNotFound)?;

        let partner_id = match request.partner_id {
            0 => DEFAULT_PARTNER_ID,
            id => id,
        };
        let id = self.store.next_sequence(ORDER_SEQUENCE).await?;
        let now = Utc::now();
        let order = Order {
            id,
            user: UserSnapshot::from(&user),
            partner_id,
            dishes: request.dishes,
            status: OrderStatus::Sent,
            payment_type: request.payment_type,
            delivery_id: 0,
            delivery_type: request.delivery_type,
            quantity_total: request.quantity_total,
            total: request.total,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert_one(&order).await?;
        tracing::info!(order_id = id, partner_id, "order placed");
        Ok(order)
    }

    /// Writes `status` verbatim, whatever its value, and assigns the
    /// delivery person when one is given.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: i64,
        status: i64,
        delivery_id: Option<i64>,
    ) -> Result<(), OrderError> {
        let status = OrderStatus::from(status);
        if let OrderStatus::Unrecognized(code) = status {
            tracing::warn!(order_id, code, "storing unrecognized order status");
        }

        let mut update = Update::new()
            .set("status", status.code())
            .set("updated_at", Utc::now().to_rfc3339());
        if let Some(delivery_id) = delivery_id {
            update = update.set("delivery_id", delivery_id);
        }
        let result = self
            .orders
            .update_one(&Filter::by_id(order_id), &update, false)
            .await?;
        if result.matched == 0 {
            return Err(OrderError::OrderNotFound);
        }
        Ok(())
    }

    pub async fn get(&self, order_id: i64) -> Result<Order, OrderError> {
        self.orders
            .find_one(&Filter::by_id(order_id))
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Orders a partner received on the calendar day of `now`, newest first.
    /// In feed mode delivered orders are left out.
    ///
    /// Every assigned delivery person is joined in; if one of them no longer
    /// exists the whole listing fails.
    #[instrument(skip(self, now))]
    pub async fn list_by_partner<Tz>(
        &self,
        partner_id: i64,
        feed: bool,
        now: &DateTime<Tz>,
    ) -> Result<Vec<OrderView>, OrderError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let (start, end) = day_bounds(now);
        let mut filter = Filter::new()
            .eq("partner_id", partner_id)
            .gte("created_at", start.to_rfc3339())
            .lt("created_at", end.to_rfc3339());
        if feed {
            filter = filter.ne("status", OrderStatus::Delivered.code());
        }
        let sort = Sort::descending("created_at");
        let orders = self.orders.find(&filter, Some(&sort)).await?;

        let tz = now.timezone();
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let delivery = match order.delivery_id {
                0 => None,
                id => Some(
                    self.deliveries
                        .find(id)
                        .await?
                        .ok_or(OrderError::DeliveryNotFound(id))?,
                ),
            };
            views.push(OrderView::render(order, delivery, &tz));
        }
        Ok(views)
    }

    /// Every order of a user, newest first, rendered in `tz`.
    #[instrument(skip(self, tz))]
    pub async fn list_by_user<Tz>(
        &self,
        user_id: &str,
        tz: &Tz,
    ) -> Result<Vec<OrderView>, OrderError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        parse_object_id(user_id).map_err(|_| OrderError::InvalidId)?;
        let sort = Sort::descending("created_at");
        let orders = self
            .orders
            .find(&Filter::new().eq("user._id", user_id), Some(&sort))
            .await?;
        Ok(orders
            .into_iter()
            .map(|order| OrderView::render(order, None, tz))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::{FixedOffset, TimeDelta};
    use mealmaker_auth::Address;
    use mealmaker_delivery::NewDelivery;
    use mealmaker_store::codec::new_object_id;
    use mealmaker_store::MemoryStore;

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: OrderService,
        user: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = OrderService::new(store.clone(), DeliveryService::new(store.clone()));
        let now = Utc::now();
        let user = User {
            id: new_object_id(),
            name: "Maria".to_string(),
            phone_number: "+5511999999999".to_string(),
            password: "c2VjcmV0MQ==".to_string(),
            partner_id: 1,
            address: Address {
                street: "Rua Augusta".to_string(),
                ..Default::default()
            },
            role: Default::default(),
            created_at: now,
            updated_at: now,
        };
        service.users.insert_one(&user).await.unwrap();
        Fixture {
            store,
            service,
            user,
        }
    }

    fn request() -> NewOrder {
        NewOrder {
            dishes: vec![OrderLine {
                id: new_object_id(),
                title: "Feijoada".to_string(),
                price: 42.9,
                quantity: 2,
                ..Default::default()
            }],
            payment_type: "pix".to_string(),
            delivery_type: "delivery".to_string(),
            quantity_total: 2,
            // Client totals are stored as sent.
            total: 1.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_snapshots_user_without_password() {
        let f = fixture().await;
        let order = f.service.create(&f.user.id, request()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Sent);
        assert_eq!(order.partner_id, DEFAULT_PARTNER_ID);
        assert_eq!(order.delivery_id, 0);
        assert_eq!(order.total, 1.0);
        assert_eq!(order.user.address.street, "Rua Augusta");

        let stored = f
            .store
            .find_one(ORDERS, &Filter::by_id(order.id))
            .await
            .unwrap()
            .unwrap();
        assert!(stored["user"].get("password").is_none());
        assert_eq!(f.service.get(order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_sequential_ids_increase() {
        let f = fixture().await;
        let mut last = 0;
        for _ in 0..5 {
            let order = f.service.create(&f.user.id, request()).await.unwrap();
            assert!(order.id > last);
            last = order.id;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creations_get_distinct_ids() {
        let f = fixture().await;
        let handles: Vec<_> = (0..24)
            .map(|_| {
                let service = f.service.clone();
                let user_id = f.user.id.clone();
                tokio::spawn(async move { service.create(&user_id, request()).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let order = handle.await.unwrap().unwrap();
            assert!(ids.insert(order.id));
        }
        assert_eq!(ids.len(), 24);
        assert_eq!(f.store.count(ORDERS).await, 24);
    }

    #[tokio::test]
    async fn test_unknown_user_persists_nothing() {
        let f = fixture().await;
        let missing = f.service.create(&new_object_id(), request()).await;
        assert!(matches!(missing, Err(OrderError::UserNotFound)));
        let malformed = f.service.create("nope", request()).await;
        assert!(matches!(malformed, Err(OrderError::InvalidId)));
        assert_eq!(f.store.count(ORDERS).await, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_status_is_stored_verbatim() {
        let f = fixture().await;
        let order = f.service.create(&f.user.id, request()).await.unwrap();
        f.service.update_status(order.id, 42, None).await.unwrap();
        let stored = f.service.get(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Unrecognized(42));
        assert_eq!(stored.status.code(), 42);

        f.service
            .update_status(order.id, 5_000_000_000, None)
            .await
            .unwrap();
        let stored = f.service.get(order.id).await.unwrap();
        assert_eq!(stored.status.code(), 5_000_000_000);

        assert!(matches!(
            f.service.update_status(order.id + 100, 1, None).await,
            Err(OrderError::OrderNotFound)
        ));
    }

    #[tokio::test]
    async fn test_partner_listing_joins_delivery() {
        let f = fixture().await;
        let rider = f
            .service
            .deliveries
            .create(NewDelivery {
                name: "João".to_string(),
                phone_number: "+5511988887777".to_string(),
            })
            .await
            .unwrap();
        let order = f.service.create(&f.user.id, request()).await.unwrap();
        f.service
            .update_status(order.id, 2, Some(rider.id))
            .await
            .unwrap();

        let views = f
            .service
            .list_by_partner(DEFAULT_PARTNER_ID, false, &order.created_at)
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].status, "Pedido Saiu para Entrega");
        assert_eq!(views[0].delivery.as_ref().map(|d| d.id), Some(rider.id));

        f.service.deliveries.delete(rider.id).await.unwrap();
        let broken = f
            .service
            .list_by_partner(DEFAULT_PARTNER_ID, false, &order.created_at)
            .await;
        assert!(matches!(broken, Err(OrderError::DeliveryNotFound(id)) if id == rider.id));
    }

    #[tokio::test]
    async fn test_partner_listing_is_limited_to_today_and_feed() {
        let f = fixture().await;
        let today = f.service.create(&f.user.id, request()).await.unwrap();
        let delivered = f.service.create(&f.user.id, request()).await.unwrap();
        f.service.update_status(delivered.id, 3, None).await.unwrap();

        let mut stale = today.clone();
        stale.id = 999;
        stale.created_at = today.created_at - TimeDelta::days(1);
        f.service.orders.insert_one(&stale).await.unwrap();

        let mut elsewhere = today.clone();
        elsewhere.id = 1000;
        elsewhere.partner_id = 7;
        f.service.orders.insert_one(&elsewhere).await.unwrap();

        let all = f
            .service
            .list_by_partner(DEFAULT_PARTNER_ID, false, &today.created_at)
            .await
            .unwrap();
        let ids: HashSet<i64> = all.iter().map(|view| view.id).collect();
        assert_eq!(ids, HashSet::from([today.id, delivered.id]));

        let feed = f
            .service
            .list_by_partner(DEFAULT_PARTNER_ID, true, &today.created_at)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, today.id);
    }

    #[tokio::test]
    async fn test_user_listing_renders_local_time() {
        let f = fixture().await;
        let order = f.service.create(&f.user.id, request()).await.unwrap();
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let views = f.service.list_by_user(&f.user.id, &brt).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].status, "Pedido Enviado");
        assert_eq!(
            views[0].created_at,
            order
                .created_at
                .with_timezone(&brt)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        );
        assert!(f
            .service
            .list_by_user(&new_object_id(), &brt)
            .await
            .unwrap()
            .is_empty());
    }
}
