use chrono::Utc;
use mealmaker_store::{Collection, DocumentStore, Filter, SharedStore, Sort, Update};
use tracing::instrument;

use crate::models::{Delivery, DELIVERIES, DELIVERY_SEQUENCE};
use crate::DeliveryError;

#[derive(Debug, Clone, Default)]
pub struct NewDelivery {
    pub name: String,
    pub phone_number: String,
}

pub type DeliveryUpdate = NewDelivery;

impl NewDelivery {
    fn validate(&self) -> Result<(), DeliveryError> {
        for (field, value) in [("name", &self.name), ("phone_number", &self.phone_number)] {
            if value.trim().is_empty() {
                return Err(DeliveryError::Validation(format!(
                    "Campo obrigatório: {field}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct DeliveryService {
    store: SharedStore,
    deliveries: Collection<Delivery>,
}

impl DeliveryService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            deliveries: Collection::new(store.clone(), DELIVERIES),
            store,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Delivery>, DeliveryError> {
        let sort = Sort::descending("created_at");
        Ok(self.deliveries.find(&Filter::new(), Some(&sort)).await?)
    }

    /// Missing ids yield `None`; callers decide whether that is an error.
    pub async fn find(&self, id: i64) -> Result<Option<Delivery>, DeliveryError> {
        Ok(self.deliveries.find_one(&Filter::by_id(id)).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: NewDelivery) -> Result<Delivery, DeliveryError> {
        request.validate()?;
        let id = self.store.next_sequence(DELIVERY_SEQUENCE).await?;
        let now = Utc::now();
        let delivery = Delivery {
            id,
            name: request.name,
            phone_number: request.phone_number,
            created_at: now,
            updated_at: now,
        };
        self.deliveries.insert_one(&delivery).await?;
        tracing::info!(delivery_id = id, "delivery person registered");
        Ok(delivery)
    }

    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i64, request: DeliveryUpdate) -> Result<(), DeliveryError> {
        request.validate()?;
        let update = Update::new()
            .set("name", request.name)
            .set("phone_number", request.phone_number)
            .set("updated_at", Utc::now().to_rfc3339());
        let result = self
            .deliveries
            .update_one(&Filter::by_id(id), &update, false)
            .await?;
        if result.matched == 0 {
            return Err(DeliveryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), DeliveryError> {
        match self.deliveries.delete_one(&Filter::by_id(id)).await? {
            0 => Err(DeliveryError::NotFound),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mealmaker_store::MemoryStore;

    use super::*;

    fn rider(name: &str) -> NewDelivery {
        NewDelivery {
            name: name.to_string(),
            phone_number: "+5511988887777".to_string(),
        }
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let service = DeliveryService::new(Arc::new(MemoryStore::new()));
        let first = service.create(rider("João")).await.unwrap();
        let second = service.create(rider("Ana")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        service.update(first.id, rider("João Pedro")).await.unwrap();
        let stored = service.find(first.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "João Pedro");

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);

        service.delete(first.id).await.unwrap();
        assert!(service.find(first.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete(first.id).await,
            Err(DeliveryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_and_invalid() {
        let service = DeliveryService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.update(42, rider("Ana")).await,
            Err(DeliveryError::NotFound)
        ));
        assert!(matches!(
            service.create(rider(" ")).await,
            Err(DeliveryError::Validation(_))
        ));
    }
}
