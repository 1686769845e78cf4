use chrono::Utc;
use mealmaker_store::codec::{new_object_id, parse_object_id};
use mealmaker_store::{Collection, Filter, SharedStore, Sort, Update};
use tracing::instrument;

use crate::models::{Accompaniment, Dish, Menu, ACCOMPANIMENTS, DISHES, MENUS};
use crate::PartnerError;

const MAX_TITLE_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct NewDish {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub serves: i32,
    pub img_url: String,
    pub active: Option<bool>,
    pub max_accompaniments_count: i32,
    pub accompaniments: Vec<String>,
}

/// Partial dish update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct DishPatch {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub serves: Option<i32>,
    pub img_url: Option<String>,
    pub active: Option<bool>,
    pub max_accompaniments_count: Option<i32>,
    pub accompaniments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAccompaniment {
    pub title: String,
    pub category: String,
    pub price: f64,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AccompanimentUpsert {
    pub id: Option<String>,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: u64,
    pub updated: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NewMenu {
    pub name: String,
    pub small_description: String,
    pub partner_id: i64,
    pub dish_ids: Vec<String>,
}

fn invalid(message: impl Into<String>) -> PartnerError {
    PartnerError::Validation(message.into())
}

fn check_title(title: &str) -> Result<(), PartnerError> {
    if title.trim().is_empty() {
        return Err(invalid("Campo obrigatório: title"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(invalid(format!(
            "title deve ter no máximo {MAX_TITLE_LEN} caracteres"
        )));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), PartnerError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(invalid("price deve ser maior que zero"));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), PartnerError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(invalid(format!(
            "description deve ter no máximo {MAX_DESCRIPTION_LEN} caracteres"
        )));
    }
    Ok(())
}

fn check_id(id: &str) -> Result<(), PartnerError> {
    parse_object_id(id)
        .map(|_| ())
        .map_err(|_| PartnerError::InvalidId)
}

impl NewDish {
    fn validate(&self) -> Result<(), PartnerError> {
        check_title(&self.title)?;
        check_price(self.price)?;
        check_description(&self.description)
    }
}

impl DishPatch {
    fn validate(&self) -> Result<(), PartnerError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(())
    }

    fn into_update(self) -> Update {
        let mut update = Update::new();
        if let Some(title) = self.title {
            update = update.set("title", title);
        }
        if let Some(price) = self.price {
            update = update.set("price", price);
        }
        if let Some(description) = self.description {
            update = update.set("description", description);
        }
        if let Some(serves) = self.serves {
            update = update.set("serves", serves);
        }
        if let Some(img_url) = self.img_url {
            update = update.set("img_url", img_url);
        }
        if let Some(active) = self.active {
            update = update.set("active", active);
        }
        if let Some(count) = self.max_accompaniments_count {
            update = update.set("max_accompaniments_count", count);
        }
        if let Some(accompaniments) = self.accompaniments {
            update = update.set("accompaniments", accompaniments);
        }
        update.set("updated_at", Utc::now().to_rfc3339())
    }
}

/// Dishes, accompaniments and menus.
#[derive(Clone)]
pub struct CatalogService {
    dishes: Collection<Dish>,
    accompaniments: Collection<Accompaniment>,
    menus: Collection<Menu>,
}

impl CatalogService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            dishes: Collection::new(store.clone(), DISHES),
            accompaniments: Collection::new(store.clone(), ACCOMPANIMENTS),
            menus: Collection::new(store, MENUS),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_dishes(&self) -> Result<Vec<Dish>, PartnerError> {
        let sort = Sort::descending("created_at");
        Ok(self.dishes.find(&Filter::new(), Some(&sort)).await?)
    }

    pub async fn list_active_dishes(&self) -> Result<Vec<Dish>, PartnerError> {
        let sort = Sort::descending("created_at");
        Ok(self
            .dishes
            .find(&Filter::new().eq("active", true), Some(&sort))
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_dish(&self, id: &str) -> Result<Dish, PartnerError> {
        check_id(id)?;
        self.dishes
            .find_one(&Filter::by_id(id))
            .await?
            .ok_or(PartnerError::DishNotFound)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_dish(&self, request: NewDish) -> Result<Dish, PartnerError> {
        request.validate()?;
        let now = Utc::now();
        let dish = Dish {
            id: new_object_id(),
            title: request.title,
            price: request.price,
            description: request.description,
            serves: request.serves,
            img_url: request.img_url,
            active: request.active.unwrap_or(true),
            max_accompaniments_count: request.max_accompaniments_count,
            accompaniments: request.accompaniments,
            created_at: now,
            updated_at: now,
        };
        self.dishes.insert_one(&dish).await?;
        Ok(dish)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_dish(&self, id: &str, patch: DishPatch) -> Result<(), PartnerError> {
        check_id(id)?;
        patch.validate()?;
        let result = self
            .dishes
            .update_one(&Filter::by_id(id), &patch.into_update(), false)
            .await?;
        if result.matched == 0 {
            return Err(PartnerError::DishNotFound);
        }
        Ok(())
    }

    /// Menus that already copied this dish keep their snapshot.
    #[instrument(skip(self))]
    pub async fn delete_dish(&self, id: &str) -> Result<(), PartnerError> {
        check_id(id)?;
        match self.dishes.delete_one(&Filter::by_id(id)).await? {
            0 => Err(PartnerError::DishNotFound),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_accompaniments(&self) -> Result<Vec<Accompaniment>, PartnerError> {
        let sort = Sort::descending("created_at");
        Ok(self.accompaniments.find(&Filter::new(), Some(&sort)).await?)
    }

    pub async fn list_active_accompaniments(&self) -> Result<Vec<Accompaniment>, PartnerError> {
        let sort = Sort::descending("created_at");
        Ok(self
            .accompaniments
            .find(&Filter::new().eq("active", true), Some(&sort))
            .await?)
    }

    /// Validates the whole batch before writing any of it.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn create_accompaniments(
        &self,
        requests: Vec<NewAccompaniment>,
    ) -> Result<Vec<Accompaniment>, PartnerError> {
        if requests.is_empty() {
            return Err(invalid("Nenhum acompanhamento informado"));
        }
        for request in &requests {
            check_title(&request.title)?;
        }

        let now = Utc::now();
        let records: Vec<Accompaniment> = requests
            .into_iter()
            .map(|request| Accompaniment {
                id: new_object_id(),
                title: request.title,
                category: request.category,
                price: request.price,
                active: request.active.unwrap_or(true),
                created_at: now,
                updated_at: now,
            })
            .collect();
        self.accompaniments.insert_many(&records).await?;
        Ok(records)
    }

    /// Entries with a known id are updated in place; entries without an id,
    /// or with an id not yet stored, are inserted.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn upsert_accompaniments(
        &self,
        requests: Vec<AccompanimentUpsert>,
    ) -> Result<UpsertSummary, PartnerError> {
        for request in &requests {
            check_title(&request.title)?;
            if let Some(id) = &request.id {
                check_id(id)?;
            }
        }

        let mut summary = UpsertSummary::default();
        for request in requests {
            let now = Utc::now();
            if let Some(id) = &request.id {
                let mut update = Update::new()
                    .set("title", request.title.as_str())
                    .set("category", request.category.as_str())
                    .set("price", request.price)
                    .set("updated_at", now.to_rfc3339());
                if let Some(active) = request.active {
                    update = update.set("active", active);
                }
                let result = self
                    .accompaniments
                    .update_one(&Filter::by_id(id.as_str()), &update, false)
                    .await?;
                if result.matched > 0 {
                    summary.updated += 1;
                    continue;
                }
            }

            let record = Accompaniment {
                id: request.id.unwrap_or_else(new_object_id),
                title: request.title,
                category: request.category,
                price: request.price,
                active: request.active.unwrap_or(true),
                created_at: now,
                updated_at: now,
            };
            self.accompaniments.insert_one(&record).await?;
            summary.inserted += 1;
        }
        Ok(summary)
    }

    #[instrument(skip(self))]
    pub async fn delete_accompaniment(&self, id: &str) -> Result<(), PartnerError> {
        check_id(id)?;
        match self.accompaniments.delete_one(&Filter::by_id(id)).await? {
            0 => Err(PartnerError::AccompanimentNotFound),
            _ => Ok(()),
        }
    }

    /// Copies the referenced dishes into the new menu, in request order.
    #[instrument(skip(self, request), fields(partner_id = request.partner_id))]
    pub async fn create_menu(&self, request: NewMenu) -> Result<Menu, PartnerError> {
        if request.name.trim().is_empty() {
            return Err(invalid("Campo obrigatório: name"));
        }
        if request.partner_id <= 0 {
            return Err(invalid("Campo obrigatório: partner_id"));
        }

        let mut dishes = Vec::with_capacity(request.dish_ids.len());
        for id in &request.dish_ids {
            dishes.push(self.get_dish(id).await?);
        }

        let now = Utc::now();
        let menu = Menu {
            id: new_object_id(),
            name: request.name,
            small_description: request.small_description,
            partner_id: request.partner_id,
            dishes,
            created_at: now,
            updated_at: now,
        };
        self.menus.insert_one(&menu).await?;
        Ok(menu)
    }

    #[instrument(skip(self))]
    pub async fn list_menus(&self, partner_id: i64) -> Result<Vec<Menu>, PartnerError> {
        let sort = Sort::descending("created_at");
        Ok(self
            .menus
            .find(&Filter::new().eq("partner_id", partner_id), Some(&sort))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mealmaker_store::MemoryStore;

    use super::*;

    fn catalog() -> (Arc<MemoryStore>, CatalogService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), CatalogService::new(store))
    }

    fn feijoada() -> NewDish {
        NewDish {
            title: "Feijoada".to_string(),
            price: 42.9,
            description: "Com arroz, couve e farofa".to_string(),
            serves: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_dish_validates() {
        let (store, catalog) = catalog();
        let long_title = NewDish {
            title: "x".repeat(51),
            ..feijoada()
        };
        assert!(matches!(
            catalog.create_dish(long_title).await,
            Err(PartnerError::Validation(_))
        ));
        let free = NewDish {
            price: 0.0,
            ..feijoada()
        };
        assert!(matches!(
            catalog.create_dish(free).await,
            Err(PartnerError::Validation(_))
        ));
        let verbose = NewDish {
            description: "x".repeat(201),
            ..feijoada()
        };
        assert!(matches!(
            catalog.create_dish(verbose).await,
            Err(PartnerError::Validation(_))
        ));
        assert_eq!(store.count(DISHES).await, 0);

        let dish = catalog.create_dish(feijoada()).await.unwrap();
        assert!(dish.active);
        assert_eq!(catalog.get_dish(&dish.id).await.unwrap(), dish);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let (_, catalog) = catalog();
        let dish = catalog.create_dish(feijoada()).await.unwrap();
        catalog
            .update_dish(
                &dish.id,
                DishPatch {
                    price: Some(39.9),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let stored = catalog.get_dish(&dish.id).await.unwrap();
        assert_eq!(stored.price, 39.9);
        assert!(!stored.active);
        assert_eq!(stored.title, dish.title);
        assert_eq!(stored.description, dish.description);
        assert!(stored.updated_at >= dish.updated_at);

        let missing = catalog
            .update_dish(&new_object_id(), DishPatch::default())
            .await;
        assert!(matches!(missing, Err(PartnerError::DishNotFound)));
    }

    #[tokio::test]
    async fn test_delete_dish() {
        let (_, catalog) = catalog();
        let dish = catalog.create_dish(feijoada()).await.unwrap();
        assert!(matches!(
            catalog.delete_dish("123").await,
            Err(PartnerError::InvalidId)
        ));
        catalog.delete_dish(&dish.id).await.unwrap();
        assert!(matches!(
            catalog.delete_dish(&dish.id).await,
            Err(PartnerError::DishNotFound)
        ));
    }

    #[tokio::test]
    async fn test_accompaniment_batch_upsert() {
        let (store, catalog) = catalog();
        let created = catalog
            .create_accompaniments(vec![
                NewAccompaniment {
                    title: "Farofa".to_string(),
                    category: "Guarnição".to_string(),
                    ..Default::default()
                },
                NewAccompaniment {
                    title: "Vinagrete".to_string(),
                    category: "Salada".to_string(),
                    ..Default::default()
                },
            ])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);

        let summary = catalog
            .upsert_accompaniments(vec![
                AccompanimentUpsert {
                    id: Some(created[0].id.clone()),
                    title: "Farofa de bacon".to_string(),
                    category: "Guarnição".to_string(),
                    price: 4.0,
                    active: Some(false),
                },
                AccompanimentUpsert {
                    title: "Couve".to_string(),
                    ..Default::default()
                },
            ])
            .await
            .unwrap();
        assert_eq!(
            summary,
            UpsertSummary {
                inserted: 1,
                updated: 1
            }
        );
        assert_eq!(store.count(ACCOMPANIMENTS).await, 3);
        assert_eq!(catalog.list_active_accompaniments().await.unwrap().len(), 2);

        catalog
            .delete_accompaniment(&created[1].id)
            .await
            .unwrap();
        assert!(matches!(
            catalog.delete_accompaniment(&created[1].id).await,
            Err(PartnerError::AccompanimentNotFound)
        ));
    }

    #[tokio::test]
    async fn test_invalid_batch_writes_nothing() {
        let (store, catalog) = catalog();
        let result = catalog
            .create_accompaniments(vec![
                NewAccompaniment {
                    title: "Farofa".to_string(),
                    ..Default::default()
                },
                NewAccompaniment::default(),
            ])
            .await;
        assert!(matches!(result, Err(PartnerError::Validation(_))));
        assert_eq!(store.count(ACCOMPANIMENTS).await, 0);
    }

    #[tokio::test]
    async fn test_menu_copies_dish_snapshots() {
        let (_, catalog) = catalog();
        let dish = catalog.create_dish(feijoada()).await.unwrap();
        let menu = catalog
            .create_menu(NewMenu {
                name: "Almoço".to_string(),
                partner_id: 1,
                dish_ids: vec![dish.id.clone()],
                ..Default::default()
            })
            .await
            .unwrap();
        catalog.delete_dish(&dish.id).await.unwrap();

        let menus = catalog.list_menus(1).await.unwrap();
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].id, menu.id);
        assert_eq!(menus[0].dishes, vec![dish]);
        assert!(catalog.list_menus(2).await.unwrap().is_empty());

        let dangling = catalog
            .create_menu(NewMenu {
                name: "Jantar".to_string(),
                partner_id: 1,
                dish_ids: vec![new_object_id()],
                ..Default::default()
            })
            .await;
        assert!(matches!(dangling, Err(PartnerError::DishNotFound)));
    }
}
