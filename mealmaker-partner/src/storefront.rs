use chrono::{DateTime, TimeZone, Utc};
use mealmaker_store::codec::{new_object_id, parse_clock};
use mealmaker_store::{Collection, DocumentStore, Filter, SharedStore};
use serde::Serialize;
use tracing::instrument;

use crate::availability::{is_open, parse_weekday};
use crate::catalog::CatalogService;
use crate::models::{Accompaniment, Dish, Partner, Schedule, PARTNERS, PARTNER_SEQUENCE};
use crate::PartnerError;

#[derive(Debug, Clone, Default)]
pub struct NewPartner {
    pub name: String,
    pub cnpj: String,
    pub logo: String,
    pub schedules: Vec<Schedule>,
    pub delivery_fee: f64,
}

/// Aggregated storefront of one partner.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Storefront {
    pub name: String,
    pub cnpj: String,
    pub partner_id: i64,
    pub logo: String,
    pub delivery_fee: f64,
    pub is_open: bool,
    pub schedules: Vec<Schedule>,
    pub dishes: Vec<Dish>,
    pub accompaniments: Vec<Accompaniment>,
}

impl NewPartner {
    fn validate(&self) -> Result<(), PartnerError> {
        if self.name.trim().is_empty() {
            return Err(PartnerError::Validation("Campo obrigatório: name".into()));
        }
        if self.delivery_fee < 0.0 {
            return Err(PartnerError::Validation(
                "delivery_fee não pode ser negativo".into(),
            ));
        }
        for schedule in &self.schedules {
            if parse_weekday(&schedule.day_of_week).is_none() {
                return Err(PartnerError::Validation(format!(
                    "Dia da semana inválido: {}",
                    schedule.day_of_week
                )));
            }
            match (
                parse_clock(&schedule.start_time),
                parse_clock(&schedule.end_time),
            ) {
                (Ok(start), Ok(end)) if start < end => {}
                (Ok(_), Ok(_)) => {
                    return Err(PartnerError::Validation(format!(
                        "Horário de {} deve começar antes de terminar",
                        schedule.day_of_week
                    )))
                }
                (Err(err), _) | (_, Err(err)) => {
                    return Err(PartnerError::Validation(err.to_string()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PartnerService {
    store: SharedStore,
    partners: Collection<Partner>,
    catalog: CatalogService,
}

impl PartnerService {
    pub fn new(store: SharedStore, catalog: CatalogService) -> Self {
        Self {
            partners: Collection::new(store.clone(), PARTNERS),
            store,
            catalog,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: NewPartner) -> Result<Partner, PartnerError> {
        request.validate()?;
        let partner_id = self.store.next_sequence(PARTNER_SEQUENCE).await?;
        let now = Utc::now();
        let partner = Partner {
            id: new_object_id(),
            name: request.name,
            cnpj: request.cnpj,
            partner_id,
            logo: request.logo,
            schedules: request.schedules,
            delivery_fee: request.delivery_fee,
            created_at: now,
            updated_at: now,
        };
        self.partners.insert_one(&partner).await?;
        tracing::info!(partner_id, "partner created");
        Ok(partner)
    }

    pub async fn get(&self, partner_id: i64) -> Result<Partner, PartnerError> {
        self.partners
            .find_one(&Filter::new().eq("partner_id", partner_id))
            .await?
            .ok_or(PartnerError::PartnerNotFound)
    }

    /// Storefront as seen at `now`. Only active dishes and accompaniments
    /// are listed.
    #[instrument(skip(self, now))]
    pub async fn storefront<Tz>(
        &self,
        partner_id: i64,
        now: &DateTime<Tz>,
    ) -> Result<Storefront, PartnerError>
    where
        Tz: TimeZone,
    {
        let partner = self.get(partner_id).await?;
        let dishes = self.catalog.list_active_dishes().await?;
        let accompaniments = self.catalog.list_active_accompaniments().await?;

        Ok(Storefront {
            is_open: is_open(&partner.schedules, now),
            name: partner.name,
            cnpj: partner.cnpj,
            partner_id: partner.partner_id,
            logo: partner.logo,
            delivery_fee: partner.delivery_fee,
            schedules: partner.schedules,
            dishes,
            accompaniments,
        })
    }
}
