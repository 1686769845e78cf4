use mealmaker_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("{0}")]
    Validation(String),
    #[error("Entregador não encontrado")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
