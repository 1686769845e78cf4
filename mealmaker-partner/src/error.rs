use mealmaker_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error("{0}")]
    Validation(String),
    #[error("Formato de ID inválido")]
    InvalidId,
    #[error("Não foi possível encontrar um parceiro com esse id")]
    PartnerNotFound,
    #[error("Não foi possível encontrar um prato com esse ID")]
    DishNotFound,
    #[error("Não foi possível encontrar um acompanhamento com esse ID")]
    AccompanimentNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
