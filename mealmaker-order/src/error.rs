use mealmaker_delivery::DeliveryError;
use mealmaker_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Formato de ID inválido")]
    InvalidId,
    #[error("Não foi possível encontrar esse usuário")]
    UserNotFound,
    #[error("Pedido não encontrado")]
    OrderNotFound,
    #[error("Não foi possível encontrar a entrega com o ID fornecido.")]
    DeliveryNotFound(i64),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
