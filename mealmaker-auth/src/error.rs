use mealmaker_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Formato de ID inválido")]
    InvalidId,
    #[error("Usuário já foi cadastrado com o mesmo número de telefone")]
    PhoneTaken,
    #[error("Não foi possível encontrar esse usuário pelo número de telefone")]
    UnknownPhone,
    #[error("Não foi possível encontrar esse usuário")]
    UserNotFound,
    #[error("Não foi possível realizar o login com essa combinação de senha")]
    InvalidCredentials,
    #[error("Authorization ausente no cabeçalho")]
    MissingAuthorization,
    #[error("Token Bearer ausente no cabeçalho Authorization")]
    MalformedAuthorization,
    #[error("Token inválido")]
    InvalidToken,
    #[error("Cannot hash password: {0}")]
    Hashing(String),
    #[error("Cannot issue token: {0}")]
    Issue(#[source] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
