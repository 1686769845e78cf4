use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use mealmaker_store::codec::{new_object_id, parse_object_id};
use mealmaker_store::{Collection, Filter, SharedStore, Update};
use tracing::instrument;

use crate::models::{Address, Role, User, DEFAULT_PARTNER_ID, USERS};
use crate::password::PasswordScheme;
use crate::token::{Claims, TokenIssuer};
use crate::AuthError;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub phone_number: String,
    pub password: String,
    pub address: Address,
}

#[derive(Debug, Clone)]
pub struct SignIn {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub password: String,
    pub new_password: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    /// Full header value, `Bearer <jwt>`.
    pub access_token: String,
    pub name: String,
    pub phone_number: String,
    pub partner_id: i64,
    /// Seconds.
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct UserService {
    users: Collection<User>,
    tokens: Arc<TokenIssuer>,
    scheme: PasswordScheme,
    session_expires_in: TimeDelta,
}

fn require(value: &str, field: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("Campo obrigatório: {field}")));
    }
    Ok(())
}

fn require_password(value: &str, field: &str) -> Result<(), AuthError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "{field} deve ter pelo menos {MIN_PASSWORD_LEN} caracteres"
        )));
    }
    Ok(())
}

impl UserService {
    pub fn new(
        store: SharedStore,
        tokens: Arc<TokenIssuer>,
        scheme: PasswordScheme,
        session_expires_in: TimeDelta,
    ) -> Self {
        Self {
            users: Collection::new(store, USERS),
            tokens,
            scheme,
            session_expires_in,
        }
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .find_one(&Filter::new().eq("phone_number", phone_number))
            .await?)
    }

    #[instrument(skip(self, request), fields(phone_number = %request.phone_number))]
    pub async fn sign_up(&self, request: SignUp) -> Result<User, AuthError> {
        require(&request.name, "name")?;
        require(&request.phone_number, "phone_number")?;
        require_password(&request.password, "password")?;

        if self.find_by_phone(&request.phone_number).await?.is_some() {
            return Err(AuthError::PhoneTaken);
        }

        let now = Utc::now();
        let user = User {
            id: new_object_id(),
            name: request.name,
            phone_number: request.phone_number,
            password: self.scheme.encode(&request.password)?,
            partner_id: DEFAULT_PARTNER_ID,
            address: request.address,
            role: Role::Client,
            created_at: now,
            updated_at: now,
        };
        self.users.insert_one(&user).await?;
        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    #[instrument(skip(self, request), fields(phone_number = %request.phone_number))]
    pub async fn sign_in(&self, request: SignIn) -> Result<Session, AuthError> {
        require(&request.phone_number, "phone_number")?;
        require_password(&request.password, "password")?;

        let user = self
            .find_by_phone(&request.phone_number)
            .await?
            .ok_or(AuthError::UnknownPhone)?;
        if !PasswordScheme::verify(&user.password, &request.password) {
            return Err(AuthError::InvalidCredentials);
        }

        if self.scheme.needs_rehash(&user.password) {
            let update = Update::new()
                .set("password", self.scheme.encode(&request.password)?)
                .set("updated_at", Utc::now().to_rfc3339());
            self.users
                .update_one(&Filter::by_id(user.id.as_str()), &update, false)
                .await?;
            tracing::info!(user_id = %user.id, scheme = %self.scheme, "password re-encoded");
        }

        let token = self.tokens.issue(&user.phone_number, Role::Client)?;
        Ok(Session {
            user_id: user.id,
            access_token: format!("Bearer {token}"),
            name: user.name,
            phone_number: user.phone_number,
            partner_id: user.partner_id,
            expires_in: self.session_expires_in.num_seconds(),
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_password(
        &self,
        phone_number: &str,
        request: PasswordChange,
    ) -> Result<(), AuthError> {
        require(phone_number, "phone_number")?;
        require_password(&request.password, "password")?;
        require_password(&request.new_password, "new_password")?;

        let user = self
            .find_by_phone(phone_number)
            .await?
            .ok_or(AuthError::UnknownPhone)?;
        if !PasswordScheme::verify(&user.password, &request.password) {
            return Err(AuthError::InvalidCredentials);
        }

        let update = Update::new()
            .set("password", self.scheme.encode(&request.new_password)?)
            .set("updated_at", Utc::now().to_rfc3339());
        self.users
            .update_one(&Filter::by_id(user.id.as_str()), &update, false)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.find(&Filter::new(), None).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> Result<User, AuthError> {
        parse_object_id(user_id).map_err(|_| AuthError::InvalidId)?;
        self.users
            .find_one(&Filter::by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    #[instrument(skip(self, address))]
    pub async fn update_address(&self, user_id: &str, address: Address) -> Result<User, AuthError> {
        parse_object_id(user_id).map_err(|_| AuthError::InvalidId)?;
        let update = Update::new()
            .set("address.cep", address.cep.as_str())
            .set("address.reference", address.reference.as_str())
            .set("address.city", address.city.as_str())
            .set("address.complement", address.complement.as_str())
            .set("address.street", address.street.as_str())
            .set("updated_at", Utc::now().to_rfc3339());
        let result = self
            .users
            .update_one(&Filter::by_id(user_id), &update, false)
            .await?;
        if result.matched == 0 {
            return Err(AuthError::UserNotFound);
        }
        self.get(user_id).await
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use mealmaker_store::MemoryStore;

    use super::*;

    fn service(scheme: PasswordScheme) -> (Arc<MemoryStore>, UserService) {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenIssuer::new(b"test-secret", TimeDelta::hours(1)));
        let service = UserService::new(store.clone(), tokens, scheme, TimeDelta::days(30));
        (store, service)
    }

    fn sign_up(phone_number: &str) -> SignUp {
        SignUp {
            name: "Maria".to_string(),
            phone_number: phone_number.to_string(),
            password: "secret1".to_string(),
            address: Address {
                city: "São Paulo".to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_sign_up_stores_encoded_password() {
        let (_, service) = service(PasswordScheme::LegacyBase64);
        let user = service.sign_up(sign_up("+5511999999999")).await.unwrap();
        assert_eq!(user.password, "c2VjcmV0MQ==");
        assert_eq!(user.partner_id, DEFAULT_PARTNER_ID);
        assert_eq!(service.get(&user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_rejected_without_insert() {
        let (store, service) = service(PasswordScheme::LegacyBase64);
        service.sign_up(sign_up("+5511999999999")).await.unwrap();
        let result = service.sign_up(sign_up("+5511999999999")).await;
        assert!(matches!(result, Err(AuthError::PhoneTaken)));
        assert_eq!(store.count(USERS).await, 1);
    }

    #[tokio::test]
    async fn test_sign_up_validates_fields() {
        let (store, service) = service(PasswordScheme::LegacyBase64);
        let mut short = sign_up("+5511999999999");
        short.password = "12345".to_string();
        assert!(matches!(
            service.sign_up(short).await,
            Err(AuthError::Validation(_))
        ));
        let mut nameless = sign_up("+5511999999999");
        nameless.name = " ".to_string();
        assert!(matches!(
            service.sign_up(nameless).await,
            Err(AuthError::Validation(_))
        ));
        assert_eq!(store.count(USERS).await, 0);
    }

    #[tokio::test]
    async fn test_sign_in_issues_bearer_session() {
        let (_, service) = service(PasswordScheme::LegacyBase64);
        let user = service.sign_up(sign_up("+5511999999999")).await.unwrap();
        let session = service
            .sign_in(SignIn {
                phone_number: "+5511999999999".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.expires_in, 30 * 24 * 3600);
        let token = session.access_token.strip_prefix("Bearer ").unwrap();
        let claims = service.verify_token(token).unwrap();
        assert_eq!(claims.sub, "+5511999999999");
    }

    #[tokio::test]
    async fn test_sign_in_failures() {
        let (_, service) = service(PasswordScheme::LegacyBase64);
        service.sign_up(sign_up("+5511999999999")).await.unwrap();
        let wrong = service
            .sign_in(SignIn {
                phone_number: "+5511999999999".to_string(),
                password: "secret2".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
        let unknown = service
            .sign_in(SignIn {
                phone_number: "+5511000000000".to_string(),
                password: "secret1".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(AuthError::UnknownPhone)));
    }

    #[tokio::test]
    async fn test_legacy_password_upgraded_on_sign_in() {
        let (store, legacy) = service(PasswordScheme::LegacyBase64);
        let user = legacy.sign_up(sign_up("+5511999999999")).await.unwrap();

        let tokens = Arc::new(TokenIssuer::new(b"test-secret", TimeDelta::hours(1)));
        let upgraded = UserService::new(
            store.clone(),
            tokens,
            PasswordScheme::Argon2,
            TimeDelta::days(30),
        );
        let request = SignIn {
            phone_number: "+5511999999999".to_string(),
            password: "secret1".to_string(),
        };
        upgraded.sign_in(request.clone()).await.unwrap();
        let stored = upgraded.get(&user.id).await.unwrap();
        assert!(stored.password.starts_with("$argon2"));
        upgraded.sign_in(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_password_requires_current_password() {
        let (_, service) = service(PasswordScheme::LegacyBase64);
        service.sign_up(sign_up("+5511999999999")).await.unwrap();
        let denied = service
            .update_password(
                "+5511999999999",
                PasswordChange {
                    password: "wrong-one".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await;
        assert!(matches!(denied, Err(AuthError::InvalidCredentials)));

        service
            .update_password(
                "+5511999999999",
                PasswordChange {
                    password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap();
        let session = service
            .sign_in(SignIn {
                phone_number: "+5511999999999".to_string(),
                password: "secret2".to_string(),
            })
            .await;
        assert!(session.is_ok());
    }

    #[tokio::test]
    async fn test_get_and_update_address() {
        let (_, service) = service(PasswordScheme::LegacyBase64);
        assert!(matches!(
            service.get("not-an-id").await,
            Err(AuthError::InvalidId)
        ));
        assert!(matches!(
            service.get(&new_object_id()).await,
            Err(AuthError::UserNotFound)
        ));

        let user = service.sign_up(sign_up("+5511999999999")).await.unwrap();
        let address = Address {
            cep: "01001-000".to_string(),
            street: "Praça da Sé".to_string(),
            city: "São Paulo".to_string(),
            ..Default::default()
        };
        let updated = service
            .update_address(&user.id, address.clone())
            .await
            .unwrap();
        assert_eq!(updated.address, address);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
