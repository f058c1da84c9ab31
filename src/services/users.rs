//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, PublicUser, RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account with the given role.
    ///
    /// The public registration endpoint always passes `Role::User`; only the
    /// admin surface can mint another admin.
    pub async fn register(&self, request: RegisterUser, role: Role) -> AppResult<PublicUser> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = self.hash_password(&request.password)?;

        let user = self
            .repository
            .users
            .create(&request.name, &request.email, &password_hash, role)
            .await?;

        tracing::info!("Registered {} account for user {}", role, user.id);

        Ok(user.into())
    }

    /// Authenticate by email and password, returning a JWT token.
    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<(String, PublicUser)> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.create_token_for_user(&user)?;

        Ok((token, user.into()))
    }

    /// Create the seed admin account on startup when configured and absent.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let (email, password) = match (
            &self.config.bootstrap_admin_email,
            &self.config.bootstrap_admin_password,
        ) {
            (Some(email), Some(password)) => (email.clone(), password.clone()),
            _ => return Ok(()),
        };

        if self.repository.users.get_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let password_hash = self.hash_password(&password)?;
        let admin = self
            .repository
            .users
            .create("Administrator", &email, &password_hash, Role::Admin)
            .await?;

        tracing::info!("Bootstrap admin account created (id {})", admin.id);

        Ok(())
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
