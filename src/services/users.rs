use serde::Deserialize;
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::database::models::{NewUser, User};
use crate::database::store::constraints;
use crate::database::{DatabaseError, Store};
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::Role;

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 150;

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
}

fn check_length(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, "This field may not be blank"));
    }
    if value.chars().count() > max {
        return Err(ServiceError::validation(field, format!("Ensure this field has no more than {} characters", max)));
    }
    Ok(())
}

impl Registration {
    pub fn validate(&self) -> ServiceResult<()> {
        check_length("email", &self.email, MAX_EMAIL_LENGTH)?;
        if !self.email.contains('@') {
            return Err(ServiceError::validation("email", "Enter a valid email address"));
        }
        check_length("username", &self.username, MAX_NAME_LENGTH)?;
        if !self.username.chars().all(username_char) {
            return Err(ServiceError::validation(
                "username",
                "Username may contain only letters, digits and @/./+/-/_",
            ));
        }
        check_length("first_name", &self.first_name, MAX_NAME_LENGTH)?;
        check_length("last_name", &self.last_name, MAX_NAME_LENGTH)?;
        if self.password.is_empty() {
            return Err(ServiceError::validation("password", "This field may not be blank"));
        }
        Ok(())
    }
}

pub async fn register(store: &dyn Store, registration: Registration) -> ServiceResult<User> {
    registration.validate()?;

    if store.user_by_email(&registration.email).await?.is_some() {
        return Err(duplicate_email());
    }
    if store.user_by_username(&registration.username).await?.is_some() {
        return Err(duplicate_username());
    }

    let new_user = NewUser {
        password_hash: hash_password(&registration.password)?,
        email: registration.email,
        username: registration.username,
        first_name: registration.first_name,
        last_name: registration.last_name,
        role: Role::User,
    };

    let user = store.insert_user(&new_user).await.map_err(|err| match err {
        DatabaseError::UniqueViolation(c) if c == constraints::USERS_EMAIL => duplicate_email(),
        DatabaseError::UniqueViolation(c) if c == constraints::USERS_USERNAME => duplicate_username(),
        other => other.into(),
    })?;

    info!("Registered user {} ({})", user.id, user.username);
    Ok(user)
}

/// Resolve login credentials. Unknown email and wrong password fail the
/// same way.
pub async fn authenticate(store: &dyn Store, email: &str, password: &str) -> ServiceResult<User> {
    let invalid = || ServiceError::validation("non_field_errors", "Unable to log in with provided credentials");

    let user = store.user_by_email(email).await?.ok_or_else(invalid)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(invalid());
    }
    Ok(user)
}

pub async fn change_password(
    store: &dyn Store,
    user: &User,
    current_password: &str,
    new_password: &str,
) -> ServiceResult<()> {
    if !verify_password(current_password, &user.password_hash)? {
        return Err(ServiceError::validation("current_password", "Wrong password"));
    }
    if new_password.is_empty() {
        return Err(ServiceError::validation("new_password", "This field may not be blank"));
    }

    store.update_password(user.id, &hash_password(new_password)?).await?;
    info!("User {} changed password", user.id);
    Ok(())
}

fn duplicate_email() -> ServiceError {
    ServiceError::validation("email", "A user with that email already exists")
}

fn duplicate_username() -> ServiceError {
    ServiceError::validation("username", "A user with that username already exists")
}
