//! In-memory user directory used to exercise every failure kind end to end.

use anyhow::anyhow;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::info;

use super::handlers::AppState;
use crate::errors::{ErrorCode, Failure, FieldErrorDetail, FieldFailure, GenericFailure};

const MAX_NAME_LENGTH: usize = 64;
const MAX_AGE: i64 = 150;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
}

/// Request body for user creation; every field optional so validators can
/// report what is missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

#[derive(Debug, Default)]
pub struct UserStore {
    inner: RwLock<UserStoreInner>,
}

#[derive(Debug, Default)]
struct UserStoreInner {
    next_id: u64,
    users: HashMap<u64, User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: u64) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    /// Insert a validated user; emails are unique ignoring case
    pub async fn insert(&self, name: String, email: String, age: Option<i64>) -> Result<User, Failure> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&email))
        {
            return Err(GenericFailure::from_code(ErrorCode::Conflict, "User already exists")
                .with_detail(format!("A user with email '{}' is already registered", email))
                .into());
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name,
            email,
            age,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

type Validator = fn(&CreateUser) -> Vec<FieldErrorDetail>;

fn validate_name(body: &CreateUser) -> Vec<FieldErrorDetail> {
    match body.name.as_deref().map(str::trim) {
        None | Some("") => vec![FieldErrorDetail::new("name", "required").with_code("REQUIRED")],
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => vec![FieldErrorDetail::new(
            "name",
            "too long",
        )
        .with_code("MAX_LENGTH")
        .with_detail(format!("at most {} characters", MAX_NAME_LENGTH))],
        Some(_) => Vec::new(),
    }
}

fn validate_email(body: &CreateUser) -> Vec<FieldErrorDetail> {
    match body.email.as_deref().map(str::trim) {
        None | Some("") => vec![FieldErrorDetail::new("email", "required").with_code("REQUIRED")],
        Some(email) => match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Vec::new(),
            _ => vec![FieldErrorDetail::new("email", "malformed")
                .with_code("FORMAT")
                .with_detail_url("https://datatracker.ietf.org/doc/html/rfc5322#section-3.4.1")],
        },
    }
}

fn validate_age(body: &CreateUser) -> Vec<FieldErrorDetail> {
    match body.age {
        Some(age) if age <= 0 => {
            vec![FieldErrorDetail::new("age", "must be positive").with_code("RANGE")]
        }
        Some(age) if age > MAX_AGE => vec![FieldErrorDetail::new("age", "out of range")
            .with_code("RANGE")
            .with_detail(format!("at most {}", MAX_AGE))],
        _ => Vec::new(),
    }
}

const VALIDATORS: [Validator; 3] = [validate_name, validate_email, validate_age];

/// Run every validator concurrently, collecting violations into one failure
pub async fn validate(body: &CreateUser) -> Result<(), Failure> {
    let failure = Arc::new(FieldFailure::from_code(
        ErrorCode::ValidationFailed,
        "User is invalid",
    ));
    let body = Arc::new(body.clone());

    let mut validators = JoinSet::new();
    for validator in VALIDATORS {
        let failure = Arc::clone(&failure);
        let body = Arc::clone(&body);
        validators.spawn(async move {
            for detail in validator(body.as_ref()) {
                failure.append(detail);
            }
        });
    }
    while let Some(joined) = validators.join_next().await {
        joined.map_err(|e| anyhow!("validator task failed: {}", e))?;
    }

    let failure = Arc::try_unwrap(failure)
        .map_err(|_| anyhow!("validation failure still shared after validators finished"))?;

    if failure.has_field_errors() {
        Err(failure.into())
    } else {
        Ok(())
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<impl IntoResponse, Failure> {
    let Json(body) = payload.map_err(GenericFailure::from)?;

    validate(&body).await?;

    let user = state
        .users
        .insert(
            body.name.unwrap_or_default().trim().to_string(),
            body.email.unwrap_or_default().trim().to_string(),
            body.age,
        )
        .await?;

    info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<User>, Failure> {
    let Path(id) = id.map_err(GenericFailure::from)?;
    state.users.get(id).await.map(Json).ok_or_else(|| {
        GenericFailure::from_code(ErrorCode::NotFound, "User not found")
            .with_detail(format!("No user with id {}", id))
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: Option<&str>, email: Option<&str>, age: Option<i64>) -> CreateUser {
        CreateUser {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            age,
        }
    }

    #[test]
    fn test_individual_validators() {
        assert!(validate_name(&body(Some("Ada"), None, None)).is_empty());
        assert_eq!(validate_name(&body(Some("  "), None, None))[0].error_message.as_deref(), Some("required"));
        assert_eq!(
            validate_name(&body(Some("x".repeat(65).as_str()), None, None))[0].error_code.as_deref(),
            Some("MAX_LENGTH")
        );

        assert!(validate_email(&body(None, Some("ada@example.com"), None)).is_empty());
        assert_eq!(
            validate_email(&body(None, Some("ada"), None))[0].error_code.as_deref(),
            Some("FORMAT")
        );

        assert!(validate_age(&body(None, None, None)).is_empty());
        assert!(validate_age(&body(None, None, Some(36))).is_empty());
        assert_eq!(
            validate_age(&body(None, None, Some(-1)))[0].error_message.as_deref(),
            Some("must be positive")
        );
        assert_eq!(
            validate_age(&body(None, None, Some(151)))[0].error_message.as_deref(),
            Some("out of range")
        );
    }

    #[tokio::test]
    async fn test_validate_collects_all_violations() {
        let result = validate(&body(None, Some("nope"), Some(0))).await;

        let Err(Failure::FieldValidation(failure)) = result else {
            panic!("expected field validation failure");
        };
        assert_eq!(failure.status(), 422);

        let mut fields: Vec<_> = failure.into_field_errors().into_iter().map(|d| d.field).collect();
        fields.sort();
        assert_eq!(fields, ["age", "email", "name"]);
    }

    #[tokio::test]
    async fn test_validate_accepts_valid_body() {
        assert!(validate(&body(Some("Ada"), Some("ada@example.com"), Some(36)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_email() {
        let store = UserStore::new();
        let first = store
            .insert("Ada".into(), "ada@example.com".into(), None)
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(store.get(1).await, Some(first));

        let err = store
            .insert("Ada".into(), "ADA@example.com".into(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), 409);
        assert!(store.get(2).await.is_none());
    }
}
