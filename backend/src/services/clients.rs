//! Client registration.

use serde::Deserialize;

use super::error::{ServiceError, ServiceResult};
use super::messages;
use super::validation::require;
use crate::db::repository::FullRepository;
use crate::models::{Client, NewClient};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientRequest {
    #[serde(rename = "nom", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ClientRequest {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// Register a client. Emails are unique.
pub async fn add_client<R>(repo: &R, request: ClientRequest) -> ServiceResult<Client>
where
    R: FullRepository + ?Sized,
{
    let name = require(request.name, "nom")?;
    let email = require(request.email, "email")?;

    if repo.find_client_by_email(&email).await?.is_some() {
        log::warn!("Client registration refused, email already used: {}", email);
        return Err(ServiceError::conflict(messages::EMAIL_TAKEN));
    }

    let client = repo
        .insert_client(&NewClient::new(name, email))
        .await
        .map_err(|e| ServiceError::from_write(e, messages::EMAIL_TAKEN))?;
    log::info!("Client {} registered", client.id);
    Ok(client)
}
