//! Client storage operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Client, ClientId, NewClient};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Store a new client and return it with its assigned id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::ConflictError)` - If the email is already registered
    async fn insert_client(&self, client: &NewClient) -> RepositoryResult<Client>;

    /// Fetch a client by id, `NotFound` if it does not exist.
    async fn get_client(&self, client_id: ClientId) -> RepositoryResult<Client>;

    /// Look a client up by exact email.
    async fn find_client_by_email(&self, email: &str) -> RepositoryResult<Option<Client>>;

    /// All clients ordered by id.
    async fn list_clients(&self) -> RepositoryResult<Vec<Client>>;
}
