use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, ClientId);

/// A registered hotel client. Email is unique across all clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
}

/// Client data before the store has assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
}

impl NewClient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Attach a store-assigned id.
    pub fn into_client(self, id: ClientId) -> Client {
        Client {
            id,
            name: self.name,
            email: self.email,
        }
    }
}
