//! External collaborator ports
//!
//! The engine never owns or mutates the resource catalog or the user
//! directory; it only looks entities up by id. Administrative resource state
//! (out-of-service windows, delisting) is the catalog's concern — a resource
//! it no longer reports simply cannot be booked.

use async_trait::async_trait;
use shared::models::{Resource, UserRecord};
use shared::AppError;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only resource catalog (room / installation id -> capacity, price)
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    async fn resource(&self, id: i64) -> Result<Option<Resource>, AppError>;
}

/// Read-only user directory (user id -> role, active flag)
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user(&self, id: i64) -> Result<Option<UserRecord>, AppError>;
}

pub type SharedCatalog = Arc<dyn ResourceCatalog>;
pub type SharedDirectory = Arc<dyn UserDirectory>;

/// Map-backed catalog for tests and embedders that already hold the data
#[derive(Default)]
pub struct InMemoryCatalog {
    resources: HashMap<i64, Resource>,
}

impl InMemoryCatalog {
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            resources: resources.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

#[async_trait]
impl ResourceCatalog for InMemoryCatalog {
    async fn resource(&self, id: i64) -> Result<Option<Resource>, AppError> {
        Ok(self.resources.get(&id).cloned())
    }
}

/// Map-backed directory counterpart to [`InMemoryCatalog`]
#[derive(Default)]
pub struct InMemoryDirectory {
    users: HashMap<i64, UserRecord>,
}

impl InMemoryDirectory {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn user(&self, id: i64) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(&id).cloned())
    }
}
