//! Persistence for accounts and the booking catalogue

mod memory;
pub mod models;
mod postgres;

pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PgStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::models::{Account, NewAccount, Role};
use crate::config::Config;
use crate::error::Result;

/// Storage backend.
///
/// Lookups of a missing row return `Error::NotFound`. Inserts that would break
/// a uniqueness or reference rule, and deletes of rows still referenced
/// elsewhere, return `Error::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    // Accounts
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn insert_account(&self, account: NewAccount) -> Result<Account>;
    /// Create a customer or admin profile together with its login. Either both
    /// rows are written or neither is; a taken email is a `Conflict`.
    async fn create_profile_with_account(
        &self,
        role: Role,
        profile: ProfileRequest,
        password_hash: String,
    ) -> Result<Account>;

    // Cities
    async fn list_cities(&self) -> Result<Vec<City>>;
    async fn get_city(&self, id: i64) -> Result<City>;
    async fn create_city(&self, city: CityRequest) -> Result<i64>;
    async fn update_city(&self, id: i64, city: CityRequest) -> Result<u64>;
    async fn delete_city(&self, id: i64) -> Result<u64>;

    // Customers
    async fn list_customers(&self) -> Result<Vec<Profile>>;
    async fn get_customer(&self, id: i64) -> Result<Profile>;
    async fn create_customer(&self, customer: ProfileRequest) -> Result<i64>;
    async fn update_customer(&self, id: i64, customer: ProfileRequest) -> Result<u64>;
    async fn delete_customer(&self, id: i64) -> Result<u64>;

    // Admins
    async fn list_admins(&self) -> Result<Vec<Profile>>;
    async fn get_admin(&self, id: i64) -> Result<Profile>;
    async fn create_admin(&self, admin: ProfileRequest) -> Result<i64>;
    async fn update_admin(&self, id: i64, admin: ProfileRequest) -> Result<u64>;
    async fn delete_admin(&self, id: i64) -> Result<u64>;

    // Destinations
    async fn list_destinations(&self) -> Result<Vec<Destination>>;
    async fn get_destination(&self, id: i64) -> Result<Destination>;
    async fn create_destination(&self, destination: DestinationRequest) -> Result<i64>;
    async fn update_destination(&self, id: i64, destination: DestinationRequest) -> Result<u64>;
    async fn delete_destination(&self, id: i64) -> Result<u64>;

    // Bookings
    async fn list_bookings(&self) -> Result<Vec<Booking>>;
    async fn list_bookings_for_customer(&self, customer_id: i64) -> Result<Vec<Booking>>;
    async fn create_booking(&self, booking: BookingRequest) -> Result<i64>;
}

/// Open the backend named by the configuration
pub async fn open(config: &Config) -> Result<Arc<dyn Store>> {
    match config.database.url.as_deref() {
        Some(url) if config.uses_postgres() => {
            tracing::info!("Using PostgreSQL store");
            Ok(Arc::new(PgStore::connect(url).await?))
        }
        _ => {
            tracing::info!("No database configured, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
