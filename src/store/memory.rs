//! In-memory store for development and tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::*;
use super::Store;
use crate::auth::models::{Account, NewAccount, Role};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct BookingRow {
    customer_id: i64,
    qty: i32,
    destination_id: i64,
    booking_date: NaiveDate,
}

#[derive(Debug, Clone)]
struct DestinationRow {
    destination_name: String,
    image: Option<String>,
    city_id: i64,
    description: String,
    price: i64,
}

impl From<DestinationRequest> for DestinationRow {
    fn from(req: DestinationRequest) -> Self {
        Self {
            destination_name: req.destination_name,
            image: req.image,
            city_id: req.city_id,
            description: req.description,
            price: req.price,
        }
    }
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    accounts: BTreeMap<i64, Account>,
    cities: BTreeMap<i64, String>,
    customers: BTreeMap<i64, Profile>,
    admins: BTreeMap<i64, Profile>,
    destinations: BTreeMap<i64, DestinationRow>,
    bookings: BTreeMap<i64, BookingRow>,
}

impl Tables {
    /// Ids come from one sequence shared by every table
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn destination(&self, id: i64, row: &DestinationRow) -> Destination {
        Destination {
            id,
            destination_name: row.destination_name.clone(),
            image: row.image.clone(),
            city_id: row.city_id,
            city_name: self.cities.get(&row.city_id).cloned(),
            description: row.description.clone(),
            price: row.price,
        }
    }

    fn booking(&self, id: i64, row: &BookingRow) -> Option<Booking> {
        let customer = self.customers.get(&row.customer_id)?;
        let destination = self.destinations.get(&row.destination_id)?;
        Some(Booking {
            id,
            customer_name: customer.fullname.clone(),
            qty: row.qty,
            destination_name: destination.destination_name.clone(),
            price: destination.price,
            booking_date: row.booking_date,
        })
    }

    fn email_taken(&self, email: &str) -> bool {
        self.accounts.values().any(|a| a.email == email)
    }

    fn insert_account(&mut self, account: NewAccount) -> Result<Account> {
        if self.email_taken(&account.email) {
            return Err(Error::Conflict("Email is already registered".to_string()));
        }
        let id = self.next_id();
        let account = Account {
            id,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            linked_entity_id: account.linked_entity_id,
        };
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    fn check_city(&self, city_id: i64) -> Result<()> {
        if !self.cities.contains_key(&city_id) {
            return Err(Error::Conflict(format!("City {} does not exist", city_id)));
        }
        Ok(())
    }
}

fn profile(id: i64, req: ProfileRequest) -> Profile {
    Profile {
        id,
        fullname: req.fullname,
        email: req.email,
        phone: req.phone,
    }
}

/// Keeps every table behind a single lock so reference checks and writes
/// happen atomically.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        self.tables.write().await.insert_account(account)
    }

    async fn create_profile_with_account(
        &self,
        role: Role,
        details: ProfileRequest,
        password_hash: String,
    ) -> Result<Account> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&details.email) {
            return Err(Error::Conflict("Email is already registered".to_string()));
        }

        let profile_id = tables.next_id();
        let email = details.email.clone();
        let row = profile(profile_id, details);
        match role {
            Role::Customer => tables.customers.insert(profile_id, row),
            Role::Admin => tables.admins.insert(profile_id, row),
        };

        tables.insert_account(NewAccount {
            email,
            password_hash,
            role,
            linked_entity_id: profile_id,
        })
    }

    async fn list_cities(&self) -> Result<Vec<City>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cities
            .iter()
            .map(|(id, name)| City {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn get_city(&self, id: i64) -> Result<City> {
        let tables = self.tables.read().await;
        tables
            .cities
            .get(&id)
            .map(|name| City {
                id,
                name: name.clone(),
            })
            .ok_or(Error::NotFound("City"))
    }

    async fn create_city(&self, city: CityRequest) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.cities.insert(id, city.name);
        Ok(id)
    }

    async fn update_city(&self, id: i64, city: CityRequest) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let name = tables.cities.get_mut(&id).ok_or(Error::NotFound("City"))?;
        *name = city.name;
        Ok(1)
    }

    async fn delete_city(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if tables.destinations.values().any(|d| d.city_id == id) {
            return Err(Error::Conflict(format!("City {} still has destinations", id)));
        }
        tables
            .cities
            .remove(&id)
            .map(|_| 1)
            .ok_or(Error::NotFound("City"))
    }

    async fn list_customers(&self) -> Result<Vec<Profile>> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }

    async fn get_customer(&self, id: i64) -> Result<Profile> {
        let tables = self.tables.read().await;
        tables
            .customers
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound("Customer"))
    }

    async fn create_customer(&self, customer: ProfileRequest) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.customers.insert(id, profile(id, customer));
        Ok(id)
    }

    async fn update_customer(&self, id: i64, customer: ProfileRequest) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let row = tables
            .customers
            .get_mut(&id)
            .ok_or(Error::NotFound("Customer"))?;
        *row = profile(id, customer);
        Ok(1)
    }

    async fn delete_customer(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if tables.bookings.values().any(|b| b.customer_id == id) {
            return Err(Error::Conflict(format!("Customer {} still has bookings", id)));
        }
        tables
            .customers
            .remove(&id)
            .map(|_| 1)
            .ok_or(Error::NotFound("Customer"))
    }

    async fn list_admins(&self) -> Result<Vec<Profile>> {
        Ok(self.tables.read().await.admins.values().cloned().collect())
    }

    async fn get_admin(&self, id: i64) -> Result<Profile> {
        let tables = self.tables.read().await;
        tables
            .admins
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound("Admin"))
    }

    async fn create_admin(&self, admin: ProfileRequest) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.admins.insert(id, profile(id, admin));
        Ok(id)
    }

    async fn update_admin(&self, id: i64, admin: ProfileRequest) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let row = tables.admins.get_mut(&id).ok_or(Error::NotFound("Admin"))?;
        *row = profile(id, admin);
        Ok(1)
    }

    async fn delete_admin(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        tables
            .admins
            .remove(&id)
            .map(|_| 1)
            .ok_or(Error::NotFound("Admin"))
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>> {
        let tables = self.tables.read().await;
        Ok(tables
            .destinations
            .iter()
            .map(|(id, row)| tables.destination(*id, row))
            .collect())
    }

    async fn get_destination(&self, id: i64) -> Result<Destination> {
        let tables = self.tables.read().await;
        tables
            .destinations
            .get(&id)
            .map(|row| tables.destination(id, row))
            .ok_or(Error::NotFound("Destination"))
    }

    async fn create_destination(&self, destination: DestinationRequest) -> Result<i64> {
        let mut tables = self.tables.write().await;
        tables.check_city(destination.city_id)?;
        let id = tables.next_id();
        tables.destinations.insert(id, destination.into());
        Ok(id)
    }

    async fn update_destination(&self, id: i64, destination: DestinationRequest) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if !tables.destinations.contains_key(&id) {
            return Err(Error::NotFound("Destination"));
        }
        tables.check_city(destination.city_id)?;
        tables.destinations.insert(id, destination.into());
        Ok(1)
    }

    async fn delete_destination(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if tables.bookings.values().any(|b| b.destination_id == id) {
            return Err(Error::Conflict(format!("Destination {} still has bookings", id)));
        }
        tables
            .destinations
            .remove(&id)
            .map(|_| 1)
            .ok_or(Error::NotFound("Destination"))
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .filter_map(|(id, row)| tables.booking(*id, row))
            .collect())
    }

    async fn list_bookings_for_customer(&self, customer_id: i64) -> Result<Vec<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .filter(|(_, row)| row.customer_id == customer_id)
            .filter_map(|(id, row)| tables.booking(*id, row))
            .collect())
    }

    async fn create_booking(&self, booking: BookingRequest) -> Result<i64> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&booking.customer_id) {
            return Err(Error::Conflict(format!(
                "Customer {} does not exist",
                booking.customer_id
            )));
        }
        if !tables.destinations.contains_key(&booking.destination_id) {
            return Err(Error::Conflict(format!(
                "Destination {} does not exist",
                booking.destination_id
            )));
        }
        let id = tables.next_id();
        tables.bookings.insert(
            id,
            BookingRow {
                customer_id: booking.customer_id,
                qty: booking.qty,
                destination_id: booking.destination_id,
                booking_date: booking.booking_date,
            },
        );
        Ok(id)
    }
}
