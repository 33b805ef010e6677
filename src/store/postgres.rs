//! PostgreSQL store

use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};

use super::models::*;
use super::Store;
use crate::auth::models::{Account, NewAccount, Role};
use crate::error::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cities (
    id BIGSERIAL PRIMARY KEY,
    city TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS customers (
    id BIGSERIAL PRIMARY KEY,
    fullname TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS admin (
    id BIGSERIAL PRIMARY KEY,
    fullname TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS destination (
    id BIGSERIAL PRIMARY KEY,
    destination_name TEXT NOT NULL,
    image TEXT,
    city_id BIGINT NOT NULL REFERENCES cities(id),
    description TEXT NOT NULL,
    price BIGINT NOT NULL
);
CREATE TABLE IF NOT EXISTS booking (
    id BIGSERIAL PRIMARY KEY,
    customer_id BIGINT NOT NULL REFERENCES customers(id),
    qty INTEGER NOT NULL,
    destination_id BIGINT NOT NULL REFERENCES destination(id),
    booking_date DATE NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL,
    account_id BIGINT NOT NULL
);
"#;

const DESTINATION_SELECT: &str = "SELECT d.id, d.destination_name, d.image, d.city_id, \
     c.city AS city_name, d.description, d.price \
     FROM destination d LEFT JOIN cities c ON c.id = d.city_id";

const BOOKING_SELECT: &str = "SELECT b.id, cu.fullname AS customer_name, b.qty, \
     d.destination_name, d.price, b.booking_date \
     FROM booking b \
     JOIN destination d ON d.id = b.destination_id \
     JOIN customers cu ON cu.id = b.customer_id";

/// Turn constraint violations into conflicts; everything else stays a
/// database error.
fn map_db_error(err: tokio_postgres::Error) -> Error {
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            Error::Conflict("Record already exists".to_string())
        }
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            Error::Conflict("Record is referenced by or references a missing row".to_string())
        }
        _ => Error::Database(err),
    }
}

fn account_from_row(row: &Row) -> Result<Account> {
    let role: String = row.get("role");
    Ok(Account {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password"),
        role: role.parse::<Role>()?,
        linked_entity_id: row.get("account_id"),
    })
}

fn profile_from_row(row: &Row) -> Profile {
    Profile {
        id: row.get("id"),
        fullname: row.get("fullname"),
        email: row.get("email"),
        phone: row.get("phone"),
    }
}

fn destination_from_row(row: &Row) -> Destination {
    Destination {
        id: row.get("id"),
        destination_name: row.get("destination_name"),
        image: row.get("image"),
        city_id: row.get("city_id"),
        city_name: row.get("city_name"),
        description: row.get("description"),
        price: row.get("price"),
    }
}

fn booking_from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        customer_name: row.get("customer_name"),
        qty: row.get("qty"),
        destination_name: row.get("destination_name"),
        price: row.get("price"),
        booking_date: row.get("booking_date"),
    }
}

fn affected(rows: u64, what: &'static str) -> Result<u64> {
    if rows == 0 {
        return Err(Error::NotFound(what));
    }
    Ok(rows)
}

pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect and make sure the schema exists
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        client.batch_execute(SCHEMA).await?;
        tracing::debug!("PostgreSQL schema is ready");

        Ok(Self { client })
    }

    async fn insert_returning_id(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<i64> {
        let row = self
            .client
            .query_one(sql, params)
            .await
            .map_err(map_db_error)?;
        Ok(row.get(0))
    }

    async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        self.client.execute(sql, params).await.map_err(map_db_error)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = self
            .client
            .query_opt(
                "SELECT id, email, password, role, account_id FROM users WHERE email = $1",
                &[&email],
            )
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        let id = self
            .insert_returning_id(
                "INSERT INTO users (email, password, role, account_id) VALUES ($1, $2, $3, $4) RETURNING id",
                &[
                    &account.email,
                    &account.password_hash,
                    &account.role.as_str(),
                    &account.linked_entity_id,
                ],
            )
            .await?;
        Ok(Account {
            id,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            linked_entity_id: account.linked_entity_id,
        })
    }

    async fn create_profile_with_account(
        &self,
        role: Role,
        details: ProfileRequest,
        password_hash: String,
    ) -> Result<Account> {
        let table = match role {
            Role::Customer => "customers",
            Role::Admin => "admin",
        };
        // One statement, so a unique violation on users also discards the profile
        let sql = format!(
            "WITH profile AS (\
                 INSERT INTO {} (fullname, email, phone) VALUES ($1, $2, $3) RETURNING id\
             ) \
             INSERT INTO users (email, password, role, account_id) \
             SELECT $2, $4, $5, id FROM profile \
             RETURNING id, email, password, role, account_id",
            table
        );
        let row = self
            .client
            .query_one(
                sql.as_str(),
                &[
                    &details.fullname,
                    &details.email,
                    &details.phone,
                    &password_hash,
                    &role.as_str(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        account_from_row(&row)
    }

    async fn list_cities(&self) -> Result<Vec<City>> {
        let rows = self
            .client
            .query("SELECT id, city FROM cities ORDER BY id", &[])
            .await?;
        Ok(rows
            .iter()
            .map(|row| City {
                id: row.get("id"),
                name: row.get("city"),
            })
            .collect())
    }

    async fn get_city(&self, id: i64) -> Result<City> {
        let row = self
            .client
            .query_opt("SELECT id, city FROM cities WHERE id = $1", &[&id])
            .await?
            .ok_or(Error::NotFound("City"))?;
        Ok(City {
            id: row.get("id"),
            name: row.get("city"),
        })
    }

    async fn create_city(&self, city: CityRequest) -> Result<i64> {
        self.insert_returning_id(
            "INSERT INTO cities (city) VALUES ($1) RETURNING id",
            &[&city.name],
        )
        .await
    }

    async fn update_city(&self, id: i64, city: CityRequest) -> Result<u64> {
        let rows = self
            .execute("UPDATE cities SET city = $1 WHERE id = $2", &[&city.name, &id])
            .await?;
        affected(rows, "City")
    }

    async fn delete_city(&self, id: i64) -> Result<u64> {
        let rows = self
            .execute("DELETE FROM cities WHERE id = $1", &[&id])
            .await?;
        affected(rows, "City")
    }

    async fn list_customers(&self) -> Result<Vec<Profile>> {
        let rows = self
            .client
            .query("SELECT id, fullname, email, phone FROM customers ORDER BY id", &[])
            .await?;
        Ok(rows.iter().map(profile_from_row).collect())
    }

    async fn get_customer(&self, id: i64) -> Result<Profile> {
        self.client
            .query_opt(
                "SELECT id, fullname, email, phone FROM customers WHERE id = $1",
                &[&id],
            )
            .await?
            .as_ref()
            .map(profile_from_row)
            .ok_or(Error::NotFound("Customer"))
    }

    async fn create_customer(&self, customer: ProfileRequest) -> Result<i64> {
        self.insert_returning_id(
            "INSERT INTO customers (fullname, email, phone) VALUES ($1, $2, $3) RETURNING id",
            &[&customer.fullname, &customer.email, &customer.phone],
        )
        .await
    }

    async fn update_customer(&self, id: i64, customer: ProfileRequest) -> Result<u64> {
        let rows = self
            .execute(
                "UPDATE customers SET fullname = $1, email = $2, phone = $3 WHERE id = $4",
                &[&customer.fullname, &customer.email, &customer.phone, &id],
            )
            .await?;
        affected(rows, "Customer")
    }

    async fn delete_customer(&self, id: i64) -> Result<u64> {
        let rows = self
            .execute("DELETE FROM customers WHERE id = $1", &[&id])
            .await?;
        affected(rows, "Customer")
    }

    async fn list_admins(&self) -> Result<Vec<Profile>> {
        let rows = self
            .client
            .query("SELECT id, fullname, email, phone FROM admin ORDER BY id", &[])
            .await?;
        Ok(rows.iter().map(profile_from_row).collect())
    }

    async fn get_admin(&self, id: i64) -> Result<Profile> {
        self.client
            .query_opt(
                "SELECT id, fullname, email, phone FROM admin WHERE id = $1",
                &[&id],
            )
            .await?
            .as_ref()
            .map(profile_from_row)
            .ok_or(Error::NotFound("Admin"))
    }

    async fn create_admin(&self, admin: ProfileRequest) -> Result<i64> {
        self.insert_returning_id(
            "INSERT INTO admin (fullname, email, phone) VALUES ($1, $2, $3) RETURNING id",
            &[&admin.fullname, &admin.email, &admin.phone],
        )
        .await
    }

    async fn update_admin(&self, id: i64, admin: ProfileRequest) -> Result<u64> {
        let rows = self
            .execute(
                "UPDATE admin SET fullname = $1, email = $2, phone = $3 WHERE id = $4",
                &[&admin.fullname, &admin.email, &admin.phone, &id],
            )
            .await?;
        affected(rows, "Admin")
    }

    async fn delete_admin(&self, id: i64) -> Result<u64> {
        let rows = self
            .execute("DELETE FROM admin WHERE id = $1", &[&id])
            .await?;
        affected(rows, "Admin")
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>> {
        let sql = format!("{} ORDER BY d.id", DESTINATION_SELECT);
        let rows = self.client.query(sql.as_str(), &[]).await?;
        Ok(rows.iter().map(destination_from_row).collect())
    }

    async fn get_destination(&self, id: i64) -> Result<Destination> {
        let sql = format!("{} WHERE d.id = $1", DESTINATION_SELECT);
        self.client
            .query_opt(sql.as_str(), &[&id])
            .await?
            .as_ref()
            .map(destination_from_row)
            .ok_or(Error::NotFound("Destination"))
    }

    async fn create_destination(&self, destination: DestinationRequest) -> Result<i64> {
        self.insert_returning_id(
            "INSERT INTO destination (destination_name, image, city_id, description, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
            &[
                &destination.destination_name,
                &destination.image,
                &destination.city_id,
                &destination.description,
                &destination.price,
            ],
        )
        .await
    }

    async fn update_destination(&self, id: i64, destination: DestinationRequest) -> Result<u64> {
        let rows = self
            .execute(
                "UPDATE destination SET destination_name = $1, image = $2, city_id = $3, \
                 description = $4, price = $5 WHERE id = $6",
                &[
                    &destination.destination_name,
                    &destination.image,
                    &destination.city_id,
                    &destination.description,
                    &destination.price,
                    &id,
                ],
            )
            .await?;
        affected(rows, "Destination")
    }

    async fn delete_destination(&self, id: i64) -> Result<u64> {
        let rows = self
            .execute("DELETE FROM destination WHERE id = $1", &[&id])
            .await?;
        affected(rows, "Destination")
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        let sql = format!("{} ORDER BY b.id", BOOKING_SELECT);
        let rows = self.client.query(sql.as_str(), &[]).await?;
        Ok(rows.iter().map(booking_from_row).collect())
    }

    async fn list_bookings_for_customer(&self, customer_id: i64) -> Result<Vec<Booking>> {
        let sql = format!("{} WHERE b.customer_id = $1 ORDER BY b.id", BOOKING_SELECT);
        let rows = self.client.query(sql.as_str(), &[&customer_id]).await?;
        Ok(rows.iter().map(booking_from_row).collect())
    }

    async fn create_booking(&self, booking: BookingRequest) -> Result<i64> {
        self.insert_returning_id(
            "INSERT INTO booking (customer_id, qty, destination_id, booking_date) \
             VALUES ($1, $2, $3, $4) RETURNING id",
            &[
                &booking.customer_id,
                &booking.qty,
                &booking.destination_id,
                &booking.booking_date,
            ],
        )
        .await
    }
}
