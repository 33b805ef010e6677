//! Resource models for the booking catalogue

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    #[serde(rename = "city")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityRequest {
    #[serde(rename = "city")]
    pub name: String,
}

impl CityRequest {
    pub fn validate(&self) -> Result<()> {
        require("city", &self.name)
    }
}

/// Customer or admin profile; both tables share one shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRequest {
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl ProfileRequest {
    pub fn validate(&self) -> Result<()> {
        require("fullname", &self.fullname)?;
        require("email", &self.email)
    }
}

/// Admin creation may also open a login for the new admin
#[derive(Debug, Clone, Deserialize)]
pub struct AdminRequest {
    #[serde(flatten)]
    pub profile: ProfileRequest,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub destination_name: String,
    pub image: Option<String>,
    pub city_id: i64,
    /// Resolved from the referenced city when read
    pub city_name: Option<String>,
    pub description: String,
    pub price: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationRequest {
    pub destination_name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub city_id: i64,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}

impl DestinationRequest {
    pub fn validate(&self) -> Result<()> {
        require("destination_name", &self.destination_name)?;
        if self.price < 0 {
            return Err(Error::Validation("price must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Booking joined with its customer and destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer_name: String,
    pub qty: i32,
    pub destination_name: String,
    pub price: i64,
    pub booking_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub customer_id: i64,
    pub qty: i32,
    pub destination_id: i64,
    pub booking_date: NaiveDate,
}

impl BookingRequest {
    pub fn validate(&self) -> Result<()> {
        if self.qty < 1 {
            return Err(Error::Validation("qty must be at least 1".to_string()));
        }
        Ok(())
    }
}
