//! Catalogue and booking handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use super::routes::{json_body, ApiResponse};
use super::server::SharedState;
use crate::error::{Error, Result};
use crate::store::{
    AdminRequest, BookingRequest, CityRequest, DestinationRequest, ProfileRequest,
};

type Body<T> = std::result::Result<Json<T>, JsonRejection>;

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::Validation("Invalid ID".to_string()))
}

fn created(id: i64) -> (StatusCode, Json<ApiResponse<Value>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse::with_status(
            StatusCode::CREATED,
            "Inserted",
            json!({ "id": id }),
        )),
    )
}

fn changed(message: &str, rows: u64) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::with_status(
        StatusCode::OK,
        message,
        json!({ "rows_affected": rows }),
    ))
}

/// A referenced row that is missing is the caller's mistake, not a 404 for
/// the resource being written.
fn must_exist<T>(lookup: Result<T>, field: &str) -> Result<()> {
    match lookup {
        Ok(_) => Ok(()),
        Err(Error::NotFound(_)) => Err(Error::Validation(format!(
            "{} does not reference an existing record",
            field
        ))),
        Err(e) => Err(e),
    }
}

// Cities

pub async fn list_cities(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    Ok(Json(ApiResponse::ok(state.store.list_cities().await?)))
}

pub async fn get_city(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let city = state.store.get_city(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(city)))
}

pub async fn create_city(
    State(state): State<SharedState>,
    payload: Body<CityRequest>,
) -> Result<impl IntoResponse> {
    let req = json_body(payload)?;
    req.validate()?;
    Ok(created(state.store.create_city(req).await?))
}

pub async fn update_city(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Body<CityRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?;
    req.validate()?;
    Ok(changed("Updated", state.store.update_city(id, req).await?))
}

pub async fn delete_city(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let rows = state.store.delete_city(parse_id(&id)?).await?;
    Ok(changed("Deleted", rows))
}

// Customers

pub async fn list_customers(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    Ok(Json(ApiResponse::ok(state.store.list_customers().await?)))
}

pub async fn get_customer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let customer = state.store.get_customer(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(customer)))
}

pub async fn create_customer(
    State(state): State<SharedState>,
    payload: Body<ProfileRequest>,
) -> Result<impl IntoResponse> {
    let req = json_body(payload)?;
    req.validate()?;
    Ok(created(state.store.create_customer(req).await?))
}

pub async fn update_customer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Body<ProfileRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?;
    req.validate()?;
    Ok(changed("Updated", state.store.update_customer(id, req).await?))
}

pub async fn delete_customer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let rows = state.store.delete_customer(parse_id(&id)?).await?;
    Ok(changed("Deleted", rows))
}

// Admins

pub async fn list_admins(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    Ok(Json(ApiResponse::ok(state.store.list_admins().await?)))
}

pub async fn get_admin(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let admin = state.store.get_admin(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(admin)))
}

pub async fn create_admin(
    State(state): State<SharedState>,
    payload: Body<AdminRequest>,
) -> Result<impl IntoResponse> {
    let req = json_body(payload)?;
    Ok(created(state.auth.create_admin(req).await?))
}

pub async fn update_admin(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Body<ProfileRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?;
    req.validate()?;
    Ok(changed("Updated", state.store.update_admin(id, req).await?))
}

pub async fn delete_admin(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let rows = state.store.delete_admin(parse_id(&id)?).await?;
    Ok(changed("Deleted", rows))
}

// Destinations

pub async fn list_destinations(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    Ok(Json(ApiResponse::ok(state.store.list_destinations().await?)))
}

pub async fn get_destination(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let destination = state.store.get_destination(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(destination)))
}

pub async fn create_destination(
    State(state): State<SharedState>,
    payload: Body<DestinationRequest>,
) -> Result<impl IntoResponse> {
    let req = json_body(payload)?;
    req.validate()?;
    must_exist(state.store.get_city(req.city_id).await, "city_id")?;
    Ok(created(state.store.create_destination(req).await?))
}

pub async fn update_destination(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Body<DestinationRequest>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?;
    req.validate()?;
    must_exist(state.store.get_city(req.city_id).await, "city_id")?;
    Ok(changed(
        "Updated",
        state.store.update_destination(id, req).await?,
    ))
}

pub async fn delete_destination(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let rows = state.store.delete_destination(parse_id(&id)?).await?;
    Ok(changed("Deleted", rows))
}

// Bookings

pub async fn list_bookings(State(state): State<SharedState>) -> Result<impl IntoResponse> {
    Ok(Json(ApiResponse::ok(state.store.list_bookings().await?)))
}

pub async fn list_customer_bookings(
    State(state): State<SharedState>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse> {
    let bookings = state
        .store
        .list_bookings_for_customer(parse_id(&customer_id)?)
        .await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

pub async fn create_booking(
    State(state): State<SharedState>,
    payload: Body<BookingRequest>,
) -> Result<impl IntoResponse> {
    let req = json_body(payload)?;
    req.validate()?;
    must_exist(state.store.get_customer(req.customer_id).await, "customer_id")?;
    must_exist(
        state.store.get_destination(req.destination_id).await,
        "destination_id",
    )?;
    Ok(created(state.store.create_booking(req).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("twelve"), Err(Error::Validation(m)) if m == "Invalid ID"));
    }

    #[test]
    fn test_missing_reference_is_a_validation_error() {
        let lookup: Result<()> = Err(Error::NotFound("City"));
        assert!(matches!(must_exist(lookup, "city_id"), Err(Error::Validation(_))));

        let outage: Result<()> = Err(Error::Store("down".to_string()));
        assert!(matches!(must_exist(outage, "city_id"), Err(Error::Store(_))));
    }
}
