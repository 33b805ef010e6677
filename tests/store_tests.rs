//! Store behaviour tests against the in-memory backend

use chrono::NaiveDate;
use ticket_booking::auth::{NewAccount, Role};
use ticket_booking::error::Error;
use ticket_booking::store::{
    BookingRequest, CityRequest, DestinationRequest, MemoryStore, ProfileRequest, Store,
};

fn city(name: &str) -> CityRequest {
    CityRequest {
        name: name.to_string(),
    }
}

fn profile(name: &str, email: &str) -> ProfileRequest {
    ProfileRequest {
        fullname: name.to_string(),
        email: email.to_string(),
        phone: "0812".to_string(),
    }
}

fn destination(name: &str, city_id: i64) -> DestinationRequest {
    DestinationRequest {
        destination_name: name.to_string(),
        image: None,
        city_id,
        description: String::new(),
        price: 100,
    }
}

fn booking(customer_id: i64, destination_id: i64) -> BookingRequest {
    BookingRequest {
        customer_id,
        qty: 1,
        destination_id,
        booking_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    }
}

#[tokio::test]
async fn test_city_crud() {
    let store = MemoryStore::new();

    let id = store.create_city(city("Manado")).await.unwrap();
    assert_eq!(store.get_city(id).await.unwrap().name, "Manado");

    assert_eq!(store.update_city(id, city("Bitung")).await.unwrap(), 1);
    assert_eq!(store.list_cities().await.unwrap()[0].name, "Bitung");

    assert_eq!(store.delete_city(id).await.unwrap(), 1);
    assert!(matches!(store.get_city(id).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_missing_rows() {
    let store = MemoryStore::new();

    assert!(matches!(store.get_customer(1).await, Err(Error::NotFound(_))));
    assert!(matches!(
        store.update_city(1, city("x")).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(store.delete_admin(1).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_referenced_rows_cannot_be_deleted() {
    let store = MemoryStore::new();
    let city_id = store.create_city(city("Manado")).await.unwrap();
    let destination_id = store
        .create_destination(destination("Bunaken", city_id))
        .await
        .unwrap();
    let customer_id = store
        .create_customer(profile("Budi", "budi@x.com"))
        .await
        .unwrap();
    store
        .create_booking(booking(customer_id, destination_id))
        .await
        .unwrap();

    assert!(matches!(store.delete_city(city_id).await, Err(Error::Conflict(_))));
    assert!(matches!(
        store.delete_destination(destination_id).await,
        Err(Error::Conflict(_))
    ));
    assert!(matches!(
        store.delete_customer(customer_id).await,
        Err(Error::Conflict(_))
    ));
}

#[tokio::test]
async fn test_dangling_references_are_refused() {
    let store = MemoryStore::new();

    assert!(matches!(
        store.create_destination(destination("Nowhere", 42)).await,
        Err(Error::Conflict(_))
    ));
    assert!(matches!(
        store.create_booking(booking(1, 2)).await,
        Err(Error::Conflict(_))
    ));
}

#[tokio::test]
async fn test_bookings_are_joined() {
    let store = MemoryStore::new();
    let city_id = store.create_city(city("Manado")).await.unwrap();
    let destination_id = store
        .create_destination(destination("Bunaken", city_id))
        .await
        .unwrap();
    let budi = store
        .create_customer(profile("Budi", "budi@x.com"))
        .await
        .unwrap();
    let sari = store
        .create_customer(profile("Sari", "sari@x.com"))
        .await
        .unwrap();

    store.create_booking(booking(budi, destination_id)).await.unwrap();
    store.create_booking(booking(sari, destination_id)).await.unwrap();

    assert_eq!(store.list_bookings().await.unwrap().len(), 2);

    let for_budi = store.list_bookings_for_customer(budi).await.unwrap();
    assert_eq!(for_budi.len(), 1);
    assert_eq!(for_budi[0].customer_name, "Budi");
    assert_eq!(for_budi[0].destination_name, "Bunaken");
    assert_eq!(for_budi[0].price, 100);

    let destination = store.get_destination(destination_id).await.unwrap();
    assert_eq!(destination.city_name.as_deref(), Some("Manado"));
}

#[tokio::test]
async fn test_account_email_is_unique() {
    let store = MemoryStore::new();
    let account = NewAccount {
        email: "a@x.com".to_string(),
        password_hash: "$2b$04$digest".to_string(),
        role: Role::Customer,
        linked_entity_id: 1,
    };

    let stored = store.insert_account(account.clone()).await.unwrap();
    assert_eq!(stored.email, "a@x.com");
    assert!(matches!(
        store.insert_account(account).await,
        Err(Error::Conflict(_))
    ));

    let found = store.find_account_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, stored.id);
    assert!(store.find_account_by_email("b@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_inserts_get_distinct_ids() {
    let store = MemoryStore::new();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.create_city(city(&format!("City {}", i))).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert_eq!(store.list_cities().await.unwrap().len(), 16);
}
