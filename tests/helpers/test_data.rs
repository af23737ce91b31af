//! Test fixture builders
//!
//! Small helpers that create the users, venues and events the integration
//! tests arrange their scenarios from.

use chrono::{Duration, Utc};
use convivio::models::event::{Event, ProposeEventRequest};
use convivio::models::user::{CreateUserRequest, Role, User};
use convivio::models::venue::{CreateVenueRequest, Venue};
use convivio::ServiceFactory;

use super::TestContext;

/// A unique email so fixtures never collide across runs against a shared
/// `TEST_DATABASE_URL` database
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn create_user(ctx: &TestContext, prefix: &str, role: Role) -> anyhow::Result<User> {
    let user = ctx
        .services
        .user_service
        .register(CreateUserRequest {
            email: unique_email(prefix),
            display_name: prefix.to_string(),
            role: Some(role),
        })
        .await?;

    Ok(user)
}

pub async fn create_member(ctx: &TestContext, prefix: &str) -> anyhow::Result<User> {
    create_user(ctx, prefix, Role::Member).await
}

pub async fn create_owner(ctx: &TestContext, prefix: &str) -> anyhow::Result<User> {
    create_user(ctx, prefix, Role::VenueOwner).await
}

pub async fn create_admin(ctx: &TestContext, prefix: &str) -> anyhow::Result<User> {
    create_user(ctx, prefix, Role::Admin).await
}

pub async fn create_venue(ctx: &TestContext, name: &str, owner_id: i64) -> anyhow::Result<Venue> {
    let venue = ctx
        .database
        .venues
        .create(CreateVenueRequest {
            name: name.to_string(),
            address: Some("Via Dante 1".to_string()),
            max_capacity: 50,
            city_id: None,
            owner_id,
        })
        .await?;

    Ok(venue)
}

pub fn proposal(title: &str, venue_id: i64, capacity: i32) -> ProposeEventRequest {
    ProposeEventRequest {
        title: title.to_string(),
        description: Some("An evening of pizza and company".to_string()),
        event_date: Utc::now() + Duration::days(7),
        capacity,
        venue_id,
        category_id: None,
    }
}

/// Propose an event as `organizer_id` and have the venue owner approve it
pub async fn approved_event(
    services: &ServiceFactory,
    title: &str,
    venue_id: i64,
    capacity: i32,
    organizer_id: i64,
    owner_id: i64,
) -> anyhow::Result<Event> {
    let event = services
        .event_service
        .propose(proposal(title, venue_id, capacity), organizer_id)
        .await?;

    let event = services
        .event_service
        .decide(
            event.id,
            owner_id,
            convivio::models::event::Decision::Approved,
            "see you there",
        )
        .await?;

    Ok(event)
}
