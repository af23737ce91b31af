//! Integration tests for the event lifecycle: proposal, moderation,
//! withdrawal, cancellation and administrative deletion.

mod helpers;

use assert_matches::assert_matches;
use convivio::models::event::{Decision, EventStatus};
use convivio::ConvivioError;
use serial_test::serial;

use helpers::test_data::{
    approved_event, create_admin, create_member, create_owner, create_venue, proposal,
};
use helpers::TestContext;

#[tokio::test]
#[serial]
async fn test_proposal_by_non_owner_starts_pending() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    assert!(ctx.services.health_check().await);

    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;
    let category = ctx
        .database
        .directory
        .create_category("Anime & Manga", Some("Nerd nights"))
        .await?;

    let mut request = proposal("Anime night", venue.id, 10);
    request.category_id = Some(category.id);
    let event = ctx.services.event_service.propose(request, member.id).await?;

    assert_eq!(event.status, EventStatus::Pending);
    assert_eq!(event.organizer_id, member.id);
    assert_eq!(event.category_id, Some(category.id));
    assert!(event.decision_date.is_none());
    assert_eq!(ctx.services.enrollment_service.count_active(event.id).await?, 0);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_proposal_by_venue_owner_is_auto_approved() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event = ctx
        .services
        .event_service
        .propose(proposal("House special", venue.id, 10), owner.id)
        .await?;

    assert_eq!(event.status, EventStatus::Approved);

    // Exactly one participation: the organizer's seat.
    let participants = ctx.services.event_service.list_participants(event.id).await?;
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].user_id, owner.id);
    assert!(ctx.services.enrollment_service.is_enrolled(event.id, owner.id).await?);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_proposal_validation_and_lookups() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let err = ctx
        .services
        .event_service
        .propose(proposal("", venue.id, 10), member.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Validation(_));

    let err = ctx
        .services
        .event_service
        .propose(proposal("No seats", venue.id, 0), member.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Validation(_));

    let err = ctx
        .services
        .event_service
        .propose(proposal("Nowhere", 424242, 10), member.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::VenueNotFound { .. });

    let err = ctx
        .services
        .event_service
        .propose(proposal("Nobody", venue.id, 10), 424242)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Unauthenticated);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_approval_enrolls_the_organizer_once() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    // Capacity 1: the organizer's seat must be the only one and must fit.
    let event = ctx
        .services
        .event_service
        .propose(proposal("Tiny table", venue.id, 1), member.id)
        .await?;

    let decided = ctx
        .services
        .event_service
        .decide(event.id, owner.id, Decision::Approved, "great idea")
        .await?;

    assert_eq!(decided.status, EventStatus::Approved);
    assert_eq!(decided.moderator_comment.as_deref(), Some("great idea"));
    assert!(decided.rejection_reason.is_none());
    assert!(decided.decision_date.is_some());

    let participants = ctx.services.event_service.list_participants(event.id).await?;
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].user_id, member.id);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_rejection_requires_a_reason() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event = ctx
        .services
        .event_service
        .propose(proposal("Karaoke", venue.id, 10), member.id)
        .await?;

    let err = ctx
        .services
        .event_service
        .decide(event.id, owner.id, Decision::Rejected, "  ")
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Validation(_));

    // Still pending after the failed rejection.
    let unchanged = ctx.services.event_service.get(event.id).await?;
    assert_eq!(unchanged.status, EventStatus::Pending);

    let rejected = ctx
        .services
        .event_service
        .decide(event.id, owner.id, Decision::Rejected, "double booked")
        .await?;

    assert_eq!(rejected.status, EventStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("double booked"));
    assert!(rejected.moderator_comment.is_none());
    assert_eq!(ctx.services.enrollment_service.count_active(event.id).await?, 0);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_moderation_authorization_and_terminal_states() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let stranger = create_owner(&ctx, "giovanni").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event = ctx
        .services
        .event_service
        .propose(proposal("Quiz night", venue.id, 10), member.id)
        .await?;

    // Only the venue owner may decide.
    let err = ctx
        .services
        .event_service
        .decide(event.id, stranger.id, Decision::Approved, "")
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Forbidden(_));

    ctx.services
        .event_service
        .decide(event.id, owner.id, Decision::Approved, "ok")
        .await?;

    // Decisions are terminal: a second decision is rejected.
    let err = ctx
        .services
        .event_service
        .decide(event.id, owner.id, Decision::Rejected, "changed my mind")
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::InvalidStateTransition { .. });

    let err = ctx
        .services
        .event_service
        .decide(424242, owner.id, Decision::Approved, "")
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::EventNotFound { .. });

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_withdraw_deletes_a_pending_proposal() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event = ctx
        .services
        .event_service
        .propose(proposal("Cancelled plans", venue.id, 10), member.id)
        .await?;

    ctx.services.event_service.withdraw(event.id, member.id).await?;

    let err = ctx.services.event_service.get(event.id).await.unwrap_err();
    assert_matches!(err, ConvivioError::EventNotFound { .. });
    assert_eq!(ctx.db.count_records("participations").await?, 0);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_withdraw_rules() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let other = create_member(&ctx, "carla").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event = ctx
        .services
        .event_service
        .propose(proposal("Stubborn event", venue.id, 10), member.id)
        .await?;

    // Only the organizer may withdraw.
    let err = ctx
        .services
        .event_service
        .withdraw(event.id, other.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Forbidden(_));

    // Approved events cannot be withdrawn.
    ctx.services
        .event_service
        .decide(event.id, owner.id, Decision::Approved, "ok")
        .await?;
    let err = ctx
        .services
        .event_service
        .withdraw(event.id, member.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::InvalidState(_));

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_cancel_approved_cascades_to_participations() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let guest = create_member(&ctx, "carla").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event =
        approved_event(&ctx.services, "Big dinner", venue.id, 10, member.id, owner.id).await?;
    ctx.services.enrollment_service.enroll(event.id, guest.id).await?;

    let survivor =
        approved_event(&ctx.services, "Other dinner", venue.id, 10, member.id, owner.id).await?;

    ctx.services.event_service.cancel_approved(event.id, owner.id).await?;

    let err = ctx.services.event_service.get(event.id).await.unwrap_err();
    assert_matches!(err, ConvivioError::EventNotFound { .. });
    assert_eq!(ctx.services.enrollment_service.count_active(event.id).await?, 0);

    // The unrelated event and its organizer seat are untouched.
    assert_eq!(ctx.services.enrollment_service.count_active(survivor.id).await?, 1);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_cancel_approved_rules() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let stranger = create_owner(&ctx, "giovanni").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let pending = ctx
        .services
        .event_service
        .propose(proposal("Still pending", venue.id, 10), member.id)
        .await?;

    let err = ctx
        .services
        .event_service
        .cancel_approved(pending.id, owner.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::InvalidState(_));

    let event =
        approved_event(&ctx.services, "Contested", venue.id, 10, member.id, owner.id).await?;
    let err = ctx
        .services
        .event_service
        .cancel_approved(event.id, stranger.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Forbidden(_));

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_admin_delete_is_unconditional_but_admin_only() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let admin = create_admin(&ctx, "admin").await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;

    let event =
        approved_event(&ctx.services, "Doomed", venue.id, 10, member.id, owner.id).await?;

    let err = ctx
        .services
        .event_service
        .admin_delete(event.id, member.id)
        .await
        .unwrap_err();
    assert_matches!(err, ConvivioError::Forbidden(_));

    ctx.services.event_service.admin_delete(event.id, admin.id).await?;

    let err = ctx.services.event_service.get(event.id).await.unwrap_err();
    assert_matches!(err, ConvivioError::EventNotFound { .. });
    assert_eq!(ctx.db.count_records("participations").await?, 0);

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_listings() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let owner = create_owner(&ctx, "luigi").await?;
    let other_owner = create_owner(&ctx, "giovanni").await?;
    let member = create_member(&ctx, "mario").await?;
    let venue = create_venue(&ctx, "Pizzeria Da Luigi", owner.id).await?;
    let other_venue = create_venue(&ctx, "Trattoria Giovanni", other_owner.id).await?;

    let approved =
        approved_event(&ctx.services, "Approved one", venue.id, 10, member.id, owner.id).await?;
    let pending = ctx
        .services
        .event_service
        .propose(proposal("Pending one", venue.id, 10), member.id)
        .await?;
    let elsewhere = ctx
        .services
        .event_service
        .propose(proposal("Elsewhere", other_venue.id, 10), member.id)
        .await?;

    let listed = ctx.services.event_service.list_approved().await?;
    assert_eq!(listed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![approved.id]);

    let board = ctx.services.event_service.list_approved_or_pending().await?;
    assert_eq!(board.len(), 3);

    let at_venue = ctx.services.event_service.list_by_venue(venue.id).await?;
    assert_eq!(at_venue.len(), 2);

    let created = ctx.services.event_service.list_created_by_user(member.id).await?;
    assert_eq!(created.len(), 3);

    let joined = ctx.services.event_service.list_joined_by_user(member.id).await?;
    assert_eq!(joined.iter().map(|e| e.id).collect::<Vec<_>>(), vec![approved.id]);

    let pending_for_owner = ctx
        .services
        .event_service
        .list_pending_for_venue_owner(owner.id)
        .await?;
    assert_eq!(
        pending_for_owner.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![pending.id]
    );

    let approved_for_owner = ctx
        .services
        .event_service
        .list_approved_for_venue_owner(owner.id)
        .await?;
    assert_eq!(
        approved_for_owner.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![approved.id]
    );

    let pending_elsewhere = ctx
        .services
        .event_service
        .list_pending_for_venue_owner(other_owner.id)
        .await?;
    assert_eq!(
        pending_elsewhere.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![elsewhere.id]
    );

    let stats = ctx.database.get_system_stats().await?;
    assert_eq!(stats["total_users"], 3);
    assert_eq!(stats["total_events"], 3);
    assert_eq!(stats["total_venues"], 2);

    Ok(())
}
