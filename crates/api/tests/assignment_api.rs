//! HTTP-level integration tests for the assignment and returning-request
//! endpoints: the full hand-out / accept / return / complete cycle, the
//! ownership and role gates on each step, and the one-open-row invariants.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chrono::{Days, Months, NaiveDate, Utc};
use common::{
    body_json, create_asset, create_category, create_user, delete_auth, get_auth, login_token,
    post_auth, post_json_auth, OTHER_LOCATION, TEST_LOCATION,
};
use serde_json::json;
use sqlx::PgPool;

use assetdesk_core::roles::Role;
use assetdesk_db::models::asset::Asset;
use assetdesk_db::models::user::User;
use assetdesk_db::repositories::{AssignmentRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    admin_token: String,
    staff: User,
    staff_token: String,
    asset: Asset,
}

/// Admin + staff in the default location, one available asset, both logged in.
async fn fixture(pool: &PgPool, app: &Router) -> Fixture {
    let (_admin, admin_pw) = create_user(pool, "fixadmin", Role::Admin, TEST_LOCATION).await;
    let (staff, staff_pw) = create_user(pool, "fixstaff", Role::Staff, TEST_LOCATION).await;
    let category = create_category(pool, "Laptop", "LA").await;
    let asset = create_asset(pool, &category, TEST_LOCATION, "MacBook Pro").await;
    let admin_token = login_token(app, "fixadmin", &admin_pw).await;
    let staff_token = login_token(app, "fixstaff", &staff_pw).await;
    Fixture {
        admin_token,
        staff,
        staff_token,
        asset,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Create an assignment through the API, asserting 201, and return its JSON.
async fn create_assignment(
    app: &Router,
    token: &str,
    asset_id: i64,
    user_id: i64,
    date: NaiveDate,
) -> serde_json::Value {
    let response = post_json_auth(
        app,
        "/api/v1/assignments",
        json!({ "asset_id": asset_id, "assigned_to_user_id": user_id, "assigned_date": date }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Fetch an asset through the API and return its effective state string.
async fn asset_state(app: &Router, token: &str, asset_id: i64) -> String {
    let response = get_auth(app, &format!("/api/v1/assets/{asset_id}"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["state"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Creating an assignment starts it waiting for acceptance, records the
/// acting admin, and ties up the asset.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_assignment(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    assert_eq!(data["state"], "waiting_for_acceptance");
    assert_eq!(data["asset_id"], fx.asset.id);
    assert_eq!(data["assigned_to_user_id"], fx.staff.id);

    // The asset now reads as assigned.
    assert_eq!(
        asset_state(&app, &fx.admin_token, fx.asset.id).await,
        "assigned"
    );

    // A second open assignment for the same asset is refused.
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": fx.staff.id,
            "assigned_date": today(),
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// The assigned date must fall within [today, today + 1 year].
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_assignment_date_bounds(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let yesterday = today() - Days::new(1);
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": fx.staff.id,
            "assigned_date": yesterday,
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let too_far = today() + Months::new(13);
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": fx.staff.id,
            "assigned_date": too_far,
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A date inside the window is fine.
    let next_month = today() + Months::new(1);
    create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, next_month).await;
}

/// Staff cannot hand out assets.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_cannot_create_assignment(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": fx.staff.id,
            "assigned_date": today(),
        }),
        &fx.staff_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Unknown or out-of-location references read as 404; a deactivated
/// assignee is a validation error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_assignment_rejects_bad_references(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    // Unknown assignee.
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": 99999,
            "assigned_date": today(),
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Assignee in another location.
    let (branch_staff, _) = create_user(&pool, "branchstaff", Role::Staff, OTHER_LOCATION).await;
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": branch_staff.id,
            "assigned_date": today(),
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown asset.
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": 99999,
            "assigned_to_user_id": fx.staff.id,
            "assigned_date": today(),
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deactivated assignee.
    UserRepo::deactivate(&pool, fx.staff.id)
        .await
        .expect("deactivation should succeed");
    let response = post_json_auth(
        &app,
        "/api/v1/assignments",
        json!({
            "asset_id": fx.asset.id,
            "assigned_to_user_id": fx.staff.id,
            "assigned_date": today(),
        }),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

/// The assignee sees the assignment in /my, accepts it, and cannot accept
/// it twice.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_accept_flow(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();

    // Acting on an assignment that does not exist is a 404.
    let response = post_auth(&app, "/api/v1/assignments/99999/accept", &fx.staff_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Visible to the assignee.
    let response = get_auth(&app, "/api/v1/assignments/my", &fx.staff_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], id);
    assert_eq!(json["data"][0]["asset_code"], fx.asset.code.as_str());

    // Someone else cannot accept it -- not even an admin.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The assignee accepts.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "accepted");

    // Accepting again is an invalid transition, not a silent no-op.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

/// Declining ends the assignment and frees the asset for reassignment.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decline_frees_asset(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();

    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/decline"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "declined");

    assert_eq!(
        asset_state(&app, &fx.admin_token, fx.asset.id).await,
        "available"
    );

    // The asset can be handed out again.
    create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
}

/// Future-dated assignments stay out of the /my view until the date arrives.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_view_waits_for_assigned_date(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let tomorrow = today() + Days::new(1);
    create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, tomorrow).await;

    let response = get_auth(&app, "/api/v1/assignments/my", &fx.staff_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Returning requests
// ---------------------------------------------------------------------------

/// The assignee opens a returning request on an accepted assignment; a
/// second open request for the same assignment is refused with its own
/// error code.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_return_request_flow(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();

    // Not yet accepted: no return possible.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Someone else cannot request the return.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The assignee opens the request.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "waiting_for_returning");
    assert_eq!(json["data"]["assignment_id"], id);
    assert_eq!(json["data"]["requested_by_user_id"], fx.staff.id);

    // Only one open request per assignment.
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICTING_OPEN_REQUEST");
}

/// Completing a returning request closes the request and the assignment in
/// one step, freeing the asset.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_return_pairs_request_and_assignment(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Staff cannot complete returns.
    let response = post_auth(
        &app,
        &format!("/api/v1/returning-requests/{request_id}/complete"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin completes: the request records who accepted it and when.
    let response = post_auth(
        &app,
        &format!("/api/v1/returning-requests/{request_id}/complete"),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "completed");
    assert!(json["data"]["accepted_by_user_id"].is_i64());
    assert_eq!(json["data"]["return_date"], today().to_string());

    // The assignment moved to returned in the same step.
    let assignment = AssignmentRepo::find_by_id(&pool, id)
        .await
        .expect("lookup should succeed")
        .expect("assignment must still exist");
    assert_eq!(assignment.state, "returned");

    // The asset is free again.
    assert_eq!(
        asset_state(&app, &fx.admin_token, fx.asset.id).await,
        "available"
    );

    // Completing twice is an invalid transition.
    let response = post_auth(
        &app,
        &format!("/api/v1/returning-requests/{request_id}/complete"),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

/// Cancelling a returning request leaves the assignment accepted; a new
/// request can then be opened.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_return_leaves_assignment_accepted(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_auth(
        &app,
        &format!("/api/v1/returning-requests/{request_id}/cancel"),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "cancelled");
    // A cancelled request never gets completion fields.
    assert!(json["data"]["accepted_by_user_id"].is_null());
    assert!(json["data"]["return_date"].is_null());

    let assignment = AssignmentRepo::find_by_id(&pool, id)
        .await
        .expect("lookup should succeed")
        .expect("assignment must still exist");
    assert_eq!(assignment.state, "accepted");

    // The asset stays assigned and a fresh request can be opened.
    assert_eq!(
        asset_state(&app, &fx.admin_token, fx.asset.id).await,
        "assigned"
    );
    let response = post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Waiting and declined assignments can be deleted; accepted ones cannot.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_assignment_rules(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    // Waiting: deletable, and deletion frees the asset.
    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();
    let response = delete_auth(&app, &format!("/api/v1/assignments/{id}"), &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        asset_state(&app, &fx.admin_token, fx.asset.id).await,
        "available"
    );

    // Accepted: not deletable.
    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    let response = delete_auth(&app, &format!("/api/v1/assignments/{id}"), &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Staff cannot delete at all.
    let response = delete_auth(&app, &format!("/api/v1/assignments/{id}"), &fx.staff_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A declined assignment is history and can be cleaned up.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_declined_assignment(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/decline"),
        &fx.staff_token,
    )
    .await;

    let response = delete_auth(&app, &format!("/api/v1/assignments/{id}"), &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Admin lists
// ---------------------------------------------------------------------------

/// The assignment list is admin-only and filters by state.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_assignments(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let category = create_category(&pool, "Monitor", "MO").await;
    let second = create_asset(&pool, &category, TEST_LOCATION, "Dell monitor").await;

    let first = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let first_id = first["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/v1/assignments/{first_id}/accept"),
        &fx.staff_token,
    )
    .await;
    create_assignment(&app, &fx.admin_token, second.id, fx.staff.id, today()).await;

    // Staff cannot see the admin list.
    let response = get_auth(&app, "/api/v1/assignments", &fx.staff_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(&app, "/api/v1/assignments", &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get_auth(&app, "/api/v1/assignments?state=accepted", &fx.admin_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], first_id);

    // Unknown state names are rejected.
    let response = get_auth(&app, "/api/v1/assignments?state=broken", &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The returning-request list is admin-only and filters by state.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_returning_requests(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let fx = fixture(&pool, &app).await;

    let data = create_assignment(&app, &fx.admin_token, fx.asset.id, fx.staff.id, today()).await;
    let id = data["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/accept"),
        &fx.staff_token,
    )
    .await;
    post_auth(
        &app,
        &format!("/api/v1/assignments/{id}/return-request"),
        &fx.staff_token,
    )
    .await;

    let response = get_auth(&app, "/api/v1/returning-requests", &fx.staff_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(&app, "/api/v1/returning-requests", &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["state"], "waiting_for_returning");
    assert_eq!(json["data"][0]["asset_code"], fx.asset.code.as_str());
    assert_eq!(json["data"][0]["requested_by_username"], "fixstaff");

    let response = get_auth(
        &app,
        "/api/v1/returning-requests?state=completed",
        &fx.admin_token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}
