//! Integration tests for assignment state handling at the repository layer.
//!
//! Covers the guarded state UPDATE, the partial unique index that keeps an
//! asset inside at most one open assignment, and the scoping of the
//! "my assignments" listing.

use chrono::{Months, Utc};
use sqlx::PgPool;

use assetdesk_core::lifecycle::{AssetState, AssignmentState};
use assetdesk_core::roles::Role;
use assetdesk_db::models::asset::{Asset, CreateAsset};
use assetdesk_db::models::assignment::CreateAssignment;
use assetdesk_db::models::category::CreateCategory;
use assetdesk_db::models::user::{CreateUser, User};
use assetdesk_db::repositories::{
    AssetRepo, AssignmentRepo, CategoryRepo, LocationRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Base {
    admin: User,
    staff: User,
    asset: Asset,
}

/// Create the admin/staff/asset triple every assignment needs.
async fn base(pool: &PgPool) -> Base {
    let location_id = LocationRepo::list(pool)
        .await
        .unwrap()
        .first()
        .expect("locations are seeded by migration")
        .id;
    let admin = UserRepo::create(
        pool,
        &CreateUser {
            username: "flow_admin".to_string(),
            password_hash: "$argon2id$test-only".to_string(),
            role: Role::Admin,
            location_id,
        },
    )
    .await
    .unwrap();
    let staff = UserRepo::create(
        pool,
        &CreateUser {
            username: "flow_staff".to_string(),
            password_hash: "$argon2id$test-only".to_string(),
            role: Role::Staff,
            location_id,
        },
    )
    .await
    .unwrap();
    let category = CategoryRepo::create(
        pool,
        &CreateCategory {
            name: "Laptop".to_string(),
            code_prefix: "LA".to_string(),
        },
    )
    .await
    .unwrap();
    let code = AssetRepo::next_code(pool, &category.code_prefix).await.unwrap();
    let asset = AssetRepo::create(
        pool,
        &CreateAsset {
            name: "Dell XPS".to_string(),
            specification: Some("16GB RAM".to_string()),
            category_id: category.id,
            installed_date: None,
            state: AssetState::Available,
        },
        &code,
        location_id,
    )
    .await
    .unwrap();
    Base {
        admin,
        staff,
        asset,
    }
}

fn new_assignment(base: &Base) -> CreateAssignment {
    CreateAssignment {
        asset_id: base.asset.id,
        assigned_to_user_id: base.staff.id,
        assigned_date: Utc::now().date_naive(),
        note: Some("handle with care".to_string()),
    }
}

async fn second_asset(pool: &PgPool, base: &Base) -> Asset {
    let code = AssetRepo::next_code(pool, "LA").await.unwrap();
    AssetRepo::create(
        pool,
        &CreateAsset {
            name: "Thinkpad".to_string(),
            specification: None,
            category_id: base.asset.category_id,
            installed_date: None,
            state: AssetState::Available,
        },
        &code,
        base.asset.location_id,
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Test: creation starts in waiting_for_acceptance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_starts_waiting_for_acceptance(pool: PgPool) {
    let base = base(&pool).await;
    let assignment = AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .unwrap();

    assert_eq!(
        assignment.state().unwrap(),
        AssignmentState::WaitingForAcceptance
    );
    assert_eq!(assignment.assigned_by_user_id, base.admin.id);

    let open = AssignmentRepo::has_open_for_asset(&pool, base.asset.id)
        .await
        .unwrap();
    assert!(open, "a waiting assignment counts as open");
}

// ---------------------------------------------------------------------------
// Test: guarded accept moves state exactly once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_guarded_accept_moves_state_exactly_once(pool: PgPool) {
    let base = base(&pool).await;
    let assignment = AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .unwrap();

    let accepted = AssignmentRepo::update_state(
        &pool,
        assignment.id,
        AssignmentState::WaitingForAcceptance,
        AssignmentState::Accepted,
    )
    .await
    .unwrap();
    assert_eq!(
        accepted.expect("first accept wins").state().unwrap(),
        AssignmentState::Accepted
    );

    // Same guard again: the row is no longer waiting, so nothing matches.
    let again = AssignmentRepo::update_state(
        &pool,
        assignment.id,
        AssignmentState::WaitingForAcceptance,
        AssignmentState::Accepted,
    )
    .await
    .unwrap();
    assert!(again.is_none(), "second accept must find zero rows");
}

// ---------------------------------------------------------------------------
// Test: at most one open assignment per asset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_open_assignment_rejected_by_index(pool: PgPool) {
    let base = base(&pool).await;
    AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .unwrap();

    let second = AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id).await;
    let err = second.expect_err("second open assignment must violate the index");
    let db_err = err.as_database_error().expect("database-level error");
    assert_eq!(db_err.constraint(), Some("uq_assignments_open_asset"));
}

// ---------------------------------------------------------------------------
// Test: declining frees the asset for a new assignment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_declined_assignment_frees_asset(pool: PgPool) {
    let base = base(&pool).await;
    let assignment = AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .unwrap();

    AssignmentRepo::update_state(
        &pool,
        assignment.id,
        AssignmentState::WaitingForAcceptance,
        AssignmentState::Declined,
    )
    .await
    .unwrap()
    .expect("decline should win");

    let open = AssignmentRepo::has_open_for_asset(&pool, base.asset.id)
        .await
        .unwrap();
    assert!(!open, "declined assignment is closed");

    // The index only watches open states, so a fresh assignment is legal.
    AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .expect("asset freed by decline can be assigned again");
}

// ---------------------------------------------------------------------------
// Test: my-assignments listing excludes terminal states and future dates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_open_for_user_scoping(pool: PgPool) {
    let base = base(&pool).await;
    let today = Utc::now().date_naive();

    // Current open assignment: should be listed.
    let current = AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .unwrap();

    // Declined assignment on another asset: terminal, not listed.
    let asset_b = second_asset(&pool, &base).await;
    let declined = AssignmentRepo::create(
        &pool,
        &CreateAssignment {
            asset_id: asset_b.id,
            assigned_to_user_id: base.staff.id,
            assigned_date: today,
            note: None,
        },
        base.admin.id,
    )
    .await
    .unwrap();
    AssignmentRepo::update_state(
        &pool,
        declined.id,
        AssignmentState::WaitingForAcceptance,
        AssignmentState::Declined,
    )
    .await
    .unwrap();

    // Future-dated assignment on the freed asset: not visible yet.
    let future = AssignmentRepo::create(
        &pool,
        &CreateAssignment {
            asset_id: asset_b.id,
            assigned_to_user_id: base.staff.id,
            assigned_date: today + Months::new(1),
            note: None,
        },
        base.admin.id,
    )
    .await
    .unwrap();

    let mine = AssignmentRepo::list_open_for_user(&pool, base.staff.id, today)
        .await
        .unwrap();
    let ids: Vec<i64> = mine.iter().map(|a| a.id).collect();
    assert!(ids.contains(&current.id), "current assignment listed");
    assert!(!ids.contains(&declined.id), "declined assignment hidden");
    assert!(!ids.contains(&future.id), "future assignment hidden until its date");
}

// ---------------------------------------------------------------------------
// Test: details join carries display columns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_details_joins_display_columns(pool: PgPool) {
    let base = base(&pool).await;
    let assignment = AssignmentRepo::create(&pool, &new_assignment(&base), base.admin.id)
        .await
        .unwrap();

    let details = AssignmentRepo::find_details_by_id(&pool, assignment.id)
        .await
        .unwrap()
        .expect("details for live assignment");
    assert_eq!(details.asset_code, base.asset.code);
    assert_eq!(details.asset_name, "Dell XPS");
    assert_eq!(details.assigned_to_username, "flow_staff");
    assert_eq!(details.assigned_by_username, "flow_admin");
}
