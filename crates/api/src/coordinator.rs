//! Assignment coordinator: the write path for assignments and returning
//! requests.
//!
//! Every mutation follows the same shape: load the row, consult the pure
//! transition functions in `assetdesk_core::lifecycle`, then apply the write
//! through a state-guarded UPDATE. The guard re-checks the expected state
//! inside the database, so two racing writers cannot both win; the loser's
//! UPDATE matches zero rows and the row is re-read to report the transition
//! that actually failed.
//!
//! Permission placement: the HTTP layer's extractors decide the ROLE, the
//! coordinator decides OWNERSHIP (only the assignee may accept, decline, or
//! request a return on their assignment).

use chrono::Utc;

use assetdesk_core::error::CoreError;
use assetdesk_core::lifecycle::{
    assignment, returning, AssignmentEvent, AssignmentState, ReturningEvent, ReturningState,
};
use assetdesk_core::principal::Principal;
use assetdesk_core::types::DbId;
use assetdesk_db::models::assignment::{Assignment, CreateAssignment};
use assetdesk_db::models::returning_request::ReturningRequest;
use assetdesk_db::repositories::{AssetRepo, AssignmentRepo, ReturningRequestRepo, UserRepo};
use assetdesk_db::DbPool;

use crate::error::{AppError, AppResult};

/// Coordinates assignment and returning-request writes against the
/// lifecycle rules. Stateless; every method takes the pool.
pub struct AssignmentCoordinator;

impl AssignmentCoordinator {
    /// Create an assignment handing `asset_id` to `assigned_to_user_id`.
    ///
    /// Checks, in order: the assigned date is within a year of today, the
    /// assignee is a live account in the admin's location, and the asset is
    /// effectively available (not assigned, not recycled, ...). Entities
    /// outside the admin's location read as not found rather than forbidden,
    /// so their existence is not revealed across locations.
    pub async fn create_assignment(
        pool: &DbPool,
        admin: &Principal,
        input: &CreateAssignment,
    ) -> AppResult<Assignment> {
        assignment::validate_assigned_date(input.assigned_date, Utc::now().date_naive())?;

        let assignee = UserRepo::find_by_id(pool, input.assigned_to_user_id)
            .await?
            .filter(|u| u.location_id == admin.location_id)
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: input.assigned_to_user_id,
            })?;
        if !assignee.is_active {
            return Err(CoreError::Validation(
                "Assignee account is deactivated".to_string(),
            )
            .into());
        }

        let asset = AssetRepo::find_with_state(pool, input.asset_id)
            .await?
            .filter(|a| a.location_id == admin.location_id)
            .ok_or(CoreError::NotFound {
                entity: "Asset",
                id: input.asset_id,
            })?;
        let effective = asset.effective_state()?;
        if !effective.is_assignable() {
            return Err(CoreError::Conflict(format!(
                "Asset {} is {} and cannot be assigned",
                asset.code, effective
            ))
            .into());
        }

        // The availability check above can race another create; the partial
        // unique index on open assignments then fails this insert and the
        // error classifier reports the conflict.
        let created = AssignmentRepo::create(pool, input, admin.subject_id).await?;

        tracing::info!(
            assignment_id = created.id,
            asset_id = created.asset_id,
            assigned_to = created.assigned_to_user_id,
            assigned_by = admin.subject_id,
            "Assignment created"
        );
        Ok(created)
    }

    /// Assignee accepts a waiting assignment.
    pub async fn accept(pool: &DbPool, principal: &Principal, id: DbId) -> AppResult<Assignment> {
        Self::assignee_event(pool, principal, id, AssignmentEvent::Accept).await
    }

    /// Assignee declines a waiting assignment, freeing the asset.
    pub async fn decline(pool: &DbPool, principal: &Principal, id: DbId) -> AppResult<Assignment> {
        Self::assignee_event(pool, principal, id, AssignmentEvent::Decline).await
    }

    /// Apply an assignee-initiated event (accept or decline) to an
    /// assignment owned by `principal`.
    async fn assignee_event(
        pool: &DbPool,
        principal: &Principal,
        id: DbId,
        event: AssignmentEvent,
    ) -> AppResult<Assignment> {
        let current = Self::load_assignment(pool, id).await?;
        if current.assigned_to_user_id != principal.subject_id {
            return Err(CoreError::Forbidden(format!(
                "Only the assignee can {} an assignment",
                event.as_str()
            ))
            .into());
        }

        let from = current.state()?;
        let to = assignment::transition(from, event)?;

        match AssignmentRepo::update_state(pool, id, from, to).await? {
            Some(updated) => {
                tracing::info!(
                    assignment_id = updated.id,
                    user_id = principal.subject_id,
                    event = event.as_str(),
                    state = %updated.state,
                    "Assignment updated"
                );
                Ok(updated)
            }
            // Lost a race: the row moved between our read and the guarded
            // UPDATE. Report the transition against the state that is
            // actually there now.
            None => Err(Self::assignment_conflict(pool, id, event.as_str()).await?),
        }
    }

    /// Assignee opens a returning request for their accepted assignment.
    ///
    /// At most one open request may exist per assignment; a second attempt
    /// reports the existing one as a conflict.
    pub async fn request_return(
        pool: &DbPool,
        principal: &Principal,
        assignment_id: DbId,
    ) -> AppResult<ReturningRequest> {
        let current = Self::load_assignment(pool, assignment_id).await?;
        if current.assigned_to_user_id != principal.subject_id {
            return Err(CoreError::Forbidden(
                "Only the assignee can request a return".to_string(),
            )
            .into());
        }

        let state = current.state()?;
        if state != AssignmentState::Accepted {
            return Err(CoreError::Conflict(format!(
                "Assignment {assignment_id} is {state}; only accepted assignments can be returned"
            ))
            .into());
        }

        if ReturningRequestRepo::find_open_for_assignment(pool, assignment_id)
            .await?
            .is_some()
        {
            return Err(CoreError::ConflictingOpenRequest { assignment_id }.into());
        }

        // Two racing requests both pass the check above; the partial unique
        // index lets only one insert through.
        let created = ReturningRequestRepo::create(pool, assignment_id, principal.subject_id).await?;

        tracing::info!(
            request_id = created.id,
            assignment_id,
            requested_by = principal.subject_id,
            "Returning request created"
        );
        Ok(created)
    }

    /// Admin completes a waiting returning request.
    ///
    /// The request moves to `completed` (recording the admin and today's
    /// date) and its assignment moves to `returned` in the same transaction.
    pub async fn complete_return(
        pool: &DbPool,
        admin: &Principal,
        request_id: DbId,
    ) -> AppResult<(ReturningRequest, Assignment)> {
        let current = Self::load_request(pool, request_id).await?;
        returning::transition(current.state()?, ReturningEvent::Complete)?;

        let return_date = Utc::now().date_naive();
        match ReturningRequestRepo::complete(pool, request_id, admin.subject_id, return_date).await?
        {
            Some((request, assignment)) => {
                tracing::info!(
                    request_id = request.id,
                    assignment_id = assignment.id,
                    accepted_by = admin.subject_id,
                    %return_date,
                    "Returning request completed"
                );
                Ok((request, assignment))
            }
            // One of the two guarded UPDATEs matched nothing. Re-read to
            // tell which side refused.
            None => {
                let seen = Self::load_request(pool, request_id).await?;
                let seen_state = seen.state()?;
                if seen_state == ReturningState::WaitingForReturning {
                    // The request is still waiting, so the assignment side
                    // refused (not accepted any more).
                    Err(Self::assignment_conflict(pool, seen.assignment_id, "return_completed")
                        .await?)
                } else {
                    Err(CoreError::InvalidTransition {
                        entity: "ReturningRequest",
                        from: seen_state.as_str(),
                        event: "complete",
                    }
                    .into())
                }
            }
        }
    }

    /// Admin cancels a waiting returning request. The assignment stays
    /// accepted; the assignee may request again later.
    pub async fn cancel_return(
        pool: &DbPool,
        admin: &Principal,
        request_id: DbId,
    ) -> AppResult<ReturningRequest> {
        let current = Self::load_request(pool, request_id).await?;
        returning::transition(current.state()?, ReturningEvent::Cancel)?;

        match ReturningRequestRepo::cancel(pool, request_id).await? {
            Some(cancelled) => {
                tracing::info!(
                    request_id = cancelled.id,
                    assignment_id = cancelled.assignment_id,
                    cancelled_by = admin.subject_id,
                    "Returning request cancelled"
                );
                Ok(cancelled)
            }
            None => {
                let seen = Self::load_request(pool, request_id).await?;
                Err(CoreError::InvalidTransition {
                    entity: "ReturningRequest",
                    from: seen.state()?.as_str(),
                    event: "cancel",
                }
                .into())
            }
        }
    }

    /// Admin soft-deletes an assignment that never went live (still waiting,
    /// or declined). Accepted and returned assignments are history and are
    /// not deletable.
    pub async fn delete_assignment(pool: &DbPool, admin: &Principal, id: DbId) -> AppResult<()> {
        let current = Self::load_assignment(pool, id).await?;
        let state = current.state()?;
        if !state.is_deletable() {
            return Err(CoreError::Conflict(format!(
                "Assignment {id} is {state} and cannot be deleted"
            ))
            .into());
        }

        // The repo re-checks deletability inside the UPDATE, so a concurrent
        // accept cannot slip a live assignment into the deleted set.
        if AssignmentRepo::soft_delete(pool, id).await? {
            tracing::info!(
                assignment_id = id,
                deleted_by = admin.subject_id,
                "Assignment deleted"
            );
            Ok(())
        } else {
            let seen = Self::load_assignment(pool, id).await?;
            Err(CoreError::Conflict(format!(
                "Assignment {id} is {} and cannot be deleted",
                seen.state()?
            ))
            .into())
        }
    }

    async fn load_assignment(pool: &DbPool, id: DbId) -> AppResult<Assignment> {
        AssignmentRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::from(CoreError::NotFound { entity: "Assignment", id }))
    }

    async fn load_request(pool: &DbPool, id: DbId) -> AppResult<ReturningRequest> {
        ReturningRequestRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| {
                AppError::from(CoreError::NotFound {
                    entity: "ReturningRequest",
                    id,
                })
            })
    }

    /// Build the invalid-transition error for an assignment event that lost
    /// its guarded UPDATE, naming the state the row is in now.
    async fn assignment_conflict(
        pool: &DbPool,
        id: DbId,
        event: &'static str,
    ) -> AppResult<AppError> {
        let seen = Self::load_assignment(pool, id).await?;
        Ok(CoreError::InvalidTransition {
            entity: "Assignment",
            from: seen.state()?.as_str(),
            event,
        }
        .into())
    }
}
