use std::collections::HashMap;

use anyhow::anyhow;
use rollcall_auth::{Caller, Operation, Target, allow};
use rollcall_core::AppError;
use rollcall_db::Store;
use rollcall_models::{
    ApplyLeaveDto, LeaveApplication, LeaveId, LeaveStatus, LeaveView, MessageResponse, NewLeave,
    ReviewLeaveDto, User, UserId,
};
use tracing::{info, instrument};

use crate::metrics::{track_leave_applied, track_leave_cancelled, track_leave_reviewed};
use crate::modules::authorize;

pub struct LeaveService;

impl LeaveService {
    /// Files a leave application for the caller. It always starts `Pending`.
    #[instrument(skip(store, dto))]
    pub async fn apply(
        store: &dyn Store,
        caller: &Caller,
        dto: ApplyLeaveDto,
    ) -> Result<LeaveApplication, AppError> {
        authorize(caller, Operation::ApplyLeave, &Target::None)?;

        let reason = dto.reason.trim();
        if reason.is_empty() {
            return Err(AppError::unprocessable(anyhow!("Reason is required")));
        }
        if dto.from_date > dto.to_date {
            return Err(AppError::unprocessable(anyhow!(
                "fromDate must not be after toDate"
            )));
        }

        let leave = store
            .insert_leave(NewLeave {
                student_id: caller.id,
                reason: reason.to_string(),
                from_date: dto.from_date,
                to_date: dto.to_date,
            })
            .await?;

        info!(leave_id = %leave.id, student_id = %leave.student_id, "Leave applied");
        track_leave_applied();

        Ok(leave)
    }

    #[instrument(skip(store))]
    pub async fn list_mine(
        store: &dyn Store,
        caller: &Caller,
    ) -> Result<Vec<LeaveApplication>, AppError> {
        authorize(caller, Operation::ViewOwnLeaves, &Target::Student(caller.id))?;

        Ok(store.list_leaves(Some(caller.id)).await?)
    }

    #[instrument(skip(store))]
    pub async fn list_all(store: &dyn Store, caller: &Caller) -> Result<Vec<LeaveView>, AppError> {
        authorize(caller, Operation::ListAllLeaves, &Target::None)?;

        let leaves = store.list_leaves(None).await?;

        let mut student_ids: Vec<UserId> = leaves.iter().map(|l| l.student_id).collect();
        student_ids.sort();
        student_ids.dedup();

        let students: HashMap<UserId, User> = store
            .find_users(&student_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(leaves
            .into_iter()
            .map(|leave| {
                let student = students.get(&leave.student_id);
                let name = student.map(|s| s.name.clone());
                let email = student.map(|s| s.email.clone());
                LeaveView::new(leave, name, email)
            })
            .collect())
    }

    /// Sets the outcome and reviewer together. A reviewed application may be
    /// reviewed again.
    #[instrument(skip(store))]
    pub async fn review(
        store: &dyn Store,
        caller: &Caller,
        id: LeaveId,
        dto: ReviewLeaveDto,
    ) -> Result<LeaveApplication, AppError> {
        authorize(caller, Operation::ReviewLeave, &Target::None)?;

        if !dto.status.is_review_outcome() {
            return Err(AppError::unprocessable(anyhow!(
                "Status must be Approved or Rejected"
            )));
        }

        let leave = store
            .review_leave(id, dto.status, caller.id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Leave application not found")))?;

        info!(
            leave_id = %leave.id,
            status = ?leave.status,
            reviewer = %caller.id,
            "Leave reviewed"
        );
        track_leave_reviewed(leave.status);

        Ok(leave)
    }

    /// Deletes the caller's own pending application.
    ///
    /// Missing and foreign applications both read as not found. The delete is
    /// conditional on the status still being pending, so a review that lands
    /// first wins.
    #[instrument(skip(store))]
    pub async fn cancel(
        store: &dyn Store,
        caller: &Caller,
        id: LeaveId,
    ) -> Result<MessageResponse, AppError> {
        let leave = store
            .find_leave(id)
            .await?
            .filter(|leave| leave.student_id == caller.id)
            .ok_or_else(|| AppError::not_found(anyhow!("Leave not found or not authorized")))?;

        let target = Target::Leave {
            student_id: leave.student_id,
            status: leave.status,
        };
        if !allow(caller, Operation::CancelLeave, &target) {
            return Err(only_pending());
        }

        if !store.delete_pending_leave(id, caller.id).await? {
            return Err(only_pending());
        }

        info!(leave_id = %id, "Leave cancelled");
        track_leave_cancelled();

        Ok(MessageResponse::new("Leave cancelled successfully"))
    }
}

fn only_pending() -> AppError {
    AppError::invalid_state(anyhow!("Only pending leaves can be cancelled"))
}
