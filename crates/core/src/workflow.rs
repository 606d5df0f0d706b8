//! Report workflow state machine.
//!
//! Pure transition guards for the report lifecycle. All checks return
//! [`CoreError`] so the API layer can map them straight to HTTP responses;
//! nothing here touches the database. The write itself (status, rating and
//! `submitted_to_role` together, under an optimistic version check) belongs
//! to the repository layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Lowest acceptable moderation rating.
pub const MIN_RATING: i32 = 1;

/// Highest acceptable moderation rating.
pub const MAX_RATING: i32 = 5;

// ---------------------------------------------------------------------------
// Status and feedback kinds
// ---------------------------------------------------------------------------

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Reviewed,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Whether a report in this status may still be moderated.
    ///
    /// `reviewed` is deliberately non-terminal: further feedback or an
    /// explicit moderation may still move it to approved/rejected.
    pub fn accepts_moderation(self) -> bool {
        matches!(self, ReportStatus::Submitted | ReportStatus::Reviewed)
    }

    /// Whether a report in this status is locked against edits and deletion.
    pub fn is_edit_locked(self) -> bool {
        matches!(self, ReportStatus::Approved | ReportStatus::Reviewed)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReportStatus::Draft),
            "submitted" => Ok(ReportStatus::Submitted),
            "reviewed" => Ok(ReportStatus::Reviewed),
            "approved" => Ok(ReportStatus::Approved),
            "rejected" => Ok(ReportStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown report status '{other}'"
            ))),
        }
    }
}

/// Kind of a feedback entry left by a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Approval,
    Rejection,
    Suggestion,
    Clarification,
}

impl FeedbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKind::Approval => "approval",
            FeedbackKind::Rejection => "rejection",
            FeedbackKind::Suggestion => "suggestion",
            FeedbackKind::Clarification => "clarification",
        }
    }

    /// The report status this feedback kind drives the parent report into.
    pub fn resulting_status(self) -> ReportStatus {
        match self {
            FeedbackKind::Approval => ReportStatus::Approved,
            FeedbackKind::Rejection => ReportStatus::Rejected,
            FeedbackKind::Suggestion | FeedbackKind::Clarification => ReportStatus::Reviewed,
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approval" => Ok(FeedbackKind::Approval),
            "rejection" => Ok(FeedbackKind::Rejection),
            "suggestion" => Ok(FeedbackKind::Suggestion),
            "clarification" => Ok(FeedbackKind::Clarification),
            other => Err(CoreError::Validation(format!(
                "Unknown feedback kind '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition guards
// ---------------------------------------------------------------------------

/// Validate a report creation payload and compute the routing target.
///
/// Returns `None` for the draft path (no routing assigned) and
/// `Some(target)` for the auto-submit path. The course-reference rule binds
/// submission, not drafting: a courseless draft is fine and gets caught by
/// [`check_submit`] if it is submitted as-is.
pub fn check_create(
    reporter_role: Role,
    course_id: Option<DbId>,
    auto_submit: bool,
) -> Result<Option<Option<Role>>, CoreError> {
    if auto_submit {
        check_course_ref(reporter_role, course_id)?;
        Ok(Some(reporter_role.reviewer()))
    } else {
        Ok(None)
    }
}

/// Validate an explicit draft submission and compute the routing target.
///
/// Only the owner may submit, and only from `draft`. The course-reference
/// rule is re-checked here: a draft created without one must gain it before
/// submission.
pub fn check_submit(
    caller_id: DbId,
    owner_id: DbId,
    owner_role: Role,
    course_id: Option<DbId>,
    status: ReportStatus,
) -> Result<Option<Role>, CoreError> {
    if caller_id != owner_id {
        return Err(CoreError::Forbidden(
            "Only the report owner may submit it".into(),
        ));
    }
    if status != ReportStatus::Draft {
        return Err(CoreError::InvalidState(format!(
            "Report cannot be submitted from status '{status}'"
        )));
    }
    check_course_ref(owner_role, course_id)?;
    Ok(owner_role.reviewer())
}

fn check_course_ref(role: Role, course_id: Option<DbId>) -> Result<(), CoreError> {
    if role.requires_course_ref() && course_id.is_none() {
        return Err(CoreError::Validation(format!(
            "Reports from role '{role}' must reference a course"
        )));
    }
    Ok(())
}

/// Validate a moderation request (status and/or rating update).
///
/// Moderation requires an elevated role, forbids self-moderation, only
/// targets approved/rejected/reviewed, and only applies to reports still in
/// a moderatable state.
pub fn check_moderation(
    caller_id: DbId,
    caller_role: Role,
    owner_id: DbId,
    current: ReportStatus,
    target: Option<ReportStatus>,
    rating: Option<i32>,
) -> Result<(), CoreError> {
    if !caller_role.is_elevated() {
        return Err(CoreError::Forbidden(format!(
            "Role '{caller_role}' may not moderate reports"
        )));
    }
    if caller_id == owner_id {
        return Err(CoreError::Forbidden(
            "Moderating your own report is not allowed".into(),
        ));
    }
    if target.is_none() && rating.is_none() {
        return Err(CoreError::Validation(
            "Moderation must set a status, a rating, or both".into(),
        ));
    }
    if let Some(t) = target {
        if !matches!(
            t,
            ReportStatus::Approved | ReportStatus::Rejected | ReportStatus::Reviewed
        ) {
            return Err(CoreError::Validation(format!(
                "'{t}' is not a valid moderation target status"
            )));
        }
    }
    if let Some(r) = rating {
        check_rating(r)?;
    }
    if !current.accepts_moderation() {
        return Err(CoreError::InvalidState(format!(
            "Report in status '{current}' cannot be moderated"
        )));
    }
    Ok(())
}

/// Validate applying a feedback entry to its parent report.
///
/// The feedback author must not be the report owner; the report must still
/// accept review activity.
pub fn check_feedback(
    author_id: DbId,
    owner_id: DbId,
    status: ReportStatus,
) -> Result<(), CoreError> {
    if author_id == owner_id {
        return Err(CoreError::Forbidden(
            "Leaving feedback on your own report is not allowed".into(),
        ));
    }
    if !status.accepts_moderation() {
        return Err(CoreError::InvalidState(format!(
            "Feedback cannot be applied to a report in status '{status}'"
        )));
    }
    Ok(())
}

/// Validate a content edit: owner-only, and never once approved or reviewed.
pub fn check_update(caller_id: DbId, owner_id: DbId, status: ReportStatus) -> Result<(), CoreError> {
    if status.is_edit_locked() {
        return Err(CoreError::InvalidState(format!(
            "Report in status '{status}' can no longer be edited"
        )));
    }
    if caller_id != owner_id {
        return Err(CoreError::Forbidden(
            "Only the report owner may edit it".into(),
        ));
    }
    Ok(())
}

/// Validate a deletion: owner-only, and never once approved or reviewed.
pub fn check_delete(caller_id: DbId, owner_id: DbId, status: ReportStatus) -> Result<(), CoreError> {
    if status.is_edit_locked() {
        return Err(CoreError::InvalidState(format!(
            "Report in status '{status}' can no longer be deleted"
        )));
    }
    if caller_id != owner_id {
        return Err(CoreError::Forbidden(
            "Only the report owner may delete it".into(),
        ));
    }
    Ok(())
}

/// Validate a moderation rating.
pub fn check_rating(rating: i32) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_submit_requires_course_for_non_students() {
        let err = check_create(Role::Lecturer, None, true).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // Students may report without a course reference.
        assert_eq!(
            check_create(Role::Student, None, true).unwrap(),
            Some(Some(Role::Lecturer))
        );
    }

    #[test]
    fn create_draft_assigns_no_routing() {
        assert_eq!(check_create(Role::Student, None, false).unwrap(), None);
        assert_eq!(check_create(Role::Lecturer, Some(3), false).unwrap(), None);
    }

    #[test]
    fn courseless_drafts_are_allowed_but_blocked_at_submission() {
        // Any role may park a courseless draft.
        assert_eq!(check_create(Role::Lecturer, None, false).unwrap(), None);

        // Submitting it as-is fails until a course is attached.
        let err = check_submit(1, 1, Role::Lecturer, None, ReportStatus::Draft).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        check_submit(1, 1, Role::Lecturer, Some(3), ReportStatus::Draft).unwrap();
    }

    #[test]
    fn auto_submit_routes_up_the_chain() {
        assert_eq!(
            check_create(Role::Lecturer, Some(3), true).unwrap(),
            Some(Some(Role::ProgramLeader))
        );
        assert_eq!(
            check_create(Role::PrincipalLecturer, Some(3), true).unwrap(),
            Some(Some(Role::FacultyManager))
        );
        // Top of the chain routes nowhere.
        assert_eq!(
            check_create(Role::FacultyManager, Some(3), true).unwrap(),
            Some(None)
        );
    }

    #[test]
    fn submit_is_owner_only() {
        let err = check_submit(2, 1, Role::Student, None, ReportStatus::Draft).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn submit_only_from_draft() {
        for status in [
            ReportStatus::Submitted,
            ReportStatus::Reviewed,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ] {
            let err = check_submit(1, 1, Role::Student, None, status).unwrap_err();
            assert!(matches!(err, CoreError::InvalidState(_)), "from {status}");
        }
    }

    #[test]
    fn submit_computes_routing_from_owner_role() {
        assert_eq!(
            check_submit(1, 1, Role::Student, None, ReportStatus::Draft).unwrap(),
            Some(Role::Lecturer)
        );
        assert_eq!(
            check_submit(1, 1, Role::Lecturer, Some(3), ReportStatus::Draft).unwrap(),
            Some(Role::ProgramLeader)
        );
        assert_eq!(
            check_submit(1, 1, Role::PrincipalLecturer, Some(3), ReportStatus::Draft).unwrap(),
            Some(Role::FacultyManager)
        );
    }

    #[test]
    fn self_moderation_always_forbidden() {
        for role in [
            Role::Admin,
            Role::FacultyManager,
            Role::PrincipalLecturer,
            Role::ProgramLeader,
        ] {
            let err = check_moderation(
                7,
                role,
                7,
                ReportStatus::Submitted,
                Some(ReportStatus::Approved),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::Forbidden(_)), "role {role}");
        }
    }

    #[test]
    fn moderation_requires_elevated_role() {
        let err = check_moderation(
            2,
            Role::Lecturer,
            1,
            ReportStatus::Submitted,
            Some(ReportStatus::Approved),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn moderation_rejects_out_of_range_rating() {
        for bad in [0, 6, -1] {
            let err = check_moderation(
                2,
                Role::Admin,
                1,
                ReportStatus::Submitted,
                None,
                Some(bad),
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "rating {bad}");
        }
        check_moderation(2, Role::Admin, 1, ReportStatus::Submitted, None, Some(4)).unwrap();
    }

    #[test]
    fn moderation_rejects_draft_and_terminal_states() {
        for status in [
            ReportStatus::Draft,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ] {
            let err = check_moderation(
                2,
                Role::Admin,
                1,
                status,
                Some(ReportStatus::Reviewed),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::InvalidState(_)), "from {status}");
        }
    }

    #[test]
    fn reviewed_reports_can_be_moderated_again() {
        check_moderation(
            2,
            Role::ProgramLeader,
            1,
            ReportStatus::Reviewed,
            Some(ReportStatus::Approved),
            Some(5),
        )
        .unwrap();
    }

    #[test]
    fn moderation_target_must_be_review_outcome() {
        for bad in [ReportStatus::Draft, ReportStatus::Submitted] {
            let err =
                check_moderation(2, Role::Admin, 1, ReportStatus::Submitted, Some(bad), None)
                    .unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "target {bad}");
        }
    }

    #[test]
    fn moderation_with_no_changes_is_invalid() {
        let err =
            check_moderation(2, Role::Admin, 1, ReportStatus::Submitted, None, None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn feedback_kind_drives_resulting_status() {
        assert_eq!(
            FeedbackKind::Approval.resulting_status(),
            ReportStatus::Approved
        );
        assert_eq!(
            FeedbackKind::Rejection.resulting_status(),
            ReportStatus::Rejected
        );
        assert_eq!(
            FeedbackKind::Suggestion.resulting_status(),
            ReportStatus::Reviewed
        );
        assert_eq!(
            FeedbackKind::Clarification.resulting_status(),
            ReportStatus::Reviewed
        );
    }

    #[test]
    fn feedback_on_own_report_forbidden() {
        let err = check_feedback(1, 1, ReportStatus::Submitted).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn edit_and_delete_locked_once_approved_or_reviewed() {
        for status in [ReportStatus::Approved, ReportStatus::Reviewed] {
            assert!(matches!(
                check_update(1, 1, status).unwrap_err(),
                CoreError::InvalidState(_)
            ));
            assert!(matches!(
                check_delete(1, 1, status).unwrap_err(),
                CoreError::InvalidState(_)
            ));
        }
    }

    #[test]
    fn edits_are_owner_only() {
        check_update(1, 1, ReportStatus::Draft).unwrap();
        // Submitted and rejected reports are still editable by the owner.
        check_update(1, 1, ReportStatus::Submitted).unwrap();
        check_update(1, 1, ReportStatus::Rejected).unwrap();
        assert!(matches!(
            check_update(2, 1, ReportStatus::Draft).unwrap_err(),
            CoreError::Forbidden(_)
        ));
    }

    #[test]
    fn rejected_drafts_can_still_be_deleted_by_owner() {
        check_delete(1, 1, ReportStatus::Draft).unwrap();
        check_delete(1, 1, ReportStatus::Rejected).unwrap();
        assert!(matches!(
            check_delete(2, 1, ReportStatus::Draft).unwrap_err(),
            CoreError::Forbidden(_)
        ));
    }

    #[test]
    fn status_round_trips_through_string_form() {
        for status in [
            ReportStatus::Draft,
            ReportStatus::Submitted,
            ReportStatus::Reviewed,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ReportStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ReportStatus>().is_err());
    }
}
