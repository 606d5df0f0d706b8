//! Role hierarchy and review routing.
//!
//! Roles form an explicit ordered chain (`Student < Lecturer < ProgramLeader <
//! PrincipalLecturer < FacultyManager`); submission routing is a single table
//! lookup on that chain. `Admin` sits outside the reporting chain but belongs
//! to the elevated (moderator) set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A user's role, ordered by position in the reporting chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Lecturer,
    ProgramLeader,
    PrincipalLecturer,
    FacultyManager,
    Admin,
}

impl Role {
    /// The role responsible for reviewing this role's submitted reports.
    ///
    /// This is the routing table: student reports go to lecturers, lecturer
    /// reports to program leaders, and so on up the chain. Roles at the top
    /// of the chain (and admins) have no reviewer.
    pub fn reviewer(self) -> Option<Role> {
        match self {
            Role::Student => Some(Role::Lecturer),
            Role::Lecturer => Some(Role::ProgramLeader),
            Role::ProgramLeader => Some(Role::PrincipalLecturer),
            Role::PrincipalLecturer => Some(Role::FacultyManager),
            Role::FacultyManager | Role::Admin => None,
        }
    }

    /// Whether this role may moderate reports (status/rating updates).
    pub fn is_elevated(self) -> bool {
        matches!(
            self,
            Role::Admin | Role::FacultyManager | Role::PrincipalLecturer | Role::ProgramLeader
        )
    }

    /// Whether this role sees submitted reports in its notification feed.
    pub fn reviews_submissions(self) -> bool {
        matches!(
            self,
            Role::Lecturer | Role::ProgramLeader | Role::PrincipalLecturer | Role::FacultyManager
        )
    }

    /// Whether a report from this role must reference a course.
    ///
    /// Every role except student reports against a specific course.
    pub fn requires_course_ref(self) -> bool {
        self != Role::Student
    }

    /// Stable snake_case name used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::ProgramLeader => "program_leader",
            Role::PrincipalLecturer => "principal_lecturer",
            Role::FacultyManager => "faculty_manager",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "lecturer" => Ok(Role::Lecturer),
            "program_leader" => Ok(Role::ProgramLeader),
            "principal_lecturer" => Ok(Role::PrincipalLecturer),
            "faculty_manager" => Ok(Role::FacultyManager),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_table_follows_the_chain() {
        assert_eq!(Role::Student.reviewer(), Some(Role::Lecturer));
        assert_eq!(Role::Lecturer.reviewer(), Some(Role::ProgramLeader));
        assert_eq!(Role::ProgramLeader.reviewer(), Some(Role::PrincipalLecturer));
        assert_eq!(Role::PrincipalLecturer.reviewer(), Some(Role::FacultyManager));
        assert_eq!(Role::FacultyManager.reviewer(), None);
        assert_eq!(Role::Admin.reviewer(), None);
    }

    #[test]
    fn elevated_set_matches_moderation_policy() {
        assert!(Role::Admin.is_elevated());
        assert!(Role::FacultyManager.is_elevated());
        assert!(Role::PrincipalLecturer.is_elevated());
        assert!(Role::ProgramLeader.is_elevated());
        assert!(!Role::Lecturer.is_elevated());
        assert!(!Role::Student.is_elevated());
    }

    #[test]
    fn only_students_skip_the_course_reference() {
        assert!(!Role::Student.requires_course_ref());
        assert!(Role::Lecturer.requires_course_ref());
        assert!(Role::FacultyManager.requires_course_ref());
    }

    #[test]
    fn roles_are_ordered_by_chain_position() {
        assert!(Role::Student < Role::Lecturer);
        assert!(Role::Lecturer < Role::ProgramLeader);
        assert!(Role::ProgramLeader < Role::PrincipalLecturer);
        assert!(Role::PrincipalLecturer < Role::FacultyManager);
    }

    #[test]
    fn round_trips_through_string_form() {
        for role in [
            Role::Student,
            Role::Lecturer,
            Role::ProgramLeader,
            Role::PrincipalLecturer,
            Role::FacultyManager,
            Role::Admin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("dean".parse::<Role>().is_err());
    }
}
