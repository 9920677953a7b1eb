use serde::Serialize;

use crate::error::ValidationError;

/// Pool slots below this are students.
pub const DEFAULT_STUDENT_END: usize = 104;
/// Pool slots in `[student_end, teacher_end)` are teachers; the rest are parents.
pub const DEFAULT_TEACHER_END: usize = 116;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

/// Splits the session-pool slot range into student, teacher, and parent bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleBands {
    student_end: usize,
    teacher_end: usize,
}

impl RoleBands {
    /// Creates role bands.
    ///
    /// # Errors
    ///
    /// Returns an error when `student_end > teacher_end`.
    pub fn new(student_end: usize, teacher_end: usize) -> Result<Self, ValidationError> {
        if student_end > teacher_end {
            return Err(ValidationError::RoleBandsOutOfOrder {
                student_end,
                teacher_end,
            });
        }
        Ok(Self {
            student_end,
            teacher_end,
        })
    }

    #[must_use]
    pub const fn student_end(&self) -> usize {
        self.student_end
    }

    #[must_use]
    pub const fn teacher_end(&self) -> usize {
        self.teacher_end
    }

    #[must_use]
    pub const fn role(&self, slot: usize) -> Role {
        if slot < self.student_end {
            Role::Student
        } else if slot < self.teacher_end {
            Role::Teacher
        } else {
            Role::Parent
        }
    }
}

impl Default for RoleBands {
    fn default() -> Self {
        Self {
            student_end: DEFAULT_STUDENT_END,
            teacher_end: DEFAULT_TEACHER_END,
        }
    }
}
