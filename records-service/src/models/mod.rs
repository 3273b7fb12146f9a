//! Domain models for records-service.

mod library_membership;
mod professor;
mod student;

pub use library_membership::{LibraryMembership, MembershipDates, UpdateMembership};
pub use professor::{CreateProfessor, Professor, ProfessorWithStudents, UpdateProfessor};
pub use student::{CreateStudent, Student, StudentWithProctor, UpdateStudent};
