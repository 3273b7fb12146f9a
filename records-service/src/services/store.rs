//! Storage abstraction used by the HTTP handlers.

use crate::models::{
    CreateProfessor, CreateStudent, LibraryMembership, MembershipDates, Professor,
    ProfessorWithStudents, Student, StudentWithProctor, UpdateMembership, UpdateProfessor,
    UpdateStudent,
};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A check constraint rejected the row's values.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Record store shared by all request handlers.
///
/// Implementations enforce aadhar-number uniqueness per entity type, one
/// membership per student, a membership window whose expiry does not precede
/// its issue date, and that `proctor_id` / `student_id` reference
/// existing rows. Deleting a professor clears `proctor_id` on their students;
/// deleting a student removes their membership.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    // Students
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;
    async fn list_students_with_proctor(&self) -> Result<Vec<StudentWithProctor>, StoreError>;
    async fn get_student(&self, student_id: Uuid) -> Result<Option<Student>, StoreError>;
    async fn find_student_by_aadhar(
        &self,
        aadhar_number: &str,
    ) -> Result<Option<Student>, StoreError>;
    async fn create_student(&self, input: &CreateStudent) -> Result<Student, StoreError>;
    async fn update_student(
        &self,
        student_id: Uuid,
        input: &UpdateStudent,
    ) -> Result<Option<Student>, StoreError>;
    async fn delete_student(&self, student_id: Uuid) -> Result<bool, StoreError>;

    // Professors
    async fn list_professors(&self) -> Result<Vec<Professor>, StoreError>;
    async fn get_professor(&self, professor_id: Uuid) -> Result<Option<Professor>, StoreError>;
    async fn find_professor_by_aadhar(
        &self,
        aadhar_number: &str,
    ) -> Result<Option<Professor>, StoreError>;
    async fn create_professor(
        &self,
        input: &CreateProfessor,
    ) -> Result<ProfessorWithStudents, StoreError>;
    async fn update_professor(
        &self,
        professor_id: Uuid,
        input: &UpdateProfessor,
    ) -> Result<Option<Professor>, StoreError>;
    async fn delete_professor(&self, professor_id: Uuid) -> Result<bool, StoreError>;

    // Proctorships
    async fn list_proctorships(
        &self,
        professor_id: Uuid,
    ) -> Result<Vec<StudentWithProctor>, StoreError>;
    async fn assign_proctor(
        &self,
        student_id: Uuid,
        professor_id: Uuid,
    ) -> Result<Option<Student>, StoreError>;

    // Library memberships
    async fn get_membership(
        &self,
        student_id: Uuid,
    ) -> Result<Option<LibraryMembership>, StoreError>;
    async fn create_membership(
        &self,
        student_id: Uuid,
        dates: MembershipDates,
    ) -> Result<LibraryMembership, StoreError>;
    async fn update_membership(
        &self,
        student_id: Uuid,
        input: &UpdateMembership,
    ) -> Result<Option<LibraryMembership>, StoreError>;
    async fn delete_membership(&self, student_id: Uuid) -> Result<bool, StoreError>;
}
