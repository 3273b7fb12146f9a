//! Process-local record store.
//!
//! Mirrors the PostgreSQL schema's constraints so handlers observe the same
//! conflicts and reference failures. Used by tests and by `STORE_BACKEND=memory`.

use crate::models::{
    CreateProfessor, CreateStudent, LibraryMembership, MembershipDates, Professor,
    ProfessorWithStudents, Student, StudentWithProctor, UpdateMembership, UpdateProfessor,
    UpdateStudent,
};
use crate::services::store::{RecordStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    professors: Vec<Professor>,
    students: Vec<Student>,
    memberships: Vec<LibraryMembership>,
}

impl Tables {
    fn professor(&self, id: Uuid) -> Option<&Professor> {
        self.professors.iter().find(|p| p.id == id)
    }

    fn student_mut(&mut self, id: Uuid) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == id)
    }

    fn with_proctor(&self, student: &Student) -> StudentWithProctor {
        StudentWithProctor {
            student: student.clone(),
            proctor: student
                .proctor_id
                .and_then(|id| self.professor(id).cloned()),
        }
    }

    fn check_proctor(&self, proctor_id: Option<Uuid>, message: &str) -> Result<(), StoreError> {
        match proctor_id {
            Some(id) if self.professor(id).is_none() => {
                Err(StoreError::InvalidReference(message.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn invalid_window() -> StoreError {
    StoreError::InvalidValue("expiry_date precedes issue_date".to_string())
}

/// In-memory implementation of [`RecordStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail as if the backing store were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "Memory store marked unavailable".to_string(),
            ));
        }
        self.tables
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Memory store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.tables()?.students.clone())
    }

    async fn list_students_with_proctor(&self) -> Result<Vec<StudentWithProctor>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .students
            .iter()
            .map(|s| tables.with_proctor(s))
            .collect())
    }

    async fn get_student(&self, student_id: Uuid) -> Result<Option<Student>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.students.iter().find(|s| s.id == student_id).cloned())
    }

    async fn find_student_by_aadhar(
        &self,
        aadhar_number: &str,
    ) -> Result<Option<Student>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .students
            .iter()
            .find(|s| s.aadhar_number == aadhar_number)
            .cloned())
    }

    async fn create_student(&self, input: &CreateStudent) -> Result<Student, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .students
            .iter()
            .any(|s| s.aadhar_number == input.aadhar_number)
        {
            return Err(StoreError::Conflict(
                "Aadhar number already exists".to_string(),
            ));
        }
        tables.check_proctor(input.proctor_id, "Professor not found")?;

        let student = Student {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            date_of_birth: input.date_of_birth,
            aadhar_number: input.aadhar_number.clone(),
            proctor_id: input.proctor_id,
        };
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn update_student(
        &self,
        student_id: Uuid,
        input: &UpdateStudent,
    ) -> Result<Option<Student>, StoreError> {
        let mut tables = self.tables()?;
        if let Some(aadhar_number) = &input.aadhar_number {
            if tables
                .students
                .iter()
                .any(|s| s.id != student_id && &s.aadhar_number == aadhar_number)
            {
                return Err(StoreError::Conflict(
                    "Aadhar number already exists".to_string(),
                ));
            }
        }
        if let Some(proctor_id) = input.proctor_id {
            tables.check_proctor(proctor_id, "Professor does not exist")?;
        }

        Ok(tables.student_mut(student_id).map(|student| {
            student.apply(input);
            student.clone()
        }))
    }

    async fn delete_student(&self, student_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != student_id);
        let deleted = tables.students.len() < before;
        if deleted {
            tables.memberships.retain(|m| m.student_id != student_id);
        }
        Ok(deleted)
    }

    async fn list_professors(&self) -> Result<Vec<Professor>, StoreError> {
        Ok(self.tables()?.professors.clone())
    }

    async fn get_professor(&self, professor_id: Uuid) -> Result<Option<Professor>, StoreError> {
        Ok(self.tables()?.professor(professor_id).cloned())
    }

    async fn find_professor_by_aadhar(
        &self,
        aadhar_number: &str,
    ) -> Result<Option<Professor>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .professors
            .iter()
            .find(|p| p.aadhar_number == aadhar_number)
            .cloned())
    }

    async fn create_professor(
        &self,
        input: &CreateProfessor,
    ) -> Result<ProfessorWithStudents, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .professors
            .iter()
            .any(|p| p.aadhar_number == input.aadhar_number)
        {
            return Err(StoreError::Conflict(
                "Aadhar number already exists".to_string(),
            ));
        }

        let professor = Professor {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            seniority: input.seniority.clone(),
            aadhar_number: input.aadhar_number.clone(),
        };
        tables.professors.push(professor.clone());
        Ok(ProfessorWithStudents {
            professor,
            student: Vec::new(),
        })
    }

    async fn update_professor(
        &self,
        professor_id: Uuid,
        input: &UpdateProfessor,
    ) -> Result<Option<Professor>, StoreError> {
        let mut tables = self.tables()?;
        if let Some(aadhar_number) = &input.aadhar_number {
            if tables
                .professors
                .iter()
                .any(|p| p.id != professor_id && &p.aadhar_number == aadhar_number)
            {
                return Err(StoreError::Conflict(
                    "Aadhar number already exists".to_string(),
                ));
            }
        }

        Ok(tables
            .professors
            .iter_mut()
            .find(|p| p.id == professor_id)
            .map(|professor| {
                professor.apply(input);
                professor.clone()
            }))
    }

    async fn delete_professor(&self, professor_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.professors.len();
        tables.professors.retain(|p| p.id != professor_id);
        let deleted = tables.professors.len() < before;
        if deleted {
            for student in tables
                .students
                .iter_mut()
                .filter(|s| s.proctor_id == Some(professor_id))
            {
                student.proctor_id = None;
            }
        }
        Ok(deleted)
    }

    async fn list_proctorships(
        &self,
        professor_id: Uuid,
    ) -> Result<Vec<StudentWithProctor>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .students
            .iter()
            .filter(|s| s.proctor_id == Some(professor_id))
            .map(|s| tables.with_proctor(s))
            .collect())
    }

    async fn assign_proctor(
        &self,
        student_id: Uuid,
        professor_id: Uuid,
    ) -> Result<Option<Student>, StoreError> {
        let mut tables = self.tables()?;
        tables.check_proctor(Some(professor_id), "Professor not found")?;
        Ok(tables.student_mut(student_id).map(|student| {
            student.proctor_id = Some(professor_id);
            student.clone()
        }))
    }

    async fn get_membership(
        &self,
        student_id: Uuid,
    ) -> Result<Option<LibraryMembership>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.student_id == student_id)
            .cloned())
    }

    async fn create_membership(
        &self,
        student_id: Uuid,
        dates: MembershipDates,
    ) -> Result<LibraryMembership, StoreError> {
        let mut tables = self.tables()?;
        if !tables.students.iter().any(|s| s.id == student_id) {
            return Err(StoreError::InvalidReference(
                "Student not found".to_string(),
            ));
        }
        if tables.memberships.iter().any(|m| m.student_id == student_id) {
            return Err(StoreError::Conflict(
                "Student already has a library membership".to_string(),
            ));
        }

        let membership = LibraryMembership {
            id: Uuid::new_v4(),
            student_id,
            issue_date: dates.issue_date,
            expiry_date: dates.expiry_date,
        };
        if !membership.is_valid_window() {
            return Err(invalid_window());
        }
        tables.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn update_membership(
        &self,
        student_id: Uuid,
        input: &UpdateMembership,
    ) -> Result<Option<LibraryMembership>, StoreError> {
        let mut tables = self.tables()?;
        let Some(membership) = tables
            .memberships
            .iter_mut()
            .find(|m| m.student_id == student_id)
        else {
            return Ok(None);
        };

        let mut updated = membership.clone();
        updated.apply(input);
        if !updated.is_valid_window() {
            return Err(invalid_window());
        }
        *membership = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_membership(&self, student_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.memberships.len();
        tables.memberships.retain(|m| m.student_id != student_id);
        Ok(tables.memberships.len() < before)
    }
}
