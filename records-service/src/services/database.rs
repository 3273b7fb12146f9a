//! PostgreSQL-backed record store.

use crate::models::{
    CreateProfessor, CreateStudent, LibraryMembership, MembershipDates, Professor,
    ProfessorWithStudents, Student, StudentWithProctor, UpdateMembership, UpdateProfessor,
    UpdateStudent,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{RecordStore, StoreError};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const STUDENT_COLUMNS: &str = "id, name, date_of_birth, aadhar_number, proctor_id";
const PROFESSOR_COLUMNS: &str = "id, name, seniority, aadhar_number";
const MEMBERSHIP_COLUMNS: &str = "id, student_id, issue_date, expiry_date";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Translate constraint violations into store errors; everything else stays a
/// database error.
fn map_write_error(err: sqlx::Error, conflict: &str, reference: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(conflict.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::InvalidReference(reference.to_string());
        }
        if db_err.is_check_violation() {
            return StoreError::InvalidValue(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "records-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn professors_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Professor>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let professors = sqlx::query_as::<_, Professor>(&format!(
            "SELECT {PROFESSOR_COLUMNS} FROM professors WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(professors.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn attach_proctors(
        &self,
        students: Vec<Student>,
    ) -> Result<Vec<StudentWithProctor>, StoreError> {
        let mut ids: Vec<Uuid> = students.iter().filter_map(|s| s.proctor_id).collect();
        ids.sort();
        ids.dedup();
        let professors = self.professors_by_ids(ids).await?;

        Ok(students
            .into_iter()
            .map(|student| {
                let proctor = student
                    .proctor_id
                    .and_then(|id| professors.get(&id).cloned());
                StudentWithProctor { student, proctor }
            })
            .collect())
    }
}

#[async_trait]
impl RecordStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Student Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_students"])
            .start_timer();

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_utc, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(students)
    }

    #[instrument(skip(self))]
    async fn list_students_with_proctor(&self) -> Result<Vec<StudentWithProctor>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_students_with_proctor"])
            .start_timer();

        let students = self.list_students().await?;
        let enriched = self.attach_proctors(students).await?;

        timer.observe_duration();
        Ok(enriched)
    }

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn get_student(&self, student_id: Uuid) -> Result<Option<Student>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_student"])
            .start_timer();

        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(student)
    }

    #[instrument(skip(self, aadhar_number))]
    async fn find_student_by_aadhar(
        &self,
        aadhar_number: &str,
    ) -> Result<Option<Student>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_student_by_aadhar"])
            .start_timer();

        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE aadhar_number = $1"
        ))
        .bind(aadhar_number)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(student)
    }

    #[instrument(skip(self, input))]
    async fn create_student(&self, input: &CreateStudent) -> Result<Student, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_student"])
            .start_timer();

        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (id, name, date_of_birth, aadhar_number, proctor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.date_of_birth)
        .bind(&input.aadhar_number)
        .bind(input.proctor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Aadhar number already exists", "Professor not found"))?;

        timer.observe_duration();

        info!(student_id = %student.id, "Student created");

        Ok(student)
    }

    #[instrument(skip(self, input), fields(student_id = %student_id))]
    async fn update_student(
        &self,
        student_id: Uuid,
        input: &UpdateStudent,
    ) -> Result<Option<Student>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_student"])
            .start_timer();

        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET name = COALESCE($2, name),
                date_of_birth = COALESCE($3, date_of_birth),
                aadhar_number = COALESCE($4, aadhar_number),
                proctor_id = CASE WHEN $5 THEN $6::uuid ELSE proctor_id END
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(student_id)
        .bind(&input.name)
        .bind(input.date_of_birth)
        .bind(&input.aadhar_number)
        .bind(input.proctor_id.is_some())
        .bind(input.proctor_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, "Aadhar number already exists", "Professor does not exist")
        })?;

        timer.observe_duration();

        if student.is_some() {
            info!("Student updated");
        }

        Ok(student)
    }

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn delete_student(&self, student_id: Uuid) -> Result<bool, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_student"])
            .start_timer();

        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Student deleted");
        }
        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Professor Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_professors(&self) -> Result<Vec<Professor>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_professors"])
            .start_timer();

        let professors = sqlx::query_as::<_, Professor>(&format!(
            "SELECT {PROFESSOR_COLUMNS} FROM professors ORDER BY created_utc, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(professors)
    }

    #[instrument(skip(self), fields(professor_id = %professor_id))]
    async fn get_professor(&self, professor_id: Uuid) -> Result<Option<Professor>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_professor"])
            .start_timer();

        let professor = sqlx::query_as::<_, Professor>(&format!(
            "SELECT {PROFESSOR_COLUMNS} FROM professors WHERE id = $1"
        ))
        .bind(professor_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(professor)
    }

    #[instrument(skip(self, aadhar_number))]
    async fn find_professor_by_aadhar(
        &self,
        aadhar_number: &str,
    ) -> Result<Option<Professor>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_professor_by_aadhar"])
            .start_timer();

        let professor = sqlx::query_as::<_, Professor>(&format!(
            "SELECT {PROFESSOR_COLUMNS} FROM professors WHERE aadhar_number = $1"
        ))
        .bind(aadhar_number)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(professor)
    }

    #[instrument(skip(self, input))]
    async fn create_professor(
        &self,
        input: &CreateProfessor,
    ) -> Result<ProfessorWithStudents, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_professor"])
            .start_timer();

        let professor = sqlx::query_as::<_, Professor>(&format!(
            r#"
            INSERT INTO professors (id, name, seniority, aadhar_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROFESSOR_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.seniority)
        .bind(&input.aadhar_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Aadhar number already exists", "Invalid reference"))?;

        timer.observe_duration();

        info!(professor_id = %professor.id, "Professor created");

        // A fresh professor cannot proctor anyone yet.
        Ok(ProfessorWithStudents {
            professor,
            student: Vec::new(),
        })
    }

    #[instrument(skip(self, input), fields(professor_id = %professor_id))]
    async fn update_professor(
        &self,
        professor_id: Uuid,
        input: &UpdateProfessor,
    ) -> Result<Option<Professor>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_professor"])
            .start_timer();

        let professor = sqlx::query_as::<_, Professor>(&format!(
            r#"
            UPDATE professors
            SET name = COALESCE($2, name),
                seniority = COALESCE($3, seniority),
                aadhar_number = COALESCE($4, aadhar_number)
            WHERE id = $1
            RETURNING {PROFESSOR_COLUMNS}
            "#
        ))
        .bind(professor_id)
        .bind(&input.name)
        .bind(&input.seniority)
        .bind(&input.aadhar_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Aadhar number already exists", "Invalid reference"))?;

        timer.observe_duration();

        if professor.is_some() {
            info!("Professor updated");
        }

        Ok(professor)
    }

    #[instrument(skip(self), fields(professor_id = %professor_id))]
    async fn delete_professor(&self, professor_id: Uuid) -> Result<bool, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_professor"])
            .start_timer();

        // students.proctor_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM professors WHERE id = $1")
            .bind(professor_id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Professor deleted");
        }
        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Proctorship Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self), fields(professor_id = %professor_id))]
    async fn list_proctorships(
        &self,
        professor_id: Uuid,
    ) -> Result<Vec<StudentWithProctor>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_proctorships"])
            .start_timer();

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE proctor_id = $1 ORDER BY created_utc, id"
        ))
        .bind(professor_id)
        .fetch_all(&self.pool)
        .await?;
        let enriched = self.attach_proctors(students).await?;

        timer.observe_duration();
        Ok(enriched)
    }

    #[instrument(skip(self), fields(student_id = %student_id, professor_id = %professor_id))]
    async fn assign_proctor(
        &self,
        student_id: Uuid,
        professor_id: Uuid,
    ) -> Result<Option<Student>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["assign_proctor"])
            .start_timer();

        let student = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students SET proctor_id = $2 WHERE id = $1 RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(student_id)
        .bind(professor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Conflict", "Professor not found"))?;

        timer.observe_duration();

        if student.is_some() {
            info!("Proctor assigned");
        }

        Ok(student)
    }

    // -------------------------------------------------------------------------
    // Library Membership Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn get_membership(
        &self,
        student_id: Uuid,
    ) -> Result<Option<LibraryMembership>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_membership"])
            .start_timer();

        let membership = sqlx::query_as::<_, LibraryMembership>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM library_memberships WHERE student_id = $1"
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();
        Ok(membership)
    }

    #[instrument(skip(self, dates), fields(student_id = %student_id))]
    async fn create_membership(
        &self,
        student_id: Uuid,
        dates: MembershipDates,
    ) -> Result<LibraryMembership, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_membership"])
            .start_timer();

        let membership = sqlx::query_as::<_, LibraryMembership>(&format!(
            r#"
            INSERT INTO library_memberships (id, student_id, issue_date, expiry_date)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(dates.issue_date)
        .bind(dates.expiry_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Student already has a library membership",
                "Student not found",
            )
        })?;

        timer.observe_duration();

        info!(membership_id = %membership.id, "Library membership created");

        Ok(membership)
    }

    #[instrument(skip(self, input), fields(student_id = %student_id))]
    async fn update_membership(
        &self,
        student_id: Uuid,
        input: &UpdateMembership,
    ) -> Result<Option<LibraryMembership>, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_membership"])
            .start_timer();

        let membership = sqlx::query_as::<_, LibraryMembership>(&format!(
            r#"
            UPDATE library_memberships
            SET issue_date = COALESCE($2, issue_date),
                expiry_date = COALESCE($3, expiry_date)
            WHERE student_id = $1
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(student_id)
        .bind(input.issue_date)
        .bind(input.expiry_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Conflict", "Student not found"))?;

        timer.observe_duration();

        if membership.is_some() {
            info!("Library membership updated");
        }

        Ok(membership)
    }

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn delete_membership(&self, student_id: Uuid) -> Result<bool, StoreError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_membership"])
            .start_timer();

        let result = sqlx::query("DELETE FROM library_memberships WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Library membership deleted");
        }
        Ok(deleted)
    }
}
