//! PostgreSQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_models::{
    AttendanceQuery, AttendanceRecord, Class, ClassId, LeaveApplication, LeaveId, LeaveStatus,
    NewAttendance, NewLeave, NewUser, Role, User, UserChanges, UserId,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use crate::error::StoreResult;
use crate::store::Store;

/// Serializes first-admin bootstrap across connections.
const BOOTSTRAP_LOCK_KEY: i64 = 0x726f_6c6c_6361_6c6c;

/// Opens a connection pool for `database_url`.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        Ok(Self::new(init_db_pool(database_url).await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

const INSERT_USER: &str = r#"
    INSERT INTO users (id, name, email, unique_id, role, class_id, password_hash)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

fn bind_new_user<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, User, sqlx::postgres::PgArguments>,
    user: NewUser,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, User, sqlx::postgres::PgArguments> {
    query
        .bind(UserId::new())
        .bind(user.name)
        .bind(user.email)
        .bind(user.unique_id)
        .bind(user.role)
        .bind(user.class_id)
        .bind(user.password_hash)
}

#[async_trait]
impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, user), fields(unique_id = %user.unique_id))]
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let user = bind_new_user(sqlx::query_as::<_, User>(INSERT_USER), user)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, user))]
    async fn create_first_admin(&self, user: NewUser) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(BOOTSTRAP_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')")
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            return Ok(None);
        }

        let created = bind_new_user(sqlx::query_as::<_, User>(INSERT_USER), user)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(created))
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_unique_id(&self, unique_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE unique_id = $1")
            .bind(unique_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_students_in_class(&self, class_id: ClassId) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE class_id = $1 AND role = $2 ORDER BY created_at, id",
        )
        .bind(class_id)
        .bind(Role::Student)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    #[instrument(skip(self, changes))]
    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<Option<User>> {
        let set_class = changes.class_id.is_some();
        let class_id = changes.class_id.flatten();

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                class_id = CASE WHEN $5 THEN $6 ELSE class_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role)
        .bind(set_class)
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn admin_exists(&self) -> StoreResult<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = $1)")
            .bind(Role::Admin)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn set_reset_code(
        &self,
        id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET reset_code = $2, reset_code_expires_at = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_password(&self, id: UserId, password_hash: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_code = NULL,
                reset_code_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_class(&self, name: &str, section: &str) -> StoreResult<Class> {
        let class = sqlx::query_as::<_, Class>(
            "INSERT INTO classes (id, name, section) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(ClassId::new())
        .bind(name)
        .bind(section)
        .fetch_one(&self.pool)
        .await?;
        Ok(class)
    }

    async fn find_class(&self, id: ClassId) -> StoreResult<Option<Class>> {
        let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(class)
    }

    async fn list_classes(&self) -> StoreResult<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>("SELECT * FROM classes ORDER BY name, section")
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    async fn delete_class(&self, id: ClassId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, record), fields(student_id = %record.student_id, date = %record.date))]
    async fn insert_attendance(&self, record: NewAttendance) -> StoreResult<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance (id, student_id, date, status, marked_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(rollcall_models::AttendanceId::new())
        .bind(record.student_id)
        .bind(record.date)
        .bind(record.status)
        .bind(record.marked_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance
            WHERE ($1::uuid[] IS NULL OR student_id = ANY($1))
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(query.student_ids.clone())
        .bind(query.start_date)
        .bind(query.end_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    #[instrument(skip(self, leave), fields(student_id = %leave.student_id))]
    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<LeaveApplication> {
        let leave = sqlx::query_as::<_, LeaveApplication>(
            r#"
            INSERT INTO leave_applications (id, student_id, reason, from_date, to_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(LeaveId::new())
        .bind(leave.student_id)
        .bind(leave.reason)
        .bind(leave.from_date)
        .bind(leave.to_date)
        .bind(LeaveStatus::Pending)
        .fetch_one(&self.pool)
        .await?;
        Ok(leave)
    }

    async fn find_leave(&self, id: LeaveId) -> StoreResult<Option<LeaveApplication>> {
        let leave =
            sqlx::query_as::<_, LeaveApplication>("SELECT * FROM leave_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(leave)
    }

    async fn list_leaves(&self, student_id: Option<UserId>) -> StoreResult<Vec<LeaveApplication>> {
        let leaves = sqlx::query_as::<_, LeaveApplication>(
            r#"
            SELECT * FROM leave_applications
            WHERE ($1::uuid IS NULL OR student_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(leaves)
    }

    #[instrument(skip(self))]
    async fn review_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        reviewer: UserId,
    ) -> StoreResult<Option<LeaveApplication>> {
        let leave = sqlx::query_as::<_, LeaveApplication>(
            "UPDATE leave_applications SET status = $2, reviewed_by = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(reviewer)
        .fetch_optional(&self.pool)
        .await?;
        Ok(leave)
    }

    #[instrument(skip(self))]
    async fn delete_pending_leave(&self, id: LeaveId, student_id: UserId) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM leave_applications WHERE id = $1 AND student_id = $2 AND status = $3",
        )
        .bind(id)
        .bind(student_id)
        .bind(LeaveStatus::Pending)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
