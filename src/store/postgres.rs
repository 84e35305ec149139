use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    NewTask, NewUser, Task, TaskChanges, TaskWithOwner, User, UserChanges, UserSummary,
    UserWithTasks,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, completed, user_id, created_at, updated_at";

/// Selects a task joined to its owner. `{source}` is the table (or CTE) holding the tasks.
fn task_with_owner_select(source: &str) -> String {
    format!(
        "SELECT t.id, t.title, t.description, t.completed, t.user_id, t.created_at, t.updated_at, \
                u.email AS owner_email, u.name AS owner_name \
         FROM {source} t JOIN users u ON u.id = t.user_id"
    )
}

/// Flat row produced by [`task_with_owner_select`].
#[derive(FromRow)]
struct TaskOwnerRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    completed: bool,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_email: String,
    owner_name: Option<String>,
}

impl From<TaskOwnerRow> for TaskWithOwner {
    fn from(row: TaskOwnerRow) -> Self {
        TaskWithOwner {
            user: UserSummary {
                id: row.user_id,
                email: row.owner_email,
                name: row.owner_name,
            },
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                completed: row.completed,
                user_id: row.user_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Classifies driver errors into the gateway's taxonomy.
///
/// `sqlx::Error::RowNotFound` becomes [`StoreError::NotFound`]; constraint violations
/// are recognised by their SQLSTATE code.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_error) => {
                let code = db_error.code().map(|code| code.into_owned());
                let constraint = db_error.constraint().unwrap_or_default().to_string();
                match code.as_deref() {
                    Some(UNIQUE_VIOLATION) => StoreError::UniqueViolation(constraint),
                    Some(FOREIGN_KEY_VIOLATION) => StoreError::ForeignKeyViolation(constraint),
                    _ => StoreError::Database(error),
                }
            }
            _ => StoreError::Database(error),
        }
    }
}

/// PostgreSQL-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool of at most `max_connections` connections to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    async fn tasks_by_owner(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Task>>, StoreError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ANY($1) ORDER BY created_at, id"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in tasks {
            grouped.entry(task.user_id).or_default().push(task);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self) -> Result<Vec<UserWithTasks>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = users.iter().map(|user| user.id).collect();
        let mut tasks = self.tasks_by_owner(&ids).await?;

        Ok(users
            .into_iter()
            .map(|user| UserWithTasks {
                tasks: tasks.remove(&user.id).unwrap_or_default(),
                user,
            })
            .collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserWithTasks>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) => {
                let tasks = self
                    .tasks_by_owner(&[user.id])
                    .await?
                    .remove(&user.id)
                    .unwrap_or_default();
                Ok(Some(UserWithTasks { user, tasks }))
            }
            None => Ok(None),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let (exists,) = sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 name = COALESCE($3, name), \
                 password_hash = COALESCE($4, password_hash), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.name)
            .bind(changes.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<TaskWithOwner>, StoreError> {
        let sql = format!("{} ORDER BY t.created_at, t.id", task_with_owner_select("tasks"));
        let rows = sqlx::query_as::<_, TaskOwnerRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TaskWithOwner::from).collect())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<TaskWithOwner>, StoreError> {
        let sql = format!("{} WHERE t.id = $1", task_with_owner_select("tasks"));
        let row = sqlx::query_as::<_, TaskOwnerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(TaskWithOwner::from))
    }

    async fn tasks_for_user(&self, user_id: Uuid) -> Result<Vec<TaskWithOwner>, StoreError> {
        let sql = format!(
            "{} WHERE t.user_id = $1 ORDER BY t.created_at, t.id",
            task_with_owner_select("tasks")
        );
        let rows = sqlx::query_as::<_, TaskOwnerRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TaskWithOwner::from).collect())
    }

    async fn create_task(&self, task: NewTask) -> Result<TaskWithOwner, StoreError> {
        let sql = format!(
            "WITH inserted AS ( \
                 INSERT INTO tasks (id, title, description, completed, user_id) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {TASK_COLUMNS} \
             ) {}",
            task_with_owner_select("inserted")
        );
        let row = sqlx::query_as::<_, TaskOwnerRow>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.completed)
            .bind(task.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<TaskWithOwner, StoreError> {
        let sql = format!(
            "WITH updated AS ( \
                 UPDATE tasks SET \
                     title = COALESCE($2, title), \
                     description = COALESCE($3, description), \
                     completed = COALESCE($4, completed), \
                     updated_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {TASK_COLUMNS} \
             ) {}",
            task_with_owner_select("updated")
        );
        let row = sqlx::query_as::<_, TaskOwnerRow>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.completed)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
