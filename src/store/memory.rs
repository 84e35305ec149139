use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    NewTask, NewUser, Task, TaskChanges, TaskWithOwner, User, UserChanges, UserSummary,
    UserWithTasks,
};

const EMAIL_CONSTRAINT: &str = "users_email_key";
const TASK_OWNER_CONSTRAINT: &str = "tasks_user_id_fkey";

struct StoredUser {
    user: User,
    password_hash: String,
}

impl StoredUser {
    fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.user.id,
            email: self.user.email.clone(),
            name: self.user.name.clone(),
        }
    }
}

#[derive(Default)]
struct State {
    users: Vec<StoredUser>,
    tasks: Vec<Task>,
}

impl State {
    fn user(&self, id: Uuid) -> Option<&StoredUser> {
        self.users.iter().find(|stored| stored.user.id == id)
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|stored| stored.user.email == email && Some(stored.user.id) != except)
    }

    fn tasks_of(&self, user_id: Uuid) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect()
    }

    fn with_owner(&self, task: &Task) -> Option<TaskWithOwner> {
        self.user(task.user_id).map(|owner| TaskWithOwner {
            task: task.clone(),
            user: owner.summary(),
        })
    }
}

/// In-process [`Store`] with the same constraints as the PostgreSQL schema: unique
/// emails, tasks must reference an existing user, and deleting a user deletes their tasks.
/// Rows are returned in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored password hash for a user. Not part of [`Store`]; the
    /// HTTP surface never exposes it.
    pub async fn password_hash(&self, id: Uuid) -> Option<String> {
        self.state
            .read()
            .await
            .user(id)
            .map(|stored| stored.password_hash.clone())
    }

    pub async fn task_count(&self) -> usize {
        self.state.read().await.tasks.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self) -> Result<Vec<UserWithTasks>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .map(|stored| UserWithTasks {
                user: stored.user.clone(),
                tasks: state.tasks_of(stored.user.id),
            })
            .collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserWithTasks>, StoreError> {
        let state = self.state.read().await;
        Ok(state.user(id).map(|stored| UserWithTasks {
            user: stored.user.clone(),
            tasks: state.tasks_of(id),
        }))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.email == email)
            .map(|stored| stored.user.clone()))
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.read().await.user(id).is_some())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(StoreError::UniqueViolation(EMAIL_CONSTRAINT.into()));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: now,
            updated_at: now,
        };
        state.users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(id)) {
                return Err(StoreError::UniqueViolation(EMAIL_CONSTRAINT.into()));
            }
        }

        let stored = state
            .users
            .iter_mut()
            .find(|stored| stored.user.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(email) = changes.email {
            stored.user.email = email;
        }
        if let Some(name) = changes.name {
            stored.user.name = Some(name);
        }
        if let Some(password_hash) = changes.password_hash {
            stored.password_hash = password_hash;
        }
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|stored| stored.user.id != id);
        if state.users.len() == before {
            return Err(StoreError::NotFound);
        }
        state.tasks.retain(|task| task.user_id != id);
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<TaskWithOwner>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter_map(|task| state.with_owner(task))
            .collect())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<TaskWithOwner>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|task| task.id == id)
            .and_then(|task| state.with_owner(task)))
    }

    async fn tasks_for_user(&self, user_id: Uuid) -> Result<Vec<TaskWithOwner>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .filter_map(|task| state.with_owner(task))
            .collect())
    }

    async fn create_task(&self, task: NewTask) -> Result<TaskWithOwner, StoreError> {
        let mut state = self.state.write().await;
        let owner = state
            .user(task.user_id)
            .map(StoredUser::summary)
            .ok_or_else(|| StoreError::ForeignKeyViolation(TASK_OWNER_CONSTRAINT.into()))?;

        let now = Utc::now();
        let created = Task {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            user_id: task.user_id,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(created.clone());
        Ok(TaskWithOwner {
            task: created,
            user: owner,
        })
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<TaskWithOwner, StoreError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = Some(description);
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        let task = task.clone();
        state.with_owner(&task).ok_or(StoreError::NotFound)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
