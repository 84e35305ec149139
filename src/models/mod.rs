pub mod task;
pub mod user;

pub use task::{
    CreateTaskInput, NewTask, Task, TaskChanges, TaskWithOwner, UpdateTaskInput, UserSummary,
};
pub use user::{CreateUserInput, NewUser, UpdateUserInput, User, UserChanges, UserWithTasks};
