//! Owner-scoped CRUD over the task collection.
//!
//! A task owned by another user is indistinguishable from a missing one: every lookup
//! by id reports `NotFound` in both cases.

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery};
use crate::store::JsonFileStore;

#[derive(Clone)]
pub struct TaskService {
    tasks: JsonFileStore<Task>,
}

impl TaskService {
    pub fn new(tasks: JsonFileStore<Task>) -> Self {
        Self { tasks }
    }

    /// The user's tasks matching `query`, newest first.
    pub async fn list(&self, user_id: i64, query: &TaskQuery) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .load()
            .await
            .into_iter()
            .filter(|task| task.user_id == user_id && task.matches(query))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    pub async fn get(&self, user_id: i64, id: Uuid) -> Result<Task, AppError> {
        self.tasks
            .load()
            .await
            .into_iter()
            .find(|task| task.id == id && task.user_id == user_id)
            .ok_or_else(not_found)
    }

    pub async fn create(&self, user_id: i64, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        let task = Task::new(input, user_id);
        let created = task.clone();
        self.tasks
            .update(move |tasks| {
                tasks.push(task);
                Ok(())
            })
            .await?;
        log::debug!("User {} created task {}", user_id, created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: Uuid,
        input: TaskInput,
    ) -> Result<Task, AppError> {
        input.validate()?;
        self.tasks
            .update(move |tasks| {
                let task = tasks
                    .iter_mut()
                    .find(|task| task.id == id && task.user_id == user_id)
                    .ok_or_else(not_found)?;
                task.apply(input);
                Ok(task.clone())
            })
            .await
    }

    pub async fn delete(&self, user_id: i64, id: Uuid) -> Result<(), AppError> {
        self.tasks
            .update(move |tasks| {
                let position = tasks
                    .iter()
                    .position(|task| task.id == id && task.user_id == user_id)
                    .ok_or_else(not_found)?;
                tasks.remove(position);
                Ok(())
            })
            .await?;
        log::debug!("User {} deleted task {}", user_id, id);
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}
