use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::runtime::Handle;

use crate::tasks::{
    config::QueueConfig,
    error::QueueError,
    process::control::{ProcessController, SystemProcessController},
    tokio::queue::TaskQueue,
};

/// Directory of named task queues.
///
/// The registry owns every queue it creates; [`get_queue`](Self::get_queue)
/// hands out a shared handle to the live queue. All queues share one
/// [`QueueConfig`], one runtime and one process controller.
///
/// # Examples
///
/// ```rust
/// use stq::tasks::{config::QueueConfig, registry::QueueRegistry};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = QueueRegistry::init(QueueConfig::default())?;
///     registry.create_queue("builds")?;
///     registry.rename_queue("builds", "nightly")?;
///
///     assert_eq!(registry.list_queues()?, vec!["nightly".to_string()]);
///     registry.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct QueueRegistry {
    queues: Mutex<HashMap<String, Arc<TaskQueue>>>,
    config: QueueConfig,
    runtime: Handle,
    controller: Arc<dyn ProcessController>,
}

impl QueueRegistry {
    /// Creates an empty registry bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidState`] when called outside a tokio
    /// runtime, or [`QueueError::InvalidConfiguration`] for an invalid config.
    pub fn init(config: QueueConfig) -> Result<Self, QueueError> {
        let runtime = Handle::try_current().map_err(|e| {
            QueueError::InvalidState(format!("No tokio runtime available: {}", e))
        })?;
        Self::with_runtime(config, runtime)
    }

    /// Creates an empty registry whose workers run on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidConfiguration`] for an invalid config.
    pub fn with_runtime(config: QueueConfig, runtime: Handle) -> Result<Self, QueueError> {
        config.validate()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(?config, "Queue registry initialized");

        Ok(Self {
            queues: Mutex::new(HashMap::new()),
            config,
            runtime,
            controller: Arc::new(SystemProcessController::new()),
        })
    }

    /// Replaces the process controller used by queues created afterwards.
    pub fn with_controller(mut self, controller: Arc<dyn ProcessController>) -> Self {
        self.controller = controller;
        self
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn queues(&self) -> MutexGuard<'_, HashMap<String, Arc<TaskQueue>>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # Errors
    ///
    /// Returns [`QueueError::AlreadyExists`] if `name` is taken.
    pub fn create_queue(&self, name: &str) -> Result<(), QueueError> {
        let mut queues = self.queues();
        if queues.contains_key(name) {
            return Err(QueueError::AlreadyExists(format!(
                "Queue '{}' already exists",
                name
            )));
        }
        let queue = TaskQueue::new(
            name,
            self.config.clone(),
            self.runtime.clone(),
            Arc::clone(&self.controller),
        )?;
        queues.insert(name.to_string(), Arc::new(queue));

        #[cfg(feature = "tracing")]
        tracing::info!(queue = name, "Queue created");
        Ok(())
    }

    /// Names of all queues, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if the registry holds no queue.
    pub fn list_queues(&self) -> Result<Vec<String>, QueueError> {
        let mut names: Vec<String> = self.queues().keys().cloned().collect();
        if names.is_empty() {
            return Err(QueueError::Empty("No queues registered".to_string()));
        }
        names.sort_unstable();
        Ok(names)
    }

    /// Forces the queue to stop and removes it.
    ///
    /// Pending tasks are discarded and the running child tree, if any, is
    /// killed. This returns before the worker loop has finished its cleanup;
    /// a handle obtained earlier can await
    /// [`wait_until_stopped`](TaskQueue::wait_until_stopped).
    ///
    /// The kill is issued while the registry lock is held, so a slow kill
    /// delays every other registry operation.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if `name` is unknown.
    pub fn delete_queue(&self, name: &str) -> Result<(), QueueError> {
        let mut queues = self.queues();
        let Some(queue) = queues.remove(name) else {
            return Err(QueueError::NotFound(format!("Queue '{}' not found", name)));
        };
        queue.halt();

        #[cfg(feature = "tracing")]
        tracing::info!(queue = name, "Queue deleted");
        Ok(())
    }

    /// Moves a queue to a new name.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::AlreadyExists`] if `new_name` is taken (checked
    /// first) or [`QueueError::NotFound`] if `old_name` is unknown. Nothing
    /// changes on error.
    pub fn rename_queue(&self, old_name: &str, new_name: &str) -> Result<(), QueueError> {
        let mut queues = self.queues();
        if queues.contains_key(new_name) {
            return Err(QueueError::AlreadyExists(format!(
                "Queue '{}' already exists",
                new_name
            )));
        }
        let Some(queue) = queues.remove(old_name) else {
            return Err(QueueError::NotFound(format!(
                "Queue '{}' not found",
                old_name
            )));
        };
        queue.set_name(new_name);
        queues.insert(new_name.to_string(), queue);

        #[cfg(feature = "tracing")]
        tracing::info!(from = old_name, to = new_name, "Queue renamed");
        Ok(())
    }

    /// Shared handle to the live queue named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if `name` is unknown.
    pub fn get_queue(&self, name: &str) -> Result<Arc<TaskQueue>, QueueError> {
        self.queues()
            .get(name)
            .cloned()
            .ok_or_else(|| QueueError::NotFound(format!("Queue '{}' not found", name)))
    }

    /// Stops and discards every queue, then waits for their workers to exit.
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<TaskQueue>> = {
            let mut queues = self.queues();
            queues.drain().map(|(_, queue)| queue).collect()
        };
        for queue in &drained {
            queue.halt();
        }
        for queue in &drained {
            queue.wait_until_stopped().await;
        }

        #[cfg(feature = "tracing")]
        tracing::info!(count = drained.len(), "Queue registry shut down");
    }
}

impl Drop for QueueRegistry {
    fn drop(&mut self) {
        // Workers outlive the registry otherwise; no waiting here.
        let queues = self.queues.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, queue) in queues.drain() {
            queue.halt();
        }
    }
}
