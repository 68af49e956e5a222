use poise::serenity_prelude::Context;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};

#[async_trait::async_trait]
pub trait Task<C: Sync = Context>: Send + Sync {
    fn name(&self) -> &str;
    fn schedule(&self) -> Option<Duration>;
    async fn execute(&mut self, ctx: &C) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Runs `task` right away and then once per `schedule()` until it returns
/// `None`. A failed run is logged and the next one still happens.
pub async fn run_task<C: Send + Sync>(mut task: Box<dyn Task<C>>, ctx: C) {
    while let Some(interval) = task.schedule() {
        if let Err(e) = task.execute(&ctx).await {
            error!("Task {} failed: {}", task.name(), e);
        }
        tokio::time::sleep(interval).await;
    }
}

pub struct TaskManager {
    tasks: Mutex<Vec<Box<dyn Task>>>,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager").finish_non_exhaustive()
    }
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub async fn add_task(&self, task: impl Task + 'static) {
        self.tasks.lock().await.push(Box::new(task));
    }

    pub async fn start_tasks(&self, ctx: Context) {
        let mut tasks = self.tasks.lock().await;

        for task in tasks.drain(..) {
            info!("Starting task {}", task.name());
            tokio::spawn(run_task(task, ctx.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlakyTask {
        runs: usize,
        limit: usize,
    }

    #[async_trait::async_trait]
    impl Task<Arc<AtomicUsize>> for FlakyTask {
        fn name(&self) -> &str {
            "Flaky"
        }

        fn schedule(&self) -> Option<Duration> {
            (self.runs < self.limit).then(|| Duration::from_millis(1))
        }

        async fn execute(
            &mut self,
            ctx: &Arc<AtomicUsize>,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.runs += 1;
            ctx.fetch_add(1, Ordering::SeqCst);
            if self.runs == 1 {
                return Err("first run fails".into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_run_does_not_stop_the_loop() {
        let executions = Arc::new(AtomicUsize::new(0));
        let task = FlakyTask { runs: 0, limit: 3 };

        run_task(Box::new(task), executions.clone()).await;

        assert_eq!(executions.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unscheduled_task_never_runs() {
        let executions = Arc::new(AtomicUsize::new(0));
        let task = FlakyTask { runs: 0, limit: 0 };

        run_task(Box::new(task), executions.clone()).await;

        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }
}
