use std::thread;

use flume::Sender;

/// A task that can be sent to a worker.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction over a threadpool that can spawn tasks.
pub trait ThreadPool: Send + Sync + 'static {
    fn spawn(&self, task: Task);
}

/// A basic thread pool.
pub struct BasicThreadPool {
    tasks: Sender<Task>,
}

impl BasicThreadPool {
    pub fn new(num_threads: usize) -> Self {
        let (sender, receiver) = flume::unbounded::<Task>();

        for i in 0..num_threads.max(1) {
            let receiver = receiver.clone();
            let spawned = thread::Builder::new()
                .name(format!("nameplate-worker-{}", i))
                .spawn(move || {
                    for task in receiver {
                        task();
                    }
                });
            if let Err(e) = spawned {
                log::error!("Failed to spawn worker thread: {}", e);
            }
        }

        Self { tasks: sender }
    }
}

impl ThreadPool for BasicThreadPool {
    fn spawn(&self, task: Task) {
        if self.tasks.send(task).is_err() {
            log::error!("Thread pool has shut down; dropping task");
        }
    }
}

/// Runs every task immediately on the calling thread.
///
/// Useful where there is no UI thread to keep responsive, like a CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlinePool;

impl ThreadPool for InlinePool {
    fn spawn(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn tasks_run_on_workers() {
        let pool = BasicThreadPool::new(2);
        let (tx, rx) = flume::unbounded();
        for i in 0..4 {
            let tx = tx.clone();
            pool.spawn(Box::new(move || {
                let name = thread::current().name().map(str::to_owned);
                tx.send((i, name)).unwrap();
            }));
        }

        let mut results: Vec<_> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        results.sort_by_key(|(i, _)| *i);
        assert_eq!(results.len(), 4);
        for (_, name) in results {
            assert!(name.unwrap().starts_with("nameplate-worker-"));
        }
    }

    #[test]
    fn inline_pool_runs_immediately() {
        let (tx, rx) = flume::unbounded();
        InlinePool.spawn(Box::new(move || tx.send(1).unwrap()));
        assert_eq!(rx.try_recv(), Ok(1));
    }
}
