use std::io;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle, ThreadId};

use log::{debug, error};

use crate::models::error::QueueError;

/// A unit of work run on the worker with exclusive access to its state.
pub type Job<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

enum Message<T> {
    Run(Job<T>),
    Shutdown,
}

/// Single worker thread that owns a piece of state outright.
///
/// Every access to the state is a job sent over a channel, so jobs run one at
/// a time in submission order and nothing else ever holds a reference to the
/// state. Dropping the queue drains the jobs already submitted, then joins.
pub struct SessionQueue<T: 'static> {
    sender: Sender<Message<T>>,
    worker: ThreadId,
    handle: Option<JoinHandle<()>>,
}

/// Cloneable submit-only handle, given to callbacks that must re-enter the
/// worker (hardware completions, sensor notifications).
pub struct QueueHandle<T: 'static> {
    sender: Sender<Message<T>>,
    worker: ThreadId,
}

impl<T: 'static> Clone for QueueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            worker: self.worker,
        }
    }
}

impl<T: 'static> SessionQueue<T> {
    /// Spawn the worker. `init` runs on the worker thread and builds the
    /// state; it receives a handle so the state can re-enter itself later.
    pub fn spawn<F>(name: &str, init: F) -> io::Result<Self>
    where
        F: FnOnce(QueueHandle<T>) -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<Message<T>>();
        let worker_sender = sender.clone();
        let thread_name = name.to_string();

        let handle = thread::Builder::new().name(thread_name.clone()).spawn(move || {
            let own = QueueHandle {
                sender: worker_sender,
                worker: thread::current().id(),
            };
            let mut state = init(own);
            debug!("{} worker started", thread_name);

            while let Ok(message) = receiver.recv() {
                match message {
                    Message::Run(job) => job(&mut state),
                    Message::Shutdown => break,
                }
            }
            debug!("{} worker stopped", thread_name);
        })?;

        Ok(Self {
            sender,
            worker: handle.thread().id(),
            handle: Some(handle),
        })
    }

    pub fn handle(&self) -> QueueHandle<T> {
        QueueHandle {
            sender: self.sender.clone(),
            worker: self.worker,
        }
    }

    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker
    }

    /// Run `f` on the worker and wait for its result.
    pub fn perform<R, F>(&self, f: F) -> Result<R, QueueError>
    where
        R: Send + 'static,
        F: FnOnce(&mut T) -> R + Send + 'static,
    {
        perform(&self.sender, self.worker, f)
    }

    /// Queue `f` on the worker without waiting.
    pub fn dispatch<F>(&self, f: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        dispatch(&self.sender, f)
    }
}

impl<T: 'static> QueueHandle<T> {
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker
    }

    pub fn perform<R, F>(&self, f: F) -> Result<R, QueueError>
    where
        R: Send + 'static,
        F: FnOnce(&mut T) -> R + Send + 'static,
    {
        perform(&self.sender, self.worker, f)
    }

    pub fn dispatch<F>(&self, f: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        dispatch(&self.sender, f)
    }
}

fn perform<T, R, F>(sender: &Sender<Message<T>>, worker: ThreadId, f: F) -> Result<R, QueueError>
where
    T: 'static,
    R: Send + 'static,
    F: FnOnce(&mut T) -> R + Send + 'static,
{
    // Waiting on our own queue would never return.
    if thread::current().id() == worker {
        return Err(QueueError::Reentrant);
    }
    let (reply, result) = mpsc::sync_channel(1);
    dispatch(sender, move |state: &mut T| {
        let _ = reply.send(f(state));
    })?;
    result.recv().map_err(|_| QueueError::Closed)
}

fn dispatch<T, F>(sender: &Sender<Message<T>>, f: F) -> Result<(), QueueError>
where
    T: 'static,
    F: FnOnce(&mut T) + Send + 'static,
{
    sender
        .send(Message::Run(Box::new(f)))
        .map_err(|_| QueueError::Closed)
}

impl<T: 'static> Drop for SessionQueue<T> {
    fn drop(&mut self) {
        let _ = self.sender.send(Message::Shutdown);
        if let Some(handle) = self.handle.take() {
            if self.is_worker_thread() {
                // Dropped from inside a job; the loop exits on the shutdown
                // message once that job returns.
                return;
            }
            if handle.join().is_err() {
                error!("session worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn jobs_run_in_submission_order() {
        let queue = SessionQueue::spawn("test-queue", |_| Vec::<i32>::new()).unwrap();
        for i in 0..10 {
            queue.dispatch(move |log: &mut Vec<i32>| log.push(i)).unwrap();
        }
        let log = queue.perform(|log: &mut Vec<i32>| log.clone()).unwrap();
        assert_eq!(log, (0..10).collect::<Vec<_>>());
    }

    struct Counter {
        value: u32,
        handle: QueueHandle<Counter>,
    }

    fn counter_queue() -> SessionQueue<Counter> {
        SessionQueue::spawn("test-queue", |handle| Counter { value: 0, handle }).unwrap()
    }

    #[test]
    fn perform_from_worker_is_rejected() {
        let queue = counter_queue();
        let nested = queue
            .perform(|counter: &mut Counter| counter.handle.perform(|c: &mut Counter| c.value))
            .unwrap();
        assert_eq!(nested, Err(QueueError::Reentrant));
    }

    #[test]
    fn worker_reenters_through_handle() {
        let queue = counter_queue();
        queue
            .perform(|counter: &mut Counter| {
                counter.value += 1;
                counter
                    .handle
                    .dispatch(|c: &mut Counter| c.value += 10)
                    .unwrap();
            })
            .unwrap();
        assert_eq!(queue.perform(|c: &mut Counter| c.value).unwrap(), 11);
    }

    #[test]
    fn drop_drains_pending_jobs() {
        let counter = Arc::new(parking_lot::Mutex::new(0));
        {
            let queue = SessionQueue::spawn("test-queue", |_| ()).unwrap();
            for _ in 0..5 {
                let counter = Arc::clone(&counter);
                queue
                    .dispatch(move |_| {
                        std::thread::sleep(Duration::from_millis(1));
                        *counter.lock() += 1;
                    })
                    .unwrap();
            }
        }
        assert_eq!(*counter.lock(), 5);
    }

    #[test]
    fn handle_reports_closed_after_drop() {
        let queue = SessionQueue::spawn("test-queue", |_| 0u8).unwrap();
        let handle = queue.handle();
        drop(queue);
        assert_eq!(handle.perform(|n| *n), Err(QueueError::Closed));
    }
}
