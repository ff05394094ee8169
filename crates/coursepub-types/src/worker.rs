//! Worker pool for blocking work (password hashing, package inspection).
//!
//! Two priority levels: interactive jobs (`run_immed`) and everything else (`run`).

use flume::{Receiver, Sender};
use futures::channel::oneshot;
use std::{future::Future, sync::Arc, thread};

use crate::prelude::*;

type Job = Box<dyn FnOnce() + Send>;
type JobQueue = Arc<Receiver<Job>>;

#[derive(Clone, Copy, Debug)]
pub enum Priority {
	High,
	Normal,
}

#[derive(Debug)]
pub struct WorkerPool {
	high: Sender<Job>,
	normal: Sender<Job>,
}

impl WorkerPool {
	/// Starts `n_high` threads serving only high priority jobs and `n_normal`
	/// threads serving both queues (high first).
	pub fn new(n_high: usize, n_normal: usize) -> Self {
		let (high, rx_high) = flume::unbounded();
		let (normal, rx_normal) = flume::unbounded();

		let rx_high: JobQueue = Arc::new(rx_high);
		let rx_normal: JobQueue = Arc::new(rx_normal);

		for _ in 0..n_high {
			let rx_high = Arc::clone(&rx_high);
			thread::spawn(move || worker_loop(&[rx_high]));
		}

		for _ in 0..n_normal {
			let rx_high = Arc::clone(&rx_high);
			let rx_normal = Arc::clone(&rx_normal);
			thread::spawn(move || worker_loop(&[rx_high, rx_normal]));
		}

		Self { high, normal }
	}

	/// Submit a closure, returns a future resolving to its result
	pub fn spawn<F, T>(&self, priority: Priority, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let (res_tx, res_rx) = oneshot::channel();

		let job: Job = Box::new(move || {
			let result = f();
			let _ignore = res_tx.send(result);
		});

		let queue = match priority {
			Priority::High => &self.high,
			Priority::Normal => &self.normal,
		};
		if queue.send(job).is_err() {
			error!("Failed to send job to {:?} priority worker queue", priority);
		}

		async move {
			res_rx.await.map_err(|_| {
				error!("Worker dropped result channel (task may have panicked)");
				Error::Internal("worker task failed".into())
			})
		}
	}

	pub fn run<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		self.spawn(Priority::Normal, f)
	}

	pub fn run_immed<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		self.spawn(Priority::High, f)
	}

	/// Like `run`, but flattens `ClResult<ClResult<T>>` into `ClResult<T>`.
	pub fn try_run<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> ClResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run(f);
		async move { fut.await? }
	}

	/// Like `run_immed`, but flattens `ClResult<ClResult<T>>` into `ClResult<T>`.
	pub fn try_run_immed<F, T>(&self, f: F) -> impl Future<Output = ClResult<T>>
	where
		F: FnOnce() -> ClResult<T> + Send + 'static,
		T: Send + 'static,
	{
		let fut = self.run_immed(f);
		async move { fut.await? }
	}
}

fn run_job(job: Job) {
	if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
		error!("Worker thread caught panic: {:?}", e);
	}
}

fn worker_loop(queues: &[JobQueue]) {
	loop {
		// Higher priority queues first (non-blocking)
		if let Some(job) = queues.iter().find_map(|rx| rx.try_recv().ok()) {
			run_job(job);
			continue;
		}

		let mut selector = flume::Selector::new();
		for rx in queues {
			selector = selector.recv(rx, |res| res);
		}

		match selector.wait() {
			Ok(job) => run_job(job),
			// All senders dropped: the pool is gone
			Err(flume::RecvError::Disconnected) => break,
		}
	}
}


// vim: ts=4
