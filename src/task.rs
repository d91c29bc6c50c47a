//! Periodic measurement scheduling and cycle observation
//!
//! Copyright 2019 Ryan Kurte

use std::io;
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};

use core::fmt::Debug;

use crate::Error;
use crate::measurement::Measurement;

/// Name given to the measurement thread
pub const TASK_NAME: &str = "sgp30-measure";

/// Scheduler runs a task at a fixed period, the first run occurring one period after scheduling
pub trait Scheduler {
    /// Handle retained by the sensor for the life of the task
    type Task;

    fn every<F>(self, period: Duration, task: F) -> io::Result<Self::Task>
    where
        F: FnMut() + Send + 'static;
}

/// Scheduler running each task on a dedicated thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

/// Handle to a task started by [`ThreadScheduler`]
/// The task cannot be stopped, dropping the handle detaches the thread
#[derive(Debug)]
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Thread running the task
    pub fn thread(&self) -> &Thread {
        self.handle.thread()
    }
}

impl Scheduler for ThreadScheduler {
    type Task = PeriodicTask;

    fn every<F>(self, period: Duration, mut task: F) -> io::Result<PeriodicTask>
    where
        F: FnMut() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(TASK_NAME.to_string())
            .spawn(move || {
                let mut next = Instant::now() + period;

                loop {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }

                    task();

                    // Skip missed ticks rather than bursting to catch up
                    next += period;
                    let now = Instant::now();
                    if next < now {
                        next = now;
                    }
                }
            })?;

        Ok(PeriodicTask{ handle })
    }
}

/// Observer receives the outcome of every measurement cycle
pub trait Observer<Err> {
    fn observe(&mut self, outcome: Result<Measurement, Error<Err>>);
}

/// Observer logging each cycle outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl <Err> Observer<Err> for LogObserver where
    Err: Debug,
{
    fn observe(&mut self, outcome: Result<Measurement, Error<Err>>) {
        match outcome {
            Ok(m) => debug!("CO2: {}, TVOC: {}", m.co2, m.tvoc),
            Err(e) => warn!("Error measuring air quality: {:?}", e),
        }
    }
}
