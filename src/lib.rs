//! Sgp30 air quality sensor driver
//!
//! The sensor must receive a `MeasureAirQuality` command every second after
//! initialisation for its baseline compensation to work, so constructing an
//! [`Sgp30`] starts a background task that keeps measuring for the life of
//! the process. The latest result is available through [`Sgp30::co2`] and
//! [`Sgp30::tvoc`] without touching the bus.
//!
//! ```no_run
//! use linux_embedded_hal::{Delay, I2cdev};
//! use sensor_sgp30::{Sgp30, DEFAULT_ADDRESS};
//!
//! let i2c = I2cdev::new("/dev/i2c-1").unwrap();
//!
//! // Blocks for the 20s sensor warm-up
//! let sensor = Sgp30::new(i2c, Delay, DEFAULT_ADDRESS).unwrap();
//!
//! println!("CO2: {}, TVOC: {}", sensor.co2(), sensor.tvoc());
//! ```
//!
//! Copyright 2019 Ryan Kurte

use core::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

extern crate embedded_hal;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;

#[macro_use]
extern crate log;

pub mod base;
use base::{Base, Bus};

pub mod device;
pub use device::*;

pub mod measurement;
pub use measurement::{AtomicMeasurement, Co2, Measurement, Tvoc, MEASUREMENT_LEN};

pub mod task;
use task::{LogObserver, Observer, PeriodicTask, Scheduler, ThreadScheduler};

/// Sgp30 error object
#[derive(Debug)]
pub enum Error<ConnErr> {
    /// Underlying I2C connection error
    Conn(ConnErr),
    /// Response buffer does not match the command response length
    Length{ expected: usize, actual: usize },
    /// Address not supported by the device
    Address(u8),
    /// CRC mismatch (calculated, received)
    Crc(u8, u8),
    /// Failed to start the measurement task
    Spawn(std::io::ErrorKind),
}

impl <ConnErr: Debug> fmt::Display for Error<ConnErr> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Conn(e) => write!(f, "I2C error: {:?}", e),
            Error::Length{ expected, actual } => write!(f, "response length mismatch (expected {}, got {})", expected, actual),
            Error::Address(a) => write!(f, "address 0x{:02x} not supported by device", a),
            Error::Crc(c, r) => write!(f, "CRC mismatch (calculated 0x{:02x}, received 0x{:02x})", c, r),
            Error::Spawn(k) => write!(f, "failed to start measurement task: {:?}", k),
        }
    }
}

impl <ConnErr: Debug> std::error::Error for Error<ConnErr> {}

/// Sgp30 driver configuration
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Config {
    /// Validate response CRCs, measurements with a bad CRC are discarded
    pub check_crc: bool,
}

/// Sgp30 sensor object
/// Holds the latest measurement, which is updated by the measurement task
pub struct Sgp30<Task = PeriodicTask> {
    state: Arc<AtomicMeasurement>,
    _task: Task,
}

/// One measure / decode / store cycle, owned by the measurement task
struct Cycle<Conn, Delay, Obs> {
    bus: Bus<Conn, Delay>,
    state: Arc<AtomicMeasurement>,
    observer: Obs,
    check_crc: bool,
}

impl <Conn, Delay, Obs, Err> Cycle<Conn, Delay, Obs> where
    Conn: i2c::Read<Error=Err> + i2c::Write<Error=Err>,
    Delay: DelayMs<u32>,
    Obs: Observer<Err>,
    Err: Debug,
{
    fn measure(&mut self) -> Result<Measurement, Error<Err>> {
        let mut buff = [0u8; MEASUREMENT_LEN];

        self.bus.read_command(Command::MeasureAirQuality, &mut buff)?;

        let m = match self.check_crc {
            true => Measurement::decode_checked::<Err>(&buff)?,
            false => Measurement::decode(&buff),
        };

        self.state.store(m);

        Ok(m)
    }

    fn run(&mut self) {
        let outcome = self.measure();
        self.observer.observe(outcome);
    }
}

impl Sgp30 {
    /// Create a new Sgp30 sensor instance, measuring on a background thread and logging failures
    ///
    /// This blocks for the 20s warm-up required after initialisation
    pub fn new<Conn, Delay, Err>(conn: Conn, delay: Delay, address: u8) -> Result<Self, Error<Err>> where
        Conn: i2c::Read<Error=Err> + i2c::Write<Error=Err> + Send + 'static,
        Delay: DelayMs<u32> + Send + 'static,
        Err: Debug,
    {
        Self::new_with(conn, delay, address, Config::default(), ThreadScheduler, LogObserver)
    }
}

impl <Task> Sgp30<Task> {
    /// Create a new Sgp30 sensor instance with the provided configuration, scheduler, and cycle observer
    pub fn new_with<Conn, Delay, Err, Sched, Obs>(
        conn: Conn, delay: Delay, address: u8, config: Config, scheduler: Sched, observer: Obs,
    ) -> Result<Self, Error<Err>> where
        Conn: i2c::Read<Error=Err> + i2c::Write<Error=Err> + Send + 'static,
        Delay: DelayMs<u32> + Send + 'static,
        Sched: Scheduler<Task=Task>,
        Obs: Observer<Err> + Send + 'static,
        Err: Debug,
    {
        if address != DEFAULT_ADDRESS {
            return Err(Error::Address(address));
        }

        let state = Arc::new(AtomicMeasurement::default());
        let mut bus = Bus::new(conn, delay);

        // Start air quality measurement
        debug!("Initialising air quality measurement");
        bus.write_command(Command::InitAirQuality)?;

        debug!("Waiting {}ms for sensor warm-up", WARM_UP_MS);
        bus.delay_ms(WARM_UP_MS);

        let mut cycle = Cycle{ bus, state: state.clone(), observer, check_crc: config.check_crc };

        // First measurement is best-effort, the task retries every interval
        cycle.run();

        debug!("Starting measurement task");
        let task = scheduler.every(Duration::from_millis(MEASURE_INTERVAL_MS), move || cycle.run())
            .map_err(|e| Error::Spawn(e.kind()) )?;

        Ok(Sgp30{ state, _task: task })
    }

    /// Latest CO2eq measurement
    pub fn co2(&self) -> Co2 {
        self.state.load().co2
    }

    /// Latest TVOC measurement
    pub fn tvoc(&self) -> Tvoc {
        self.state.load().tvoc
    }

    /// Latest measurement, both values from the same cycle
    pub fn measurement(&self) -> Measurement {
        self.state.load()
    }
}
