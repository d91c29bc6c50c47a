//! Sgp30 command-line utility
//!
//! Copyright 2019 Ryan Kurte

extern crate embedded_hal;
extern crate linux_embedded_hal;
use linux_embedded_hal::{Delay, I2cdev};

extern crate structopt;
use structopt::StructOpt;

extern crate humantime;
use humantime::{Duration as HumanDuration};

#[macro_use] extern crate log;
extern crate simplelog;
use simplelog::{TermLogger, LevelFilter};

extern crate sensor_sgp30;
use sensor_sgp30::{Sgp30, DEFAULT_ADDRESS};

#[derive(StructOpt)]
#[structopt(name = "sgp30-util")]
/// A Command Line Interface (CLI) for interacting with a local Sgp30 air quality sensor over I2C
pub struct Options {

    /// Specify the i2c interface to use to connect to the sgp30 device
    #[structopt(short="d", long = "i2c", default_value = "/dev/i2c-1", env = "SGP30_I2C")]
    i2c: String,

    /// Specify the sgp30 I2C address (decimal or 0x prefixed hex)
    #[structopt(short="a", long = "address", default_value = "0x58", parse(try_from_str = "parse_address"))]
    address: u8,

    /// Specify period for reporting measurements
    #[structopt(short = "p", long = "report-period", default_value="10s")]
    pub period: HumanDuration,

    /// Enable verbose logging
    #[structopt(long = "log-level", default_value = "info")]
    level: LevelFilter,
}

fn parse_address(s: &str) -> Result<u8, std::num::ParseIntError> {
    match s.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn main() {
    // Load options
    let opts = Options::from_args();

    // Setup logging
    if let Err(e) = TermLogger::init(opts.level, simplelog::Config::default()) {
        eprintln!("Error initialising logger: {:?}", e);
    }

    if opts.address != DEFAULT_ADDRESS {
        warn!("Address 0x{:02x} differs from the sgp30 address 0x{:02x}", opts.address, DEFAULT_ADDRESS);
    }

    debug!("Connecting to I2C device");
    let i2c = match I2cdev::new(&opts.i2c) {
        Ok(v) => v,
        Err(e) => {
            error!("Error opening I2C device '{}': {:?}", &opts.i2c, e);
            std::process::exit(-1);
        }
    };

    info!("Initialising SGP30, this takes around 20s");
    let sensor = match Sgp30::new(i2c, Delay, opts.address) {
        Ok(v) => v,
        Err(e) => {
            error!("Error connecting to SGP30: {}", e);
            std::process::exit(-2);
        }
    };

    loop {
        // Measurements are refreshed every second by the driver, report the latest
        let m = sensor.measurement();
        info!("CO2: {}, TVOC: {}", m.co2, m.tvoc);

        std::thread::sleep(*opts.period);
    }
}
