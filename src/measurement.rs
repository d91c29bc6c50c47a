//! Sgp30 measurement types and response decoding
//!
//! Copyright 2019 Ryan Kurte

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::Error;
use crate::base::crc8;

/// Length of a `MeasureAirQuality` response (CO2 MSB, LSB, CRC, TVOC MSB, LSB, CRC)
pub const MEASUREMENT_LEN: usize = 6;

/// Equivalent CO2 concentration in parts-per-million (PPM)
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Co2(pub u16);

impl fmt::Display for Co2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ppm", self.0)
    }
}

/// Total volatile organic compounds in parts-per-billion (PPB)
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Tvoc(pub u16);

impl fmt::Display for Tvoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ppb", self.0)
    }
}

/// Sgp30 measurement object
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Measurement {
    /// CO2eq concentration
    /// Range: 400 - 60,000 ppm
    pub co2: Co2,
    /// TVOC concentration
    /// Range: 0 - 60,000 ppb
    pub tvoc: Tvoc,
}

/// Until the first successful measurement the sensor reports atmospheric baseline values
impl Default for Measurement {
    fn default() -> Self {
        Measurement{ co2: Co2(400), tvoc: Tvoc(0) }
    }
}

impl Measurement {
    /// Decode a measurement response, ignoring the CRC bytes
    pub fn decode(line: &[u8; MEASUREMENT_LEN]) -> Self {
        // Note the returned data is _big endian_
        let co2 = u16::from_be_bytes([line[0], line[1]]);
        let tvoc = u16::from_be_bytes([line[3], line[4]]);

        Measurement{ co2: Co2(co2), tvoc: Tvoc(tvoc) }
    }

    /// Decode a measurement response, checking the CRC of each word
    pub fn decode_checked<Err>(line: &[u8; MEASUREMENT_LEN]) -> Result<Self, Error<Err>> {
        let crc1 = crc8(&line[0..2]);
        if crc1 != line[2] {
            return Err(Error::Crc(crc1, line[2]));
        }

        let crc2 = crc8(&line[3..5]);
        if crc2 != line[5] {
            return Err(Error::Crc(crc2, line[5]));
        }

        Ok(Self::decode(line))
    }

    fn pack(&self) -> u32 {
        (self.co2.0 as u32) << 16 | (self.tvoc.0 as u32)
    }

    fn unpack(v: u32) -> Self {
        Measurement{ co2: Co2((v >> 16) as u16), tvoc: Tvoc((v & 0xFFFF) as u16) }
    }
}

/// Measurement shared between the measurement task and readers
/// Both values are stored in a single word so readers never see a torn pair
#[derive(Debug)]
pub struct AtomicMeasurement(AtomicU32);

impl AtomicMeasurement {
    pub fn new(m: Measurement) -> Self {
        AtomicMeasurement(AtomicU32::new(m.pack()))
    }

    pub fn load(&self) -> Measurement {
        Measurement::unpack(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, m: Measurement) {
        self.0.store(m.pack(), Ordering::Release)
    }
}

impl Default for AtomicMeasurement {
    fn default() -> Self {
        Self::new(Measurement::default())
    }
}
