//! Sgp30 device definitions
//!
//! Copyright 2019 Ryan Kurte


/// Sgp30 I2C address
/// (this is fixed, the device has no address select pin)
pub const DEFAULT_ADDRESS: u8 = 0x58;

pub const CRC_POLY: u8 = 0x31;
pub const CRC_INIT: u8 = 0xff;
pub const CRC_XOR: u8 = 0x00;

/// Time the sensor needs after `InitAirQuality` before measurements are meaningful
pub const WARM_UP_MS: u32 = 20_000;

/// Interval between `MeasureAirQuality` commands required by the baseline compensation algorithm
pub const MEASURE_INTERVAL_MS: u64 = 1_000;

/// Sgp30 I2C Command
/// Commands are big endian 16-bit unsigned integers, response words are each followed by a CRC-8 checksum
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Command {
    /// Start the air quality measurement
    /// Must be followed by `MeasureAirQuality` every second
    InitAirQuality = 0x2003,

    /// Read CO2eq (ppm) and TVOC (ppb)
    MeasureAirQuality = 0x2008,

    /// Read the CO2eq and TVOC baseline words
    GetIaqBaseline = 0x2015,

    /// Restore a previously read baseline
    SetIaqBaseline = 0x201e,

    /// Set absolute humidity for compensation
    SetHumidity = 0x2061,

    /// On-chip self test, returns 0xD400 on success
    MeasureTest = 0x2032,

    GetFeatureSetVersion = 0x202f,

    /// Read raw H2 and Ethanol signals
    MeasureRawSignals = 0x2050,

    GetTvocBaseline = 0x20b3,

    SetTvocBaseline = 0x2077,
}

impl Command {
    /// Opcode bytes as written on the wire
    pub const fn opcode(self) -> [u8; 2] {
        let c = self as u16;
        [(c >> 8) as u8, (c & 0xFF) as u8]
    }

    /// Maximum processing time in milliseconds between issuing the command and
    /// the response becoming available
    pub const fn duration_ms(self) -> u32 {
        match self {
            Command::InitAirQuality => 10,
            Command::MeasureAirQuality => 12,
            Command::GetIaqBaseline => 10,
            Command::SetIaqBaseline => 10,
            Command::SetHumidity => 10,
            Command::MeasureTest => 220,
            Command::GetFeatureSetVersion => 10,
            Command::MeasureRawSignals => 25,
            Command::GetTvocBaseline => 10,
            Command::SetTvocBaseline => 10,
        }
    }

    /// Response length in bytes including CRC, zero for write-only commands
    pub const fn response_len(self) -> usize {
        match self {
            Command::MeasureAirQuality => 6,
            Command::GetIaqBaseline => 6,
            Command::MeasureTest => 3,
            Command::GetFeatureSetVersion => 3,
            Command::MeasureRawSignals => 6,
            Command::GetTvocBaseline => 3,
            _ => 0,
        }
    }
}

/// Every command known to the driver
pub const COMMANDS: [Command; 10] = [
    Command::InitAirQuality,
    Command::MeasureAirQuality,
    Command::GetIaqBaseline,
    Command::SetIaqBaseline,
    Command::SetHumidity,
    Command::MeasureTest,
    Command::GetFeatureSetVersion,
    Command::MeasureRawSignals,
    Command::GetTvocBaseline,
    Command::SetTvocBaseline,
];
