//! Base communication implementation for interacting with Sgp30 device
//!
//! Copyright 2019 Ryan Kurte

use core::fmt::Debug;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;

use crate::{Error};
use crate::device::*;

/// Base API for reading and writing to the device
/// This should not be required by consumers, but is exposed to support alternate use
/// (such as driving the baseline and self-test commands)
pub trait Base<Err> {
    /// Write a command to the device and wait for it to be processed
    fn write_command(&mut self, command: Command) -> Result<(), Error<Err>>;
    /// Write a command then read its response into `data`, which must match the command response length
    fn read_command(&mut self, command: Command, data: &mut [u8]) -> Result<(), Error<Err>>;
}

/// Helper for device CRC-8 calculation
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;

    // For each byte
    for v in data {
        // XOR with current byte
        crc ^= v;

        // For each bit
        for _bit in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC_POLY;
            } else {
                crc = crc << 1;
            }
        }
    }

    // Apply final xor
    crc ^ CRC_XOR
}

/// I2C connection paired with the delay used to honour command processing times
pub struct Bus<Conn, Delay> {
    conn: Conn,
    delay: Delay,
}

impl <Conn, Delay> Bus<Conn, Delay> where
    Delay: DelayMs<u32>,
{
    pub fn new(conn: Conn, delay: Delay) -> Self {
        Bus{ conn, delay }
    }

    /// Block for the provided number of milliseconds
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms)
    }

    /// Release the underlying connection and delay
    pub fn release(self) -> (Conn, Delay) {
        (self.conn, self.delay)
    }
}

/// Base implementation for I2C devices
impl <Conn, Delay, Err> Base<Err> for Bus<Conn, Delay> where
    Conn: i2c::Read<Error=Err> + i2c::Write<Error=Err>,
    Delay: DelayMs<u32>,
    Err: Debug,
{
    fn write_command(&mut self, command: Command) -> Result<(), Error<Err>> {
        let cmd = command.opcode();

        trace!("Writing command: {:?} ({:x?})", command, cmd);

        self.conn.write(DEFAULT_ADDRESS, &cmd)
            .map_err(|e| Error::Conn(e) )?;

        // Allow the device to process the command
        self.delay.delay_ms(command.duration_ms());

        Ok(())
    }

    fn read_command(&mut self, command: Command, data: &mut [u8]) -> Result<(), Error<Err>> {
        let expected = command.response_len();
        if data.len() != expected {
            return Err(Error::Length{ expected, actual: data.len() });
        }

        // First write the command, which includes the processing delay
        self.write_command(command)?;

        // Then, read the data back
        self.conn.read(DEFAULT_ADDRESS, data)
            .map_err(|e| Error::Conn(e) )?;

        trace!("Read data: {:x?}", data);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use std::vec;
    use std::vec::Vec;
    use std::time::{Duration, Instant};

    use embedded_hal_mock::MockError;
    use embedded_hal_mock::delay::MockNoop;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Event {
        Write(Vec<u8>, Instant),
        Read(usize, Instant),
    }

    /// Connection recording the time of each bus phase
    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        fail_write: bool,
        fail_read: bool,
    }

    impl i2c::Write for Recorder {
        type Error = ();

        fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), ()> {
            self.events.push(Event::Write(bytes.to_vec(), Instant::now()));
            if self.fail_write { Err(()) } else { Ok(()) }
        }
    }

    impl i2c::Read for Recorder {
        type Error = ();

        fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), ()> {
            self.events.push(Event::Read(buffer.len(), Instant::now()));
            if self.fail_read { Err(()) } else { Ok(()) }
        }
    }

    struct Sleep;

    impl DelayMs<u32> for Sleep {
        fn delay_ms(&mut self, ms: u32) {
            std::thread::sleep(Duration::from_millis(ms as u64));
        }
    }

    /// Delay recording requested durations
    #[derive(Default)]
    struct Record(Vec<u32>);

    impl DelayMs<u32> for Record {
        fn delay_ms(&mut self, ms: u32) {
            self.0.push(ms);
        }
    }

    #[test]
    fn test_write_command() {
        // Set up expectations
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x20, 0x03]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut bus = Bus::new(i2c.clone(), Record::default());

        bus.write_command(Command::InitAirQuality).unwrap();

        // Settle time is applied after the write
        let (_, delay) = bus.release();
        assert_eq!(delay.0, vec![10]);

        // Finalize expectations
        i2c.done();
    }

    #[test]
    fn test_read_command() {
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x20, 0x08]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0x01, 0x2C, 0xCC, 0x00, 0x64, 0x99]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut bus = Bus::new(i2c.clone(), MockNoop::new());

        let mut buff = [0u8; 6];
        bus.read_command(Command::MeasureAirQuality, &mut buff).unwrap();
        assert_eq!(buff, [0x01, 0x2C, 0xCC, 0x00, 0x64, 0x99]);

        i2c.done();
    }

    #[test]
    fn test_read_length_mismatch() {
        for c in COMMANDS.iter() {
            let expected = c.response_len();

            // No transactions may be issued for a mismatched buffer
            let mut i2c = I2cMock::new(&[]);
            let mut bus = Bus::new(i2c.clone(), MockNoop::new());

            let mut lengths = vec![expected + 1];
            if expected > 0 {
                lengths.push(expected - 1);
            }

            for l in lengths {
                let mut buff = vec![0u8; l];
                match bus.read_command(*c, &mut buff) {
                    Err(Error::<MockError>::Length{ expected: e, actual: a }) => {
                        assert_eq!(e, expected);
                        assert_eq!(a, l);
                    },
                    r => panic!("unexpected result for {:?} with {} bytes: {:?}", c, l, r),
                }
            }

            i2c.done();
        }
    }

    #[test]
    fn test_read_settles_between_phases() {
        let mut bus = Bus::new(Recorder::default(), Sleep);

        let mut buff = [0u8; 3];
        bus.read_command(Command::MeasureTest, &mut buff).unwrap();

        let (conn, _) = bus.release();
        match &conn.events[..] {
            [Event::Write(cmd, w), Event::Read(len, r)] => {
                assert_eq!(cmd, &vec![0x20, 0x32]);
                assert_eq!(*len, 3);
                let settle = Duration::from_millis(Command::MeasureTest.duration_ms() as u64);
                assert!(r.duration_since(*w) >= settle);
            },
            e => panic!("unexpected bus events: {:?}", e),
        }
    }

    #[test]
    fn test_write_failure() {
        let conn = Recorder{ fail_write: true, ..Default::default() };
        let mut bus = Bus::new(conn, Record::default());

        match bus.write_command(Command::InitAirQuality) {
            Err(Error::Conn(())) => (),
            r => panic!("unexpected result: {:?}", r),
        }

        // A failed write does not wait for the device
        let (_conn, delay) = bus.release();
        assert!(delay.0.is_empty());
    }

    #[test]
    fn test_read_phase_failure() {
        let conn = Recorder{ fail_read: true, ..Default::default() };
        let mut bus = Bus::new(conn, MockNoop::new());

        let mut buff = [0u8; 6];
        match bus.read_command(Command::MeasureAirQuality, &mut buff) {
            Err(Error::Conn(())) => (),
            r => panic!("unexpected result: {:?}", r),
        }

        let (conn, _) = bus.release();
        assert_eq!(conn.events.len(), 2);
    }

    #[test]
    fn test_crc() {
        // Test vectors from datasheet
        let tests = &[
            ([0xbe, 0xef], 0x92),
            ([0x00, 0x00], 0x81),
            ([0x01, 0x2C], 0x8E),
        ];

        for t in tests {
            let v = crc8(&t.0);
            assert_eq!(v, t.1);
        }
    }
}
