use crate::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest byte offset read by the fixed part of the layout, plus one.
pub const FRAME_LENGTH: usize = 441;

fn validate_len(buffer: &[u8], reply_size: usize) -> std::result::Result<(), Error> {
    if buffer.len() < reply_size {
        log::warn!(
            "Invalid buffer size - required={} received={}",
            reply_size,
            buffer.len()
        );
        return Err(Error::TruncatedFrame {
            offset: buffer.len(),
            length: reply_size - buffer.len(),
            frame_length: buffer.len(),
        });
    }
    Ok(())
}

/// Borrowed view on one response frame with bounds-checked field readers.
///
/// Every reader treats the bytes as unsigned octets unless its name says otherwise.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a>(&'a [u8]);

impl<'a> RawFrame<'a> {
    pub fn new(rx_buffer: &'a [u8]) -> Self {
        Self(rx_buffer)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fails unless the frame holds at least `reply_size` bytes.
    pub fn validate_len(&self, reply_size: usize) -> std::result::Result<(), Error> {
        validate_len(self.0, reply_size)
    }

    /// Fails unless `length` bytes starting at `offset` are present.
    pub fn require(&self, offset: usize, length: usize) -> std::result::Result<(), Error> {
        self.bytes(offset, length).map(|_| ())
    }

    fn bytes(&self, offset: usize, length: usize) -> std::result::Result<&'a [u8], Error> {
        offset
            .checked_add(length)
            .and_then(|end| self.0.get(offset..end))
            .ok_or_else(|| {
                log::warn!(
                    "Field out of frame - offset={} length={} received={}",
                    offset,
                    length,
                    self.0.len()
                );
                Error::TruncatedFrame {
                    offset,
                    length,
                    frame_length: self.0.len(),
                }
            })
    }

    pub fn read_u8(&self, offset: usize) -> std::result::Result<u8, Error> {
        Ok(self.bytes(offset, 1)?[0])
    }

    pub fn read_i8(&self, offset: usize) -> std::result::Result<i8, Error> {
        Ok(self.read_u8(offset)? as i8)
    }

    pub fn read_u16_le(&self, offset: usize) -> std::result::Result<u16, Error> {
        let b = self.bytes(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&self, offset: usize) -> std::result::Result<u32, Error> {
        let b = self.bytes(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// `(byte & mask) >> shift`
    pub fn read_bits(&self, offset: usize, mask: u8, shift: u8) -> std::result::Result<u8, Error> {
        Ok((self.read_u8(offset)? & mask) >> shift)
    }

    /// Returns the (low, high) nibbles of one byte.
    pub fn read_nibbles(&self, offset: usize) -> std::result::Result<(u8, u8), Error> {
        let byte = self.read_u8(offset)?;
        Ok((byte & 0x0F, (byte & 0xF0) >> 4))
    }

    /// Maps every byte to the code point of the same value, without trimming.
    pub fn read_chars(&self, offset: usize, length: usize) -> std::result::Result<String, Error> {
        Ok(self
            .bytes(offset, length)?
            .iter()
            .map(|&b| char::from(b))
            .collect())
    }

    /// Like [`RawFrame::read_chars`], with control characters and spaces stripped from both ends.
    pub fn read_text(&self, offset: usize, length: usize) -> std::result::Result<String, Error> {
        let text = self.read_chars(offset, length)?;
        Ok(text.trim_matches(|c: char| c <= ' ').to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Unit {
    MilliAmpereHour,
    MilliVolt,
    MilliAmpere,
    Ampere,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Celsius,
    MicroOhm,
}

impl Unit {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Unit::MilliAmpereHour => "mAh",
            Unit::MilliVolt => "mV",
            Unit::MilliAmpere => "mA",
            Unit::Ampere => "A",
            Unit::Minute => "min",
            Unit::Second => "S",
            Unit::Millisecond => "ms",
            Unit::Microsecond => "us",
            Unit::Celsius => "℃",
            Unit::MicroOhm => "uΩ",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A numeric value tagged with its unit, displayed as e.g. `3700 mAh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quantity<T> {
    pub value: T,
    pub unit: Unit,
}

impl<T> Quantity<T> {
    pub const fn new(value: T, unit: Unit) -> Self {
        Self { value, unit }
    }
}

impl<T: fmt::Display> fmt::Display for Quantity<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Discrete hardware settings selected by a narrow bit-field.
///
/// The code extracted from the frame is the index into `steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTable {
    pub name: &'static str,
    pub unit: Unit,
    steps: &'static [u16],
}

impl StepTable {
    pub fn steps(&self) -> &'static [u16] {
        self.steps
    }

    pub fn lookup(&self, code: u8) -> std::result::Result<Quantity<u16>, Error> {
        self.steps
            .get(usize::from(code))
            .map(|&value| Quantity::new(value, self.unit))
            .ok_or(Error::UnrecognizedCode {
                table: self.name,
                code,
            })
    }

    /// Lenient lookup: unknown codes are logged and yield `None`.
    pub fn decode(&self, code: u8) -> Option<Quantity<u16>> {
        match self.lookup(code) {
            Ok(quantity) => Some(quantity),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Quantity<u16>)> + '_ {
        self.steps
            .iter()
            .enumerate()
            .map(move |(code, &value)| (code as u8, Quantity::new(value, self.unit)))
    }
}

/// Release and delay times of the cell over/under-voltage protection, 2 bits each.
pub const VOLTAGE_PROTECTION_TIME: StepTable = StepTable {
    name: "voltage protection time",
    unit: Unit::Second,
    steps: &[1, 2, 4, 8],
};

pub const SHORT_CIRCUIT_DETECT_TIME: StepTable = StepTable {
    name: "short circuit detect time",
    unit: Unit::Microsecond,
    steps: &[70, 100, 200, 400],
};

pub const SHORT_CIRCUIT_DETECT_CURRENT: StepTable = StepTable {
    name: "short circuit detect current",
    unit: Unit::MilliVolt,
    steps: &[44, 67, 89, 111, 133, 155, 178, 200],
};

pub const OVER_CURRENT_DETECT_TIME: StepTable = StepTable {
    name: "over current detect time",
    unit: Unit::Millisecond,
    steps: &[8, 20, 40, 80, 160, 320, 640, 1280],
};

pub const OVER_CURRENT_DETECT_CURRENT: StepTable = StepTable {
    name: "over current detect current",
    unit: Unit::MilliVolt,
    steps: &[17, 22, 28, 33, 39, 44, 50, 56, 61, 67, 72, 78, 83, 89, 94, 100],
};

pub const STEP_TABLES: [&StepTable; 5] = [
    &VOLTAGE_PROTECTION_TIME,
    &SHORT_CIRCUIT_DETECT_TIME,
    &SHORT_CIRCUIT_DETECT_CURRENT,
    &OVER_CURRENT_DETECT_TIME,
    &OVER_CURRENT_DETECT_CURRENT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperateMode {
    Regular,
    LongPressOff,
    WeakSwitchControl,
    WeakSwitchNoSleep,
}

impl OperateMode {
    /// Label as shown by the vendor application.
    pub const fn device_label(&self) -> &'static str {
        match self {
            OperateMode::Regular => "常规模式",
            OperateMode::LongPressOff => "长按关机",
            OperateMode::WeakSwitchControl => "弱电开关控制",
            OperateMode::WeakSwitchNoSleep => "弱电开关无休眠",
        }
    }
}

impl From<u8> for OperateMode {
    fn from(code: u8) -> Self {
        match code {
            1 => OperateMode::LongPressOff,
            2 => OperateMode::WeakSwitchControl,
            3 => OperateMode::WeakSwitchNoSleep,
            _ => OperateMode::Regular,
        }
    }
}

impl fmt::Display for OperateMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OperateMode::Regular => write!(f, "Regular mode"),
            OperateMode::LongPressOff => write!(f, "Long press to turn off"),
            OperateMode::WeakSwitchControl => write!(f, "Weak switch control"),
            OperateMode::WeakSwitchNoSleep => write!(f, "Weak switch without sleep"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtectionChip {
    Bq76930,
    Bq76940,
    Bq76925,
    Unknown(u8),
}

impl ProtectionChip {
    /// Chip name as shown by the vendor application, blank when unknown.
    pub const fn device_label(&self) -> &'static str {
        match self {
            ProtectionChip::Bq76930 => "BQ76930",
            ProtectionChip::Bq76940 => "BQ76940",
            ProtectionChip::Bq76925 => "BQ76925",
            ProtectionChip::Unknown(_) => "",
        }
    }
}

impl TryFrom<u8> for ProtectionChip {
    type Error = Error;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(ProtectionChip::Bq76930),
            1 => Ok(ProtectionChip::Bq76940),
            2 => Ok(ProtectionChip::Bq76925),
            _ => Err(Error::UnrecognizedCode {
                table: "protection chip model",
                code,
            }),
        }
    }
}

impl fmt::Display for ProtectionChip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProtectionChip::Unknown(code) => write!(f, "unknown ({code})"),
            chip => f.write_str(chip.device_label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShortCircuitReleasePolicy {
    /// Resume once the load is disconnected and the over-current condition is released.
    AfterLoadRemoval,
    AfterTimeout,
}

impl ShortCircuitReleasePolicy {
    pub const fn device_label(&self) -> &'static str {
        match self {
            ShortCircuitReleasePolicy::AfterLoadRemoval => "断载且过恢时",
            ShortCircuitReleasePolicy::AfterTimeout => "超时则恢复",
        }
    }
}

impl From<bool> for ShortCircuitReleasePolicy {
    fn from(timeout: bool) -> Self {
        if timeout {
            ShortCircuitReleasePolicy::AfterTimeout
        } else {
            ShortCircuitReleasePolicy::AfterLoadRemoval
        }
    }
}

impl fmt::Display for ShortCircuitReleasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShortCircuitReleasePolicy::AfterLoadRemoval => {
                write!(f, "Resume after load removal and over current release")
            }
            ShortCircuitReleasePolicy::AfterTimeout => write!(f, "Resume after timeout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl From<u8> for HardwareVersion {
    fn from(byte: u8) -> Self {
        Self {
            major: (byte & 0xF0) >> 4,
            minor: byte & 0x0F,
        }
    }
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Production date as stored by the device: signed year offset from 2000, month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManufactureDate {
    pub year: i16,
    pub month: i8,
    pub day: i8,
}

impl fmt::Display for ManufactureDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}
