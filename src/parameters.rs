use crate::protocol::*;
use crate::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const BATTERY_SERIAL_OFFSET: usize = 217;
const CELL_VOLTAGE_OFFSETS_START: usize = 304;

/// A pair of settings stored as the low (charge) and high (discharge) nibble of one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChargeDischarge<T> {
    pub charge: T,
    pub discharge: T,
}

impl<T> ChargeDischarge<T> {
    fn decode(
        frame: &RawFrame,
        offset: usize,
        convert: impl Fn(u8) -> T,
    ) -> std::result::Result<Self, Error> {
        let (low, high) = frame.read_nibbles(offset)?;
        Ok(Self {
            charge: convert(low),
            discharge: convert(high),
        })
    }
}

/// Cell over/under-voltage protection. Times are `None` for codes outside their table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoltageProtection {
    pub over_voltage: Quantity<u16>,
    pub over_voltage_release: Quantity<u16>,
    pub over_voltage_release_time: Option<Quantity<u16>>,
    pub over_voltage_delay_time: Option<Quantity<u16>>,
    pub under_voltage: Quantity<u16>,
    pub under_voltage_release: Quantity<u16>,
    pub under_voltage_release_time: Option<Quantity<u16>>,
    pub under_voltage_delay_time: Option<Quantity<u16>>,
}

impl VoltageProtection {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        let time = |mask, shift| -> std::result::Result<_, Error> {
            Ok(VOLTAGE_PROTECTION_TIME.decode(frame.read_bits(212, mask, shift)?))
        };
        Ok(Self {
            over_voltage: Quantity::new(frame.read_u16_le(208)?, Unit::MilliVolt),
            over_voltage_release: Quantity::new(frame.read_u16_le(210)?, Unit::MilliVolt),
            over_voltage_release_time: time(0b0000_0011, 0)?,
            over_voltage_delay_time: time(0b0011_0000, 4)?,
            under_voltage: Quantity::new(frame.read_u16_le(213)?, Unit::MilliVolt),
            under_voltage_release: Quantity::new(frame.read_u16_le(215)?, Unit::MilliVolt),
            under_voltage_release_time: time(0b0000_1100, 2)?,
            under_voltage_delay_time: time(0b1100_0000, 6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShortCircuitProtection {
    pub detect_time: Option<Quantity<u16>>,
    pub detect_current: Option<Quantity<u16>>,
    pub release_policy: ShortCircuitReleasePolicy,
    pub release_time: Quantity<u8>,
}

impl ShortCircuitProtection {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        Ok(Self {
            detect_time: SHORT_CIRCUIT_DETECT_TIME.decode(frame.read_bits(218, 0b0001_1000, 3)?),
            detect_current: SHORT_CIRCUIT_DETECT_CURRENT
                .decode(frame.read_bits(218, 0b0000_0111, 0)?),
            release_policy: ShortCircuitReleasePolicy::from(
                frame.read_bits(219, 0b1000_0000, 7)? != 0,
            ),
            release_time: Quantity::new(frame.read_bits(219, 0b0111_1111, 0)?, Unit::Second),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverCurrentProtection {
    pub detect_time: Option<Quantity<u16>>,
    pub detect_current: Option<Quantity<u16>>,
    pub release_time: Quantity<u8>,
}

impl OverCurrentProtection {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        Ok(Self {
            detect_time: OVER_CURRENT_DETECT_TIME.decode(frame.read_bits(220, 0b0111_0000, 4)?),
            detect_current: OVER_CURRENT_DETECT_CURRENT
                .decode(frame.read_bits(220, 0b0000_1111, 0)?),
            release_time: Quantity::new(frame.read_u8(221)?, Unit::Second),
        })
    }
}

// Over-temperature thresholds are stored in 2 ℃ steps above 40 ℃,
// under-temperature thresholds in 2 ℃ steps below 10 ℃.
fn over_temperature(raw: u8) -> Quantity<i16> {
    Quantity::new(i16::from(raw) * 2 + 40, Unit::Celsius)
}

fn under_temperature(raw: u8) -> Quantity<i16> {
    Quantity::new(10 - i16::from(raw) * 2, Unit::Celsius)
}

fn seconds(raw: u8) -> Quantity<u8> {
    Quantity::new(raw, Unit::Second)
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemperatureProtection {
    pub over_temperature: ChargeDischarge<Quantity<i16>>,
    pub over_temperature_release: ChargeDischarge<Quantity<i16>>,
    pub over_temperature_delay_time: ChargeDischarge<Quantity<u8>>,
    pub under_temperature: ChargeDischarge<Quantity<i16>>,
    pub under_temperature_release: ChargeDischarge<Quantity<i16>>,
    pub under_temperature_delay_time: ChargeDischarge<Quantity<u8>>,
}

impl TemperatureProtection {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        Ok(Self {
            over_temperature: ChargeDischarge::decode(frame, 222, over_temperature)?,
            over_temperature_release: ChargeDischarge::decode(frame, 223, over_temperature)?,
            over_temperature_delay_time: ChargeDischarge::decode(frame, 224, seconds)?,
            under_temperature: ChargeDischarge::decode(frame, 225, under_temperature)?,
            under_temperature_release: ChargeDischarge::decode(frame, 226, under_temperature)?,
            under_temperature_delay_time: ChargeDischarge::decode(frame, 227, seconds)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BalanceSettings {
    pub charge_balance_voltage: Quantity<u16>,
    pub discharge_balance_current: Quantity<u16>,
    pub balance_setup_value: Quantity<u8>,
}

impl BalanceSettings {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        Ok(Self {
            charge_balance_voltage: Quantity::new(frame.read_u16_le(228)?, Unit::MilliVolt),
            // stored in units of 100 mA
            discharge_balance_current: Quantity::new(
                u16::from(frame.read_u8(230)?) * 100,
                Unit::MilliAmpere,
            ),
            balance_setup_value: Quantity::new(frame.read_u8(231)?, Unit::MilliVolt),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChargeCurrentProtection {
    pub value: Quantity<u16>,
    pub delay_time: Quantity<u8>,
    pub release_time: Quantity<u8>,
}

impl ChargeCurrentProtection {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        Ok(Self {
            value: Quantity::new(u16::from(frame.read_u8(232)?) * 100, Unit::MilliAmpere),
            delay_time: seconds(frame.read_u8(233)?),
            release_time: seconds(frame.read_u8(234)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverDischargeProtection {
    pub value: Quantity<i8>,
    pub delay_time: Quantity<u8>,
    pub release_time: Quantity<u8>,
}

impl OverDischargeProtection {
    fn decode(frame: &RawFrame) -> std::result::Result<Self, Error> {
        Ok(Self {
            value: Quantity::new(frame.read_i8(235)?, Unit::Ampere),
            delay_time: seconds(frame.read_u8(236)?),
            release_time: seconds(frame.read_u8(237)?),
        })
    }
}

/// Calibration offset of one cell, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellVoltageOffset {
    pub cell: u8,
    pub offset: Quantity<i8>,
}

impl CellVoltageOffset {
    /// Reads `n_cells` signed offsets starting at byte 304.
    pub fn decode_all(frame: &RawFrame, n_cells: u8) -> std::result::Result<Vec<Self>, Error> {
        frame.require(CELL_VOLTAGE_OFFSETS_START, usize::from(n_cells))?;
        let mut result = Vec::with_capacity(usize::from(n_cells));
        for n_cell in 1..=n_cells {
            let offset = frame.read_i8(CELL_VOLTAGE_OFFSETS_START + usize::from(n_cell) - 1)?;
            log::trace!("Cell #{} voltage offset={} mV", n_cell, offset);
            result.push(Self {
                cell: n_cell,
                offset: Quantity::new(offset, Unit::MilliVolt),
            });
        }
        Ok(result)
    }
}

impl fmt::Display for CellVoltageOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.cell, self.offset)
    }
}

/// Complete parameter set of one device, decoded from a single response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceParameterRecord {
    pub designed_capacity: Quantity<u32>,
    pub designed_voltage: Quantity<u32>,
    pub auto_off_time: Quantity<u16>,
    pub operate_mode: OperateMode,
    pub hardware_version: HardwareVersion,
    pub device_index: String,
    pub manufacture_date: ManufactureDate,
    pub manufacturer: String,
    pub cell_name: String,
    pub battery_name: String,
    pub bar_code: String,
    pub voltage_protection: VoltageProtection,
    pub protection_chip: ProtectionChip,
    pub battery_serial_count: u8,
    pub short_circuit: ShortCircuitProtection,
    pub over_current: OverCurrentProtection,
    pub temperature_protection: TemperatureProtection,
    pub balance: BalanceSettings,
    pub charge_current: ChargeCurrentProtection,
    pub over_discharge: OverDischargeProtection,
    pub sample_resistor: Quantity<u16>,
    pub protection_ic_current_standard: Quantity<u8>,
    pub auxiliary_voltage: Quantity<u16>,
    pub cell_voltage_offsets: Vec<CellVoltageOffset>,
}

impl DeviceParameterRecord {
    pub fn reply_size() -> usize {
        FRAME_LENGTH
    }

    pub fn decode(rx_buffer: &[u8]) -> std::result::Result<Self, Error> {
        let frame = RawFrame::new(rx_buffer);
        frame.validate_len(Self::reply_size())?;

        let chip_code = frame.read_bits(BATTERY_SERIAL_OFFSET, 0b1100_0000, 6)?;
        let protection_chip = ProtectionChip::try_from(chip_code).unwrap_or_else(|err| {
            log::warn!("{err}");
            ProtectionChip::Unknown(chip_code)
        });
        let battery_serial_count = frame.read_bits(BATTERY_SERIAL_OFFSET, 0b0011_1111, 0)?;
        log::debug!("Battery serial count={}", battery_serial_count);

        Ok(Self {
            designed_capacity: Quantity::new(frame.read_u32_le(0)?, Unit::MilliAmpereHour),
            designed_voltage: Quantity::new(frame.read_u32_le(4)?, Unit::MilliVolt),
            auto_off_time: Quantity::new(frame.read_u16_le(8)?, Unit::Minute),
            operate_mode: OperateMode::from(frame.read_u8(10)?),
            hardware_version: HardwareVersion::from(frame.read_u8(11)?),
            device_index: frame.read_chars(12, 4)?,
            manufacture_date: ManufactureDate {
                year: i16::from(frame.read_i8(16)?) + 2000,
                month: frame.read_i8(17)?,
                day: frame.read_i8(18)?,
            },
            manufacturer: frame.read_text(32, 16)?,
            cell_name: frame.read_text(48, 16)?,
            battery_name: frame.read_text(64, 32)?,
            bar_code: frame.read_text(96, 32)?,
            voltage_protection: VoltageProtection::decode(&frame)?,
            protection_chip,
            battery_serial_count,
            short_circuit: ShortCircuitProtection::decode(&frame)?,
            over_current: OverCurrentProtection::decode(&frame)?,
            temperature_protection: TemperatureProtection::decode(&frame)?,
            balance: BalanceSettings::decode(&frame)?,
            charge_current: ChargeCurrentProtection::decode(&frame)?,
            over_discharge: OverDischargeProtection::decode(&frame)?,
            sample_resistor: Quantity::new(frame.read_u16_le(238)?, Unit::MicroOhm),
            protection_ic_current_standard: Quantity::new(frame.read_u8(240)?, Unit::MilliAmpere),
            auxiliary_voltage: Quantity::new(frame.read_u16_le(429)?, Unit::MilliVolt),
            cell_voltage_offsets: CellVoltageOffset::decode_all(&frame, battery_serial_count)?,
        })
    }
}
