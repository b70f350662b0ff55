use gwbms_lib::parameters::{CellVoltageOffset, ChargeDischarge, DeviceParameterRecord};
use gwbms_lib::protocol::*;
use gwbms_lib::Error;

fn put_text(buffer: &mut [u8], offset: usize, length: usize, text: &str) {
    let field = &mut buffer[offset..offset + length];
    field.fill(b' ');
    field[..text.len()].copy_from_slice(text.as_bytes());
}

/// A 16S pack as reported by a field device.
fn sample_frame() -> Vec<u8> {
    let mut buffer = vec![0u8; FRAME_LENGTH];
    buffer[0..4].copy_from_slice(&[0x10, 0x27, 0x00, 0x00]); // 10000 mAh
    buffer[4..8].copy_from_slice(&60_000u32.to_le_bytes());
    buffer[8..10].copy_from_slice(&30u16.to_le_bytes());
    buffer[10] = 0x02;
    buffer[11] = 0x21;
    buffer[12..16].copy_from_slice(b"A017");
    buffer[16..19].copy_from_slice(&[23, 11, 4]);
    put_text(&mut buffer, 32, 16, "GREENWAY");
    buffer[48..53].copy_from_slice(b"21700");
    put_text(&mut buffer, 64, 32, "GW 60V 10Ah");
    put_text(&mut buffer, 96, 32, "  GW2311040017");

    buffer[208..210].copy_from_slice(&4250u16.to_le_bytes());
    buffer[210..212].copy_from_slice(&4150u16.to_le_bytes());
    buffer[212] = 0b01_10_11_00;
    buffer[213..215].copy_from_slice(&2800u16.to_le_bytes());
    buffer[215..217].copy_from_slice(&3000u16.to_le_bytes());
    buffer[217] = 0b01_010000; // BQ76940, 16 cells
    buffer[218] = 0b000_10_101;
    buffer[219] = 0x80 | 60;
    buffer[220] = 0b0_011_1001;
    buffer[221] = 32;
    buffer[222] = 0x54;
    buffer[223] = 0x43;
    buffer[224] = 0x22;
    buffer[225] = 0x75;
    buffer[226] = 0x64;
    buffer[227] = 0x33;
    buffer[228..230].copy_from_slice(&3400u16.to_le_bytes());
    buffer[230] = 5;
    buffer[231] = 30;
    buffer[232] = 150;
    buffer[233] = 5;
    buffer[234] = 60;
    buffer[235] = (-40i8) as u8;
    buffer[236] = 2;
    buffer[237] = 30;
    buffer[238..240].copy_from_slice(&500u16.to_le_bytes());
    buffer[240] = 200;
    for (i, b) in buffer[304..320].iter_mut().enumerate() {
        *b = (i as i8 - 8) as u8;
    }
    buffer[429..431].copy_from_slice(&12_600u16.to_le_bytes());
    buffer
}

#[test]
fn decodes_every_field() {
    let record = gwbms_lib::decode(&sample_frame()).unwrap();

    assert_eq!(record.designed_capacity.to_string(), "10000 mAh");
    assert_eq!(record.designed_voltage, Quantity::new(60_000, Unit::MilliVolt));
    assert_eq!(record.auto_off_time.to_string(), "30 min");
    assert_eq!(record.operate_mode, OperateMode::WeakSwitchControl);
    assert_eq!(record.hardware_version.to_string(), "2.1");
    assert_eq!(record.device_index, "A017");
    assert_eq!(record.manufacture_date.to_string(), "2023-11-4");
    assert_eq!(record.manufacturer, "GREENWAY");
    assert_eq!(record.cell_name, "21700");
    assert_eq!(record.battery_name, "GW 60V 10Ah");
    assert_eq!(record.bar_code, "GW2311040017");

    let voltage = &record.voltage_protection;
    assert_eq!(voltage.over_voltage.value, 4250);
    assert_eq!(voltage.over_voltage_release.value, 4150);
    assert_eq!(voltage.over_voltage_release_time.unwrap().to_string(), "1 S");
    assert_eq!(voltage.under_voltage_release_time.unwrap().to_string(), "8 S");
    assert_eq!(voltage.over_voltage_delay_time.unwrap().to_string(), "4 S");
    assert_eq!(voltage.under_voltage_delay_time.unwrap().to_string(), "2 S");
    assert_eq!(voltage.under_voltage.value, 2800);
    assert_eq!(voltage.under_voltage_release.value, 3000);

    assert_eq!(record.protection_chip, ProtectionChip::Bq76940);
    assert_eq!(record.battery_serial_count, 16);

    let short_circuit = &record.short_circuit;
    assert_eq!(short_circuit.detect_time.unwrap().to_string(), "200 us");
    assert_eq!(short_circuit.detect_current.unwrap().to_string(), "155 mV");
    assert_eq!(
        short_circuit.release_policy,
        ShortCircuitReleasePolicy::AfterTimeout
    );
    assert_eq!(short_circuit.release_time.to_string(), "60 S");

    let over_current = &record.over_current;
    assert_eq!(over_current.detect_time.unwrap().to_string(), "80 ms");
    assert_eq!(over_current.detect_current.unwrap().to_string(), "67 mV");
    assert_eq!(over_current.release_time.value, 32);

    let temperature = &record.temperature_protection;
    let celsius = |charge: i16, discharge: i16| ChargeDischarge {
        charge: Quantity::new(charge, Unit::Celsius),
        discharge: Quantity::new(discharge, Unit::Celsius),
    };
    assert_eq!(temperature.over_temperature, celsius(48, 50));
    assert_eq!(temperature.over_temperature_release, celsius(46, 48));
    assert_eq!(temperature.over_temperature_delay_time.charge.value, 2);
    assert_eq!(temperature.under_temperature, celsius(0, -4));
    assert_eq!(temperature.under_temperature_release, celsius(2, -2));
    assert_eq!(temperature.under_temperature_delay_time.discharge.value, 3);

    assert_eq!(record.balance.charge_balance_voltage.value, 3400);
    assert_eq!(record.balance.discharge_balance_current.to_string(), "500 mA");
    assert_eq!(record.balance.balance_setup_value.to_string(), "30 mV");
    assert_eq!(record.charge_current.value.to_string(), "15000 mA");
    assert_eq!(record.charge_current.delay_time.value, 5);
    assert_eq!(record.charge_current.release_time.value, 60);
    assert_eq!(record.over_discharge.value.to_string(), "-40 A");
    assert_eq!(record.over_discharge.delay_time.value, 2);
    assert_eq!(record.over_discharge.release_time.value, 30);
    assert_eq!(record.sample_resistor.to_string(), "500 uΩ");
    assert_eq!(record.protection_ic_current_standard.to_string(), "200 mA");
    assert_eq!(record.auxiliary_voltage.value, 12_600);

    let offsets: Vec<String> = record
        .cell_voltage_offsets
        .iter()
        .map(CellVoltageOffset::to_string)
        .collect();
    assert_eq!(offsets.len(), 16);
    assert_eq!(offsets[0], "1: -8 mV");
    assert_eq!(offsets[8], "9: 0 mV");
    assert_eq!(offsets[15], "16: 7 mV");
}

#[test]
fn decoding_is_deterministic() {
    let frame = sample_frame();
    let first = gwbms_lib::decode(&frame).unwrap();
    let second = DeviceParameterRecord::decode(&frame).unwrap();
    assert_eq!(first, second);
}

#[test]
fn frames_decode_concurrently() {
    let frame = std::sync::Arc::new(sample_frame());
    let expected = gwbms_lib::decode(&frame).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let frame = frame.clone();
            std::thread::spawn(move || gwbms_lib::decode(&frame))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), expected);
    }
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut frame = sample_frame();
    let expected = gwbms_lib::decode(&frame).unwrap();
    frame.extend_from_slice(&[0xAA; 32]);
    assert_eq!(gwbms_lib::decode(&frame).unwrap(), expected);
}

#[test]
fn truncated_frame_yields_no_record() {
    let frame = sample_frame();
    let err = gwbms_lib::decode(&frame[..FRAME_LENGTH - 1]).unwrap_err();
    assert_eq!(
        err,
        Error::TruncatedFrame {
            offset: 440,
            length: 1,
            frame_length: 440
        }
    );
    assert!(err
        .to_string()
        .starts_with("Invalid or incomplete device response"));
}
