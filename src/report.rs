use gwbms_lib::parameters::{ChargeDischarge, DeviceParameterRecord};
use gwbms_lib::protocol::{Quantity, STEP_TABLES};
use std::fmt::{self, Write};

fn step(value: &Option<Quantity<u16>>) -> String {
    value.map_or_else(|| "unknown".to_string(), |q| q.to_string())
}

fn pair<T: fmt::Display>(
    rows: &mut Vec<(String, String)>,
    name: &str,
    values: &ChargeDischarge<T>,
) {
    rows.push((format!("Charge {name}"), values.charge.to_string()));
    rows.push((format!("Discharge {name}"), values.discharge.to_string()));
}

fn rows(record: &DeviceParameterRecord) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = Vec::new();
    macro_rules! row {
        ($name:expr, $value:expr) => {
            rows.push(($name.to_string(), $value.to_string()))
        };
    }

    row!("Designed capacity", record.designed_capacity);
    row!("Designed voltage", record.designed_voltage);
    row!("Auto off time", record.auto_off_time);
    row!("Operate mode", record.operate_mode);
    row!("Hardware version", record.hardware_version);
    row!("Device index", record.device_index.escape_debug());
    row!("Manufacture date", record.manufacture_date);
    row!("Manufacturer", record.manufacturer.escape_debug());
    row!("Cell name", record.cell_name.escape_debug());
    row!("Battery name", record.battery_name.escape_debug());
    row!("Bar code", record.bar_code.escape_debug());

    let voltage = &record.voltage_protection;
    row!("Over voltage", voltage.over_voltage);
    row!("Over voltage release", voltage.over_voltage_release);
    row!("Over voltage release time", step(&voltage.over_voltage_release_time));
    row!("Over voltage delay time", step(&voltage.over_voltage_delay_time));
    row!("Under voltage", voltage.under_voltage);
    row!("Under voltage release", voltage.under_voltage_release);
    row!("Under voltage release time", step(&voltage.under_voltage_release_time));
    row!("Under voltage delay time", step(&voltage.under_voltage_delay_time));

    row!("Protection chip", record.protection_chip);
    row!("Battery serial count", record.battery_serial_count);

    let short_circuit = &record.short_circuit;
    row!("Short circuit detect time", step(&short_circuit.detect_time));
    row!("Short circuit detect current", step(&short_circuit.detect_current));
    row!("Short circuit release", short_circuit.release_policy);
    row!("Short circuit release time", short_circuit.release_time);

    let over_current = &record.over_current;
    row!("Over current detect time", step(&over_current.detect_time));
    row!("Over current detect current", step(&over_current.detect_current));
    row!("Over current release time", over_current.release_time);

    let temperature = &record.temperature_protection;
    pair(&mut rows, "over temperature", &temperature.over_temperature);
    pair(&mut rows, "over temperature release", &temperature.over_temperature_release);
    pair(&mut rows, "over temperature delay time", &temperature.over_temperature_delay_time);
    pair(&mut rows, "under temperature", &temperature.under_temperature);
    pair(&mut rows, "under temperature release", &temperature.under_temperature_release);
    pair(&mut rows, "under temperature delay time", &temperature.under_temperature_delay_time);

    row!("Charge balance voltage", record.balance.charge_balance_voltage);
    row!("Discharge balance current", record.balance.discharge_balance_current);
    row!("Balance setup value", record.balance.balance_setup_value);
    row!("Charge current", record.charge_current.value);
    row!("Charge current delay time", record.charge_current.delay_time);
    row!("Charge current release time", record.charge_current.release_time);
    row!("Primary over discharge", record.over_discharge.value);
    row!("Primary over discharge delay time", record.over_discharge.delay_time);
    row!("Primary over discharge release time", record.over_discharge.release_time);
    row!("Sample resistor", record.sample_resistor);
    row!("Protection IC current standard", record.protection_ic_current_standard);
    row!("Auxiliary voltage", record.auxiliary_voltage);
    rows
}

/// Renders the record as an aligned `name: value` listing followed by the cell offsets.
pub fn render(record: &DeviceParameterRecord) -> String {
    let rows = rows(record);
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0) + 1;
    let mut out = String::new();
    for (name, value) in &rows {
        let _ = writeln!(out, "{:<width$} {}", format!("{name}:"), value);
    }
    let _ = writeln!(out, "Cell voltage offsets:");
    if record.cell_voltage_offsets.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for offset in &record.cell_voltage_offsets {
        let _ = writeln!(out, "  {offset}");
    }
    out
}

/// Renders every step table as `code => value` lines.
pub fn render_tables() -> String {
    let mut out = String::new();
    for table in STEP_TABLES {
        let _ = writeln!(out, "{} ({}):", table.name, table.unit);
        for (code, quantity) in table.iter() {
            let _ = writeln!(out, "  {code:>2} => {quantity}");
        }
    }
    out
}
