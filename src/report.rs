// src/report.rs

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::batch::{ClockCycleRecords, EdgeDelayRecords};
use crate::config::TimeUnit;
use crate::data_analysis::aggregation::DeviceRecords;
use crate::data_analysis::cycle_delay::median;
use crate::types::CategoryPoints;

/// Count, mean, median and range of one device's measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    /// `None` for an empty series or one containing NaN.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let arr = Array1::from(values.to_vec());
        let mean = arr.mean()?;
        let min = *arr.min().ok()?;
        let max = *arr.max().ok()?;
        let median = median(&mut arr.to_vec())?;
        Some(Self {
            count: values.len(),
            mean,
            median,
            min,
            max,
        })
    }
}

/// Stats for every device in first-seen order.
pub fn device_stats<T>(records: &DeviceRecords<T>) -> Vec<(String, SeriesStats)>
where
    T: Copy + Into<f64>,
{
    records
        .iter()
        .filter_map(|record| {
            let values: Vec<f64> = record.values.iter().map(|&v| v.into()).collect();
            SeriesStats::from_values(&values).map(|stats| (record.device_id.clone(), stats))
        })
        .collect()
}

/// Devices with both a rising and a falling mean, as `(device, mean rising, mean falling)`.
pub fn complete_edge_devices(records: &EdgeDelayRecords) -> Vec<(String, f64, f64)> {
    records
        .rising
        .iter()
        .filter_map(|rising| {
            let falling = records.falling.get(&rising.device_id)?;
            let mean_rising = SeriesStats::from_values(&rising.values)?.mean;
            let mean_falling = SeriesStats::from_values(falling)?.mean;
            Some((rising.device_id.clone(), mean_rising, mean_falling))
        })
        .collect()
}

/// Every per-file edge delay of the devices that have both directions, ready to scatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeDelayPoints {
    pub devices: Vec<String>,
    pub rising: CategoryPoints,
    pub falling: CategoryPoints,
}

impl EdgeDelayPoints {
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rising.iter().chain(&self.falling).map(|&(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.rising.is_empty() && self.falling.is_empty()
    }
}

/// One point per stored per-file mean, so the spread across captures stays visible.
pub fn edge_delay_points(records: &EdgeDelayRecords) -> EdgeDelayPoints {
    let mut points = EdgeDelayPoints::default();
    for rising in records.rising.iter() {
        let Some(falling) = records.falling.get(&rising.device_id) else {
            continue;
        };
        if rising.values.is_empty() || falling.is_empty() {
            continue;
        }
        let idx = points.devices.len();
        points.devices.push(rising.device_id.clone());
        points.rising.extend(rising.values.iter().map(|&v| (idx, v)));
        points.falling.extend(falling.iter().map(|&v| (idx, v)));
    }
    points
}

fn print_stats_table(title: &str, stats: &[(String, SeriesStats)], precision: usize, suffix: &str) {
    println!("  {title}:");
    if stats.is_empty() {
        println!("    (no measurements)");
        return;
    }
    println!(
        "    {:<12} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "Device", "Count", "Mean", "Median", "Min", "Max"
    );
    for (device, s) in stats {
        println!(
            "    {:<12} {:>6} {:>10.p$} {:>10.p$} {:>10.p$} {:>10.p$} {}",
            device,
            s.count,
            s.mean,
            s.median,
            s.min,
            s.max,
            suffix,
            p = precision
        );
    }
}

pub fn print_clock_cycle_summary(records: &ClockCycleRecords, unit: TimeUnit) {
    println!("\n--- Clock Cycle Delay Summary ---");
    print_stats_table("Cycle delay (clock cycles)", &device_stats(&records.cycle_delays_f64()), 2, "cycles");
    print_stats_table(
        &format!("Clock-to-output propagation delay ({})", unit.suffix()),
        &device_stats(&records.propagation_delays),
        3,
        unit.suffix(),
    );
}

pub fn print_propagation_summary(records: &EdgeDelayRecords, unit: TimeUnit) {
    println!("\n--- Propagation Delay Summary ---");
    let complete = complete_edge_devices(records);
    if complete.is_empty() {
        println!("  No device has both rising and falling edge delays.");
        return;
    }
    for (device, rising, falling) in complete {
        println!("  Device {device}:");
        println!("    Average Rising Edge Delay:  {rising:.3} {}", unit.suffix());
        println!("    Average Falling Edge Delay: {falling:.3} {}", unit.suffix());
    }
}

impl ClockCycleRecords {
    /// Cycle counts widened for statistics (i64 has no lossless `Into<f64>`).
    pub fn cycle_delays_f64(&self) -> DeviceRecords<f64> {
        let mut out = DeviceRecords::new();
        for record in &self.cycle_delays {
            out.record(&record.device_id, record.values.iter().map(|&c| c as f64));
        }
        out
    }
}


// src/report.rs
