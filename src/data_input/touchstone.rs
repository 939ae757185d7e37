// src/data_input/touchstone.rs

// Minimal Touchstone v1 reader for one-port (.s1p) network data.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use num_complex::Complex64;

use crate::constants::TOUCHSTONE_DEFAULT_Z0_OHMS;
use crate::error::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    GHz,
}

impl FrequencyUnit {
    pub fn to_hz(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
        }
    }
}

/// Pair encoding of each complex parameter on a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Magnitude, angle in degrees
    MagnitudeAngle,
    /// dB magnitude, angle in degrees
    DecibelAngle,
    /// Real, imaginary
    RealImaginary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionLine {
    pub frequency_unit: FrequencyUnit,
    pub format: DataFormat,
    pub reference_ohms: f64,
}

impl Default for OptionLine {
    fn default() -> Self {
        Self {
            frequency_unit: FrequencyUnit::GHz,
            format: DataFormat::MagnitudeAngle,
            reference_ohms: TOUCHSTONE_DEFAULT_Z0_OHMS,
        }
    }
}

/// One-port network: reflection coefficient S11 against frequency.
#[derive(Debug, Clone)]
pub struct OnePortNetwork {
    pub options: OptionLine,
    pub frequency_hz: Vec<f64>,
    pub s11: Vec<Complex64>,
}

impl OnePortNetwork {
    /// |S11| in dB per frequency point. Zero magnitude maps to negative infinity.
    pub fn s11_db(&self) -> Vec<(f64, f64)> {
        self.frequency_hz
            .iter()
            .zip(&self.s11)
            .map(|(&f, s)| (f, 20.0 * s.norm().log10()))
            .collect()
    }
}

pub fn read_s1p_file(path: &Path) -> AnalysisResult<OnePortNetwork> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_s1p(BufReader::new(file), path)
}

pub fn parse_s1p<R: BufRead>(reader: R, source: &Path) -> AnalysisResult<OnePortNetwork> {
    let fail = |line: usize, reason: String| AnalysisError::Touchstone {
        path: source.to_path_buf(),
        line,
        reason,
    };

    let mut options: Option<OptionLine> = None;
    let mut frequency_hz = Vec::new();
    let mut s11 = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let raw = line_result.map_err(|e| AnalysisError::io(source, e))?;
        let content = raw.split('!').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        if let Some(rest) = content.strip_prefix('#') {
            // Only the first option line counts.
            if options.is_none() {
                options = Some(parse_option_line(rest).map_err(|reason| fail(line_no, reason))?);
            }
            continue;
        }

        let opts = options.unwrap_or_default();
        let fields: Vec<f64> = content
            .split_whitespace()
            .map(|tok| tok.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| fail(line_no, format!("non-numeric field: {e}")))?;
        if fields.len() != 3 {
            return Err(fail(
                line_no,
                format!("expected 3 fields for a one-port row, found {}", fields.len()),
            ));
        }

        let freq = fields[0] * opts.frequency_unit.to_hz();
        if let Some(&prev) = frequency_hz.last() {
            if freq <= prev {
                return Err(fail(line_no, "frequencies must be strictly increasing".to_string()));
            }
        }
        frequency_hz.push(freq);
        s11.push(to_complex(opts.format, fields[1], fields[2]));
    }

    if frequency_hz.is_empty() {
        return Err(fail(0, "no network data".to_string()));
    }

    Ok(OnePortNetwork {
        options: options.unwrap_or_default(),
        frequency_hz,
        s11,
    })
}

fn to_complex(format: DataFormat, a: f64, b: f64) -> Complex64 {
    match format {
        DataFormat::RealImaginary => Complex64::new(a, b),
        DataFormat::MagnitudeAngle => Complex64::from_polar(a, b.to_radians()),
        DataFormat::DecibelAngle => Complex64::from_polar(10f64.powf(a / 20.0), b.to_radians()),
    }
}

/// Parses the tokens after `#`: frequency unit, parameter, format and `R <ohms>` in any order.
fn parse_option_line(rest: &str) -> Result<OptionLine, String> {
    let mut opts = OptionLine::default();
    let mut tokens = rest.split_whitespace();
    while let Some(tok) = tokens.next() {
        match tok.to_ascii_uppercase().as_str() {
            "HZ" => opts.frequency_unit = FrequencyUnit::Hz,
            "KHZ" => opts.frequency_unit = FrequencyUnit::KHz,
            "MHZ" => opts.frequency_unit = FrequencyUnit::MHz,
            "GHZ" => opts.frequency_unit = FrequencyUnit::GHz,
            "S" => {}
            "Y" | "Z" | "H" | "G" => {
                return Err(format!("unsupported parameter type '{tok}', only S is handled"));
            }
            "MA" => opts.format = DataFormat::MagnitudeAngle,
            "DB" => opts.format = DataFormat::DecibelAngle,
            "RI" => opts.format = DataFormat::RealImaginary,
            "R" => {
                let value = tokens
                    .next()
                    .ok_or_else(|| "missing reference impedance after R".to_string())?;
                opts.reference_ohms = value
                    .parse::<f64>()
                    .map_err(|e| format!("bad reference impedance '{value}': {e}"))?;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> AnalysisResult<OnePortNetwork> {
        parse_s1p(Cursor::new(text.as_bytes()), Path::new("mem.s1p"))
    }

    #[test]
    fn db_format_passes_magnitude_through() {
        let net = parse("! VNA export\n# MHz S DB R 50\n100 -12.5 45\n200 -20.0 -30 ! trailing\n").unwrap();
        assert_eq!(net.options.frequency_unit, FrequencyUnit::MHz);
        let db = net.s11_db();
        assert_eq!(db.len(), 2);
        assert!((db[0].0 - 100e6).abs() < 1e-3);
        assert!((db[0].1 + 12.5).abs() < 1e-9);
        assert!((db[1].1 + 20.0).abs() < 1e-9);
    }

    #[test]
    fn ri_and_ma_convert_to_db() {
        let ri = parse("# HZ S RI R 50\n1 0.6 0.8\n").unwrap();
        assert!(ri.s11_db()[0].1.abs() < 1e-9); // |0.6 + 0.8j| = 1
        let ma = parse("# GHZ S MA R 75\n1.5 0.1 90\n").unwrap();
        assert_eq!(ma.options.reference_ohms, 75.0);
        assert!((ma.s11_db()[0].1 + 20.0).abs() < 1e-9);
        assert!((ma.frequency_hz[0] - 1.5e9).abs() < 1.0);
    }

    #[test]
    fn defaults_apply_without_option_line() {
        let net = parse("2 0.5 0\n").unwrap();
        assert_eq!(net.options, OptionLine::default());
        assert!((net.frequency_hz[0] - 2e9).abs() < 1.0);
    }

    #[test]
    fn malformed_rows_report_line_numbers() {
        match parse("# HZ S DB R 50\n1 -3 0\n2 -3\n") {
            Err(AnalysisError::Touchstone { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(parse("# HZ Z DB R 50\n1 -3 0\n").is_err());
        assert!(parse("! only comments\n").is_err());
        assert!(parse("# HZ S DB\n2 -3 0\n1 -3 0\n").is_err());
    }
}
