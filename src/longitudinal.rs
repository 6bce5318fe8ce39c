//! Reader for the textual longitudinal output file (`DATnnnnnn.long`).
//!
//! With the `LONGI` keyword CORSIKA writes, per shower, a particle-number
//! table and an energy-deposit table over atmospheric depth, optionally
//! followed by the parameters of a fit to the charged-particle profile.
//! [`read_longitudinal_distributions`] iterates over the showers of such
//! a file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{Error, Result};

const PARTICLE_HEADER: &str = "LONGITUDINAL DISTRIBUTION IN";
const ENERGY_HEADER: &str = "LONGITUDINAL ENERGY DEPOSIT IN";

/// One row of the particle-number table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleDistributionRow {
    /// Atmospheric depth in g/cm² (slant or vertical, per the header).
    pub depth: f32,
    pub gammas: f32,
    pub positrons: f32,
    pub electrons: f32,
    pub mu_plus: f32,
    pub mu_minus: f32,
    pub hadrons: f32,
    pub charged: f32,
    pub nuclei: f32,
    pub cherenkov: f32,
}

/// One row of the energy-deposit table, in GeV per depth step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyDepositRow {
    /// Atmospheric depth in g/cm² at the end of the step.
    pub depth: f32,
    pub gamma: f32,
    pub em_ionization: f32,
    pub em_cut: f32,
    pub mu_ionization: f32,
    pub mu_cut: f32,
    pub hadron_ionization: f32,
    pub hadron_cut: f32,
    pub neutrino: f32,
    pub sum: f32,
}

/// Parameters of the fit CORSIKA performs on the charged-particle
/// profile, see [`longitudinal_fit_function`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongitudinalFit {
    /// `n_max`, `depth_0`, `depth_max`, `a`, `b`, `c`.
    pub parameters: [f32; 6],
    pub chi2_ndf: f32,
    pub average_deviation: f32,
}

/// Longitudinal tables of one air shower.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongitudinalProfile {
    /// Shower number within the run, starting at 1.
    pub shower: u32,
    /// Number of depth steps in each table.
    pub n_steps: usize,
    /// `true` for slant depth steps, `false` for vertical.
    pub slant: bool,
    /// Width of one depth step in g/cm².
    pub step_width: f32,
    pub particles: Vec<ParticleDistributionRow>,
    pub energy_deposit: Vec<EnergyDepositRow>,
    /// Present if the file contains the fit section for this shower.
    pub fit: Option<LongitudinalFit>,
}

/// The function CORSIKA fits to the charged-particle profile.
///
/// The six parameters are stored per event in the `EVTE` block as
/// `longitudinal_fit_parameters` when the corresponding `LONGI` options
/// are set, and per shower in the `.long` file.
pub fn longitudinal_fit_function(depth: f32, parameters: &[f32; 6]) -> f32 {
    let [n_max, depth_0, depth_max, a, b, c] = *parameters;
    let denominator = a + b * depth + c * depth * depth;
    let exponent = (depth_max - depth_0) / denominator;
    let power = ((depth - depth_0) / (depth_max - depth_0)).powf(exponent);
    n_max * power * ((depth_max - depth) / denominator).exp()
}

/// Iterate over the showers of a longitudinal output file.
///
/// # Example
///
/// ```no_run
/// use corsikaio::Result;
///
/// fn main() -> Result<()> {
///     for profile in corsikaio::read_longitudinal_distributions("DAT000001.long")? {
///         let profile = profile?;
///         println!("shower {}: {} steps", profile.shower, profile.n_steps);
///     }
///     Ok(())
/// }
/// ```
pub fn read_longitudinal_distributions<P: AsRef<Path>>(
    path: P,
) -> Result<LongitudinalReader<BufReader<File>>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(LongitudinalReader::new(reader))
}

/// Streaming reader over the showers of a longitudinal file.
#[derive(Debug)]
pub struct LongitudinalReader<R> {
    reader: R,
    first: bool,
    failed: bool,
}

impl<R: BufRead> LongitudinalReader<R> {
    /// Read longitudinal profiles from any buffered source.
    pub fn new(reader: R) -> Self {
        LongitudinalReader {
            reader,
            first: true,
            failed: false,
        }
    }

    /// Next line with the trailing newline removed, `None` at EOF.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn require_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?.ok_or_else(|| {
            Error::LongitudinalFormat(format!("unexpected end of file, expected {what}"))
        })
    }

    fn next_profile(&mut self) -> Result<Option<LongitudinalProfile>> {
        let line = match self.next_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        // a trailing blank line ends the file
        if line.trim().is_empty() && !self.first {
            return Ok(None);
        }

        let header = parse_table_header(&line, PARTICLE_HEADER).map_err(|e| {
            if self.first {
                Error::LongitudinalFormat(
                    "input does not look like a longitudinal output file".into(),
                )
            } else {
                e
            }
        })?;
        self.first = false;

        // column names
        self.require_line("particle column names")?;
        let mut particles = Vec::with_capacity(header.n_steps);
        for _ in 0..header.n_steps {
            let row = self.require_line("particle table row")?;
            let v = parse_row(&row)?;
            particles.push(ParticleDistributionRow {
                depth: v[0],
                gammas: v[1],
                positrons: v[2],
                electrons: v[3],
                mu_plus: v[4],
                mu_minus: v[5],
                hadrons: v[6],
                charged: v[7],
                nuclei: v[8],
                cherenkov: v[9],
            });
        }

        let line = self.require_line("energy deposit header")?;
        let energy_header = parse_table_header(&line, ENERGY_HEADER)?;
        self.require_line("energy deposit column names")?;
        let mut energy_deposit = Vec::with_capacity(energy_header.n_steps);
        for _ in 0..energy_header.n_steps {
            let row = self.require_line("energy deposit table row")?;
            let v = parse_row(&row)?;
            energy_deposit.push(EnergyDepositRow {
                depth: v[0],
                gamma: v[1],
                em_ionization: v[2],
                em_cut: v[3],
                mu_ionization: v[4],
                mu_cut: v[5],
                hadron_ionization: v[6],
                hadron_cut: v[7],
                neutrino: v[8],
                sum: v[9],
            });
        }

        // either the fit section or a separator line follows
        let fit = match self.next_line()? {
            Some(line) if line.trim_start().starts_with("FIT") => {
                self.require_line("fit function line")?;
                let parameters = parse_assignment(&self.require_line("fit parameters")?)?;
                let parameters: [f32; 6] = parameters.try_into().map_err(|v: Vec<f32>| {
                    Error::LongitudinalFormat(format!(
                        "expected 6 fit parameters, got {}",
                        v.len()
                    ))
                })?;
                let chi2_ndf = parse_assignment(&self.require_line("chi2/ndf")?)?;
                let average_deviation =
                    parse_assignment(&self.require_line("average deviation")?)?;
                let fit = LongitudinalFit {
                    parameters,
                    chi2_ndf: single(chi2_ndf, "chi2/ndf")?,
                    average_deviation: single(average_deviation, "average deviation")?,
                };
                self.next_line()?;
                Some(fit)
            }
            _ => {
                self.next_line()?;
                None
            }
        };

        Ok(Some(LongitudinalProfile {
            shower: header.shower,
            n_steps: header.n_steps,
            slant: header.slant,
            step_width: header.step_width,
            particles,
            energy_deposit,
            fit,
        }))
    }
}

impl<R: BufRead> Iterator for LongitudinalReader<R> {
    type Item = Result<LongitudinalProfile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_profile() {
            Ok(Some(profile)) => Some(Ok(profile)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

struct TableHeader {
    n_steps: usize,
    slant: bool,
    step_width: f32,
    shower: u32,
}

/// Parse a table header line such as
/// ` LONGITUDINAL DISTRIBUTION IN  139 VERTICAL STEPS OF  10. G/CM**2 FOR SHOWER    1`.
fn parse_table_header(line: &str, prefix: &str) -> Result<TableHeader> {
    let bad = || Error::LongitudinalFormat(format!("expected header line, got: {}", line.trim()));
    let rest = line.trim_start().strip_prefix(prefix).ok_or_else(bad)?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    // <n> SLANT|VERTICAL STEPS OF <width> G/CM**2 FOR SHOWER <id>
    if tokens.len() != 9 || tokens[2] != "STEPS" || tokens[3] != "OF" || tokens[7] != "SHOWER" {
        return Err(bad());
    }
    let slant = match tokens[1] {
        "SLANT" => true,
        "VERTICAL" => false,
        _ => return Err(bad()),
    };
    Ok(TableHeader {
        n_steps: tokens[0].parse().map_err(|_| bad())?,
        slant,
        step_width: tokens[4].parse().map_err(|_| bad())?,
        shower: tokens[8].parse().map_err(|_| bad())?,
    })
}

/// Parse one fixed-width table row of ten floats.
fn parse_row(line: &str) -> Result<[f32; 10]> {
    let mut values = [0.0f32; 10];
    let mut tokens = line.split_whitespace();
    for (i, slot) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            Error::LongitudinalFormat(format!("expected 10 columns, got {}: {}", i, line.trim()))
        })?;
        *slot = token.parse().map_err(|_| {
            Error::LongitudinalFormat(format!("invalid number {token:?} in row: {}", line.trim()))
        })?;
    }
    Ok(values)
}

/// Parse the values right of the first ` = ` in a fit line.
fn parse_assignment(line: &str) -> Result<Vec<f32>> {
    let (_, rhs) = line.split_once(" = ").ok_or_else(|| {
        Error::LongitudinalFormat(format!("expected an assignment line, got: {}", line.trim()))
    })?;
    rhs.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| {
                Error::LongitudinalFormat(format!("invalid number {token:?} in: {}", line.trim()))
            })
        })
        .collect()
}

fn single(values: Vec<f32>, what: &str) -> Result<f32> {
    if values.len() != 1 {
        return Err(Error::LongitudinalFormat(format!(
            "expected a single value for {what}, got {}",
            values.len()
        )));
    }
    Ok(values[0])
}
