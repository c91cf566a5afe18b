//! Problem description parser
//!
//! Text format, whitespace separated:
//!
//! ```text
//! D I S V F
//! B E street-name L      (S lines)
//! P name-1 ... name-P    (V lines)
//! ```

use anyhow::{anyhow, ensure, Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::simulation::{CarRecord, NodeId, Parameters, StreetRecord};

/// A parsed problem: parameters, streets and car routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub parameters: Parameters,
    pub streets: Vec<StreetRecord>,
    pub cars: Vec<CarRecord>,
}

impl Problem {
    pub fn parse(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (line_no, header) = lines.next().context("Problem description is empty")?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        ensure!(
            fields.len() == 5,
            "Line {}: expected 5 header fields (D I S V F), found {}",
            line_no,
            fields.len()
        );
        let parameters = Parameters {
            duration: parse_field(fields[0], "duration", line_no)?,
            intersection_count: parse_field(fields[1], "intersection count", line_no)?,
            street_count: parse_field(fields[2], "street count", line_no)?,
            car_count: parse_field(fields[3], "car count", line_no)?,
            bonus: parse_field(fields[4], "bonus", line_no)?,
        };

        let mut streets = Vec::with_capacity(parameters.street_count);
        for index in 0..parameters.street_count {
            let (line_no, line) = lines.next().with_context(|| {
                format!(
                    "Expected {} streets, found only {}",
                    parameters.street_count, index
                )
            })?;
            streets.push(parse_street(line, line_no)?);
        }

        let mut cars = Vec::with_capacity(parameters.car_count);
        for index in 0..parameters.car_count {
            let (line_no, line) = lines.next().with_context(|| {
                format!("Expected {} cars, found only {}", parameters.car_count, index)
            })?;
            cars.push(parse_car(line, line_no)?);
        }

        if let Some((line_no, _)) = lines.next() {
            return Err(anyhow!(
                "Line {}: unexpected record after {} streets and {} cars",
                line_no,
                parameters.street_count,
                parameters.car_count
            ));
        }

        Ok(Self {
            parameters,
            streets,
            cars,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("Failed to read problem file {}", path.display()))?;
        Self::parse(&input).with_context(|| format!("Failed to parse problem file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write problem file {}", path.display()))
    }

    /// Copy of the problem without streets that no route uses
    pub fn without_unused_streets(&self) -> Self {
        let used: HashSet<&str> = self
            .cars
            .iter()
            .flat_map(|car| car.route.iter().map(String::as_str))
            .collect();

        let streets: Vec<StreetRecord> = self
            .streets
            .iter()
            .filter(|street| used.contains(street.name.as_str()))
            .cloned()
            .collect();

        Self {
            parameters: Parameters {
                street_count: streets.len(),
                ..self.parameters
            },
            streets,
            cars: self.cars.clone(),
        }
    }
}

impl FromStr for Problem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.parameters;
        writeln!(
            f,
            "{} {} {} {} {}",
            p.duration,
            p.intersection_count,
            self.streets.len(),
            self.cars.len(),
            p.bonus
        )?;
        for street in &self.streets {
            writeln!(
                f,
                "{} {} {} {}",
                street.start.0, street.end.0, street.name, street.length
            )?;
        }
        for car in &self.cars {
            writeln!(f, "{} {}", car.route.len(), car.route.join(" "))?;
        }
        Ok(())
    }
}

fn parse_field<T>(token: &str, what: &str, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    token
        .parse()
        .with_context(|| format!("Line {}: invalid {} '{}'", line_no, what, token))
}

fn parse_street(line: &str, line_no: usize) -> Result<StreetRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    ensure!(
        fields.len() == 4,
        "Line {}: expected 4 street fields (B E name L), found {}",
        line_no,
        fields.len()
    );
    Ok(StreetRecord {
        start: NodeId(parse_field(fields[0], "start node", line_no)?),
        end: NodeId(parse_field(fields[1], "end node", line_no)?),
        name: fields[2].to_string(),
        length: parse_field(fields[3], "street length", line_no)?,
    })
}

fn parse_car(line: &str, line_no: usize) -> Result<CarRecord> {
    let mut fields = line.split_whitespace();
    let count: usize = parse_field(
        fields.next().unwrap_or_default(),
        "route length",
        line_no,
    )?;
    let route: Vec<String> = fields.map(str::to_string).collect();
    ensure!(count >= 1, "Line {}: car route is empty", line_no);
    ensure!(
        route.len() == count,
        "Line {}: route announces {} streets but lists {}",
        line_no,
        count,
        route.len()
    );
    Ok(CarRecord { route })
}
