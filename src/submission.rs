//! Schedule submission format
//!
//! ```text
//! A                       number of scheduled intersections
//! i                       node id
//! E                       number of phases
//! street-name duration    (E lines, in phase order)
//! ```

use anyhow::{bail, ensure, Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::simulation::{NodeId, Tick};

/// The schedule of one intersection, by street name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionSchedule {
    pub node: NodeId,
    /// (street name, green duration) in phase order
    pub phases: Vec<(String, Tick)>,
}

/// Schedules for every scheduled intersection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub intersections: Vec<IntersectionSchedule>,
}

impl Submission {
    pub fn parse(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let count = next_number(&mut lines, "intersection count")?;
        let mut intersections = Vec::with_capacity(count);
        for _ in 0..count {
            let node = NodeId(next_number(&mut lines, "intersection id")?);
            let phase_count = next_number(&mut lines, "phase count")?;
            let mut phases = Vec::with_capacity(phase_count);
            for _ in 0..phase_count {
                let (line_no, line) = lines
                    .next()
                    .with_context(|| format!("Intersection {:?}: missing phases", node))?;
                let fields: Vec<&str> = line.split_whitespace().collect();
                ensure!(
                    fields.len() == 2,
                    "Line {}: expected 'street-name duration', found '{}'",
                    line_no,
                    line
                );
                let duration: Tick = fields[1]
                    .parse()
                    .with_context(|| format!("Line {}: invalid duration '{}'", line_no, fields[1]))?;
                phases.push((fields[0].to_string(), duration));
            }
            intersections.push(IntersectionSchedule { node, phases });
        }

        if let Some((line_no, _)) = lines.next() {
            bail!(
                "Line {}: unexpected content after {} intersections",
                line_no,
                count
            );
        }

        Ok(Self { intersections })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("Failed to read submission {}", path.display()))?;
        Self::parse(&input).with_context(|| format!("Failed to parse submission {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write submission {}", path.display()))
    }
}

fn next_number<'a, I>(lines: &mut I, what: &str) -> Result<usize>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line_no, line) = lines
        .next()
        .with_context(|| format!("Unexpected end of submission, expected {}", what))?;
    line.parse()
        .with_context(|| format!("Line {}: invalid {} '{}'", line_no, what, line))
}

impl FromStr for Submission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.intersections.len())?;
        for intersection in &self.intersections {
            writeln!(f, "{}", intersection.node.0)?;
            writeln!(f, "{}", intersection.phases.len())?;
            for (name, duration) in &intersection.phases {
                writeln!(f, "{} {}", name, duration)?;
            }
        }
        Ok(())
    }
}
