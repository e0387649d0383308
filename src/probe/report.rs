use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use crate::probe::error::ParseReportError;

const PREFIX: &str = "Hello from rank ";
const WORLD_SEPARATOR: &str = " of ";
const LOCAL_SEPARATOR: &str = ", local rank ";
const HOST_SEPARATOR: &str = " on host ";
const IDLE_SEPARATOR: &str = ". Sleeping for ";
const SUFFIX: &str = "s.";

/// What a single probe knows about its place in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub global_rank: u32,
    pub world_size: u32,
    pub local_rank: u32,
    pub hostname: String,
    pub idle: Duration,
}

impl Report {
    /// Writes the report as one line and flushes, so that the line is out before the process
    /// starts to idle.
    pub fn emit<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{self}")?;
        out.flush()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{}{WORLD_SEPARATOR}{}{LOCAL_SEPARATOR}{}{HOST_SEPARATOR}{}{IDLE_SEPARATOR}{}{SUFFIX}",
            self.global_rank,
            self.world_size,
            self.local_rank,
            self.hostname,
            self.idle.as_secs()
        )
    }
}

impl FromStr for Report {
    type Err = ParseReportError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let rest = line
            .strip_prefix(PREFIX)
            .ok_or(ParseReportError::MissingPrefix)?;
        let rest = rest
            .strip_suffix(SUFFIX)
            .ok_or(ParseReportError::MissingSuffix)?;

        // the host name is the only free text, so everything after it is split off from the right
        let (rest, idle) = rest
            .rsplit_once(IDLE_SEPARATOR)
            .ok_or(ParseReportError::MissingSuffix)?;
        let (global_rank, rest) = rest
            .split_once(WORLD_SEPARATOR)
            .ok_or(ParseReportError::MissingField("world size"))?;
        let (world_size, rest) = rest
            .split_once(LOCAL_SEPARATOR)
            .ok_or(ParseReportError::MissingField("local rank"))?;
        let (local_rank, hostname) = rest
            .split_once(HOST_SEPARATOR)
            .ok_or(ParseReportError::MissingField("host"))?;

        Ok(Report {
            global_rank: parse_number("global rank", global_rank)?,
            world_size: parse_number("world size", world_size)?,
            local_rank: parse_number("local rank", local_rank)?,
            hostname: hostname.to_string(),
            idle: Duration::from_secs(parse_number("idle", idle)?),
        })
    }
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ParseReportError> {
    value
        .parse()
        .map_err(|_| ParseReportError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
