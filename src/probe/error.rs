use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// `MPI_Init` did not hand out a universe. rsmpi returns `None` if MPI is already
    /// initialized, while a runtime that cannot start at all aborts the process by itself.
    #[error("could not join the global group: MPI is already initialized")]
    Join,

    #[error("failed to write the report line")]
    Report(#[from] io::Error),

    #[error("failed to spawn probe thread")]
    Spawn(#[source] io::Error),

    #[error("probe thread for rank {0} panicked")]
    ProbeThread(u32),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseReportError {
    #[error("line does not start with 'Hello from rank '")]
    MissingPrefix,

    #[error("line does not end with 'Sleeping for <n>s.'")]
    MissingSuffix,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}
