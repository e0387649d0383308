use crate::probe::hostname;

pub mod local_communicator;

#[cfg(feature = "mpi")]
pub mod mpi_communicator;

/// A handle on a group of cooperating processes.
pub trait Group {
    fn rank(&self) -> u32;

    fn size(&self) -> u32;
}

/// Membership in the global group of a run. Whoever owns it joined the group, and dropping or
/// consuming it leaves the group again.
pub trait ProbeCommunicator: Group {
    type HostLocal: Group;

    /// Derives the subgroup of all members that share this member's host. The subgroup is a
    /// separate resource and is released when the returned handle is dropped.
    fn split_host_local(&self) -> Self::HostLocal;

    /// Name of the host this member runs on.
    fn host_name(&self) -> String {
        hostname::read_hostname()
    }
}
