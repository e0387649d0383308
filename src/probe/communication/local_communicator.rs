use std::sync::{Arc, Barrier};

use tracing::debug;

use crate::probe::communication::{Group, ProbeCommunicator};
use crate::probe::hostname::{truncate_host_name, HOST_NAME_MAX};

/// Single member world, for running a probe without any launcher.
pub struct DummyProbeCommunicator();

/// One member of a group that lives in threads of the current process. The placement of members
/// onto hosts is simulated, which makes multi host runs reproducible in tests.
pub struct ChannelProbeCommunicator {
    rank: u32,
    size: u32,
    host: String,
    local: LocalGroup,
    barrier: Arc<Barrier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalGroup {
    rank: u32,
    size: u32,
}

impl Group for DummyProbeCommunicator {
    fn rank(&self) -> u32 {
        0
    }

    fn size(&self) -> u32 {
        1
    }
}

impl ProbeCommunicator for DummyProbeCommunicator {
    type HostLocal = LocalGroup;

    fn split_host_local(&self) -> LocalGroup {
        LocalGroup { rank: 0, size: 1 }
    }
}

impl Group for LocalGroup {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.size
    }
}

impl ChannelProbeCommunicator {
    /// Creates one communicator per entry of `placement`, which names the host of each global
    /// rank. Members on the same host are numbered in the order of their global ranks.
    pub fn create_n_2_n<S: AsRef<str>>(placement: &[S]) -> Vec<ChannelProbeCommunicator> {
        let hosts: Vec<&str> = placement.iter().map(|host| host.as_ref()).collect();
        let size = hosts.len() as u32;
        let barrier = Arc::new(Barrier::new(hosts.len()));

        hosts
            .iter()
            .enumerate()
            .map(|(rank, &host)| {
                let local_rank = hosts[..rank].iter().filter(|&&other| other == host).count();
                let local_size = hosts.iter().filter(|&&other| other == host).count();

                ChannelProbeCommunicator {
                    rank: rank as u32,
                    size,
                    host: truncate_host_name(host, HOST_NAME_MAX),
                    local: LocalGroup {
                        rank: local_rank as u32,
                        size: local_size as u32,
                    },
                    barrier: barrier.clone(),
                }
            })
            .collect()
    }

    /// Blocks until every member of the group has arrived. Stands in for the collective
    /// init and finalize calls of a real runtime.
    pub fn barrier(&self) {
        debug!("#{} at barrier.", self.rank);
        self.barrier.wait();
    }
}

impl Group for ChannelProbeCommunicator {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.size
    }
}

impl ProbeCommunicator for ChannelProbeCommunicator {
    type HostLocal = LocalGroup;

    fn split_host_local(&self) -> LocalGroup {
        self.local
    }

    fn host_name(&self) -> String {
        self.host.clone()
    }
}
