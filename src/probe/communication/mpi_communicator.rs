use mpi::environment::Universe;
use mpi::topology::{Communicator, SimpleCommunicator};
use tracing::{debug, info};

use crate::probe::communication::{Group, ProbeCommunicator};
use crate::probe::error::ProbeError;

/// Membership of this process in `MPI_COMM_WORLD`.
pub struct MpiProbeCommunicator {
    // fields drop in declaration order: the world handle goes before the universe finalizes MPI
    mpi_communicator: SimpleCommunicator,
    universe: Universe,
}

/// Communicator of all ranks that can share memory with this one, i.e. live on the same node.
pub struct MpiHostLocal {
    mpi_communicator: SimpleCommunicator,
}

impl MpiProbeCommunicator {
    /// Initializes MPI. Must be called exactly once per process and is collective over all
    /// processes of the run.
    pub fn join() -> Result<Self, ProbeError> {
        let universe = mpi::initialize().ok_or(ProbeError::Join)?;
        let mpi_communicator = universe.world();

        if mpi_communicator.rank() == 0 {
            match mpi::environment::library_version() {
                Ok(version) => debug!("MPI library: {}", version.trim_end()),
                Err(e) => debug!("MPI library version is not valid UTF-8: {e}"),
            }
        }
        if let Ok(processor) = mpi::environment::processor_name() {
            debug!("Process #{} runs on processor {processor}.", mpi_communicator.rank());
        }

        Ok(MpiProbeCommunicator {
            mpi_communicator,
            universe,
        })
    }

    /// Finalizes MPI. Collective, every process has to get here. rsmpi gives no feedback on a
    /// failing `MPI_Finalize`, so leaving counts as done once this returns.
    pub fn leave(self) {
        let MpiProbeCommunicator {
            mpi_communicator,
            universe,
        } = self;
        let rank = mpi_communicator.rank();
        drop(mpi_communicator);

        info!("Process #{rank} finalizing.");
        drop(universe);
    }
}

impl Group for MpiProbeCommunicator {
    fn rank(&self) -> u32 {
        self.mpi_communicator.rank() as u32
    }

    fn size(&self) -> u32 {
        self.mpi_communicator.size() as u32
    }
}

impl ProbeCommunicator for MpiProbeCommunicator {
    type HostLocal = MpiHostLocal;

    fn split_host_local(&self) -> MpiHostLocal {
        // key 0 for everybody: ties are broken by the rank in the world communicator
        MpiHostLocal {
            mpi_communicator: self.mpi_communicator.split_shared(0),
        }
    }
}

impl Group for MpiHostLocal {
    fn rank(&self) -> u32 {
        self.mpi_communicator.rank() as u32
    }

    fn size(&self) -> u32 {
        self.mpi_communicator.size() as u32
    }
}
