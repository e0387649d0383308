use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, sleep, JoinHandle};
use std::time::Duration;

use nohash_hasher::IntMap;
use tracing::{debug, error, info};

use crate::probe::communication::local_communicator::ChannelProbeCommunicator;
use crate::probe::communication::{Group, ProbeCommunicator};
use crate::probe::config::ProbeConfig;
use crate::probe::error::ProbeError;
use crate::probe::report::Report;

#[cfg(feature = "mpi")]
use crate::probe::communication::mpi_communicator::MpiProbeCommunicator;
#[cfg(feature = "mpi")]
use crate::probe::logging;

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs the probe of this process in an MPI launch: join, report to stdout, idle, leave.
#[cfg(feature = "mpi")]
pub fn run_mpi() -> Result<Report, ProbeError> {
    run_mpi_into(&ProbeConfig::default(), &mut std::io::stdout().lock())
}

/// [`run_mpi`] with the report going to `out`. Nothing is written if joining fails.
#[cfg(feature = "mpi")]
pub fn run_mpi_into<W: Write>(
    config: &ProbeConfig,
    out: &mut W,
) -> Result<Report, ProbeError> {
    let _guard = logging::init_logging(config);

    let comm = MpiProbeCommunicator::join().inspect_err(|e| error!("{e}"))?;
    info!("Process #{} of {} joined.", comm.rank(), comm.size());

    let result = {
        let span = tracing::info_span!("probe", rank = comm.rank(), size = comm.size());
        let _entered = span.enter();
        execute_probe(&comm, config, out)
    };

    comm.leave();
    result
}

/// Process exit status for the outcome of a probe run.
pub fn exit_code(result: &Result<Report, ProbeError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Runs one probe per entry of `placement` as threads of this process. Returns what each rank
/// wrote, keyed by global rank.
pub fn run_channel<S: AsRef<str>>(
    placement: &[S],
    config: &ProbeConfig,
) -> Result<IntMap<u32, String>, ProbeError> {
    info!("Starting {} probes on channel communicators.", placement.len());
    let comms = ChannelProbeCommunicator::create_n_2_n(placement);

    let handles: IntMap<u32, JoinHandle<Result<String, ProbeError>>> = comms
        .into_iter()
        .map(|comm| {
            let config = config.clone();
            let rank = comm.rank();
            thread::Builder::new()
                .name(rank.to_string())
                .spawn(move || {
                    execute_channel_member(comm, |comm, out| execute_probe(comm, &config, out))
                })
                .map(|handle| (rank, handle))
                .map_err(ProbeError::Spawn)
        })
        .collect::<Result<_, _>>()?;

    try_join(handles)
}

/// Runs `probe` between the collective join and leave barriers. A panicking probe still arrives
/// at the leave barrier before the panic is passed on, so the other members are not stuck.
fn execute_channel_member<F>(
    comm: ChannelProbeCommunicator,
    probe: F,
) -> Result<String, ProbeError>
where
    F: FnOnce(&ChannelProbeCommunicator, &mut Vec<u8>) -> Result<Report, ProbeError>,
{
    comm.barrier();
    let mut out = Vec::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| probe(&comm, &mut out)));
    comm.barrier();

    match result {
        Ok(result) => result.map(|_| String::from_utf8_lossy(&out).into_owned()),
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// The probe sequence between joining and leaving the group: read the group metadata, emit the
/// report and idle. A failed write still idles, so that this member does not leave before the
/// others.
pub fn execute_probe<C, W>(
    comm: &C,
    config: &ProbeConfig,
    out: &mut W,
) -> Result<Report, ProbeError>
where
    C: ProbeCommunicator,
    W: Write,
{
    let world_size = comm.size();
    let global_rank = comm.rank();

    let local_rank = {
        let host_local = comm.split_host_local();
        debug!(
            "Process #{global_rank} is #{} of {} on its host.",
            host_local.rank(),
            host_local.size()
        );
        host_local.rank()
    };

    let report = Report {
        global_rank,
        world_size,
        local_rank,
        hostname: comm.host_name(),
        idle: config.idle,
    };

    let emitted = report.emit(out);
    if let Err(e) = &emitted {
        error!("Process #{global_rank} could not write its report: {e}");
    }

    info!("Process #{global_rank} idling for {:?}.", config.idle);
    sleep(config.idle);
    info!("Process #{global_rank} finished idling.");

    emitted?;
    Ok(report)
}

/// Joins the handles as they finish, so that a panic in any thread is reported right away and
/// not only once the threads before it are done.
fn try_join(
    mut handles: IntMap<u32, JoinHandle<Result<String, ProbeError>>>,
) -> Result<IntMap<u32, String>, ProbeError> {
    let mut outputs = IntMap::default();
    while !handles.is_empty() {
        let finished: Vec<u32> = handles
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(rank, _)| *rank)
            .collect();

        if finished.is_empty() {
            sleep(JOIN_POLL_INTERVAL);
        }

        for rank in finished {
            if let Some(handle) = handles.remove(&rank) {
                let output = handle
                    .join()
                    .map_err(|_| ProbeError::ProbeThread(rank))??;
                outputs.insert(rank, output);
            }
        }
    }
    Ok(outputs)
}
