use std::collections::BTreeSet;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use hello_mpi::probe::communication::local_communicator::DummyProbeCommunicator;
use hello_mpi::probe::communication::ProbeCommunicator;
use hello_mpi::probe::config::ProbeConfig;
use hello_mpi::probe::controller::{execute_probe, run_channel};
use hello_mpi::probe::hostname::{read_hostname, HOST_NAME_MAX};
use hello_mpi::probe::report::Report;
use nohash_hasher::IntMap;

use crate::report_test_utils::assert_rank_sets;


fn quick_config() -> ProbeConfig {
    ProbeConfig::default().with_idle(Duration::ZERO)
}

fn parse_outputs(outputs: &IntMap<u32, String>) -> Vec<Report> {
    outputs
        .values()
        .map(|output| {
            assert_eq!(1, output.lines().count(), "expected one line, got {output:?}");
            output.parse().unwrap()
        })
        .collect()
}

#[test]
fn single_process_on_one_host() {
    let outputs = run_channel(&["node-a"], &quick_config()).unwrap();

    assert_eq!(1, outputs.len());
    assert_eq!(
        "Hello from rank 0 of 1, local rank 0 on host node-a. Sleeping for 0s.\n",
        outputs[&0]
    );
}

#[test]
fn four_processes_on_two_hosts() {
    let placement = ["node-a", "node-a", "node-b", "node-b"];
    let outputs = run_channel(&placement, &quick_config()).unwrap();
    let reports = parse_outputs(&outputs);

    assert_eq!(4, reports.len());
    assert_rank_sets(&reports);
    for host in ["node-a", "node-b"] {
        let local: BTreeSet<u32> = reports
            .iter()
            .filter(|r| r.hostname == host)
            .map(|r| r.local_rank)
            .collect();
        assert_eq!(BTreeSet::from([0, 1]), local);
    }
}

#[test]
fn round_robin_placement_on_uneven_hosts() {
    let placement = ["x", "y", "x", "z", "x", "y", "x"];
    let outputs = run_channel(&placement, &quick_config()).unwrap();
    let reports = parse_outputs(&outputs);

    assert_eq!(7, reports.len());
    assert_rank_sets(&reports);
}

#[test]
fn channel_members_idle_for_configured_time() {
    let config = ProbeConfig::default().with_idle(Duration::from_millis(50));

    let start = Instant::now();
    let outputs = run_channel(&["a", "b"], &config).unwrap();

    assert_eq!(2, outputs.len());
    assert!(start.elapsed() >= Duration::from_millis(50));
}

/// Remembers when the report line was flushed.
struct TimestampWriter {
    buf: Vec<u8>,
    flushed_at: Option<Instant>,
}

impl Write for TimestampWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed_at.get_or_insert_with(Instant::now);
        Ok(())
    }
}

#[test]
fn report_is_emitted_before_idle() {
    let idle = Duration::from_millis(80);
    let config = ProbeConfig::default().with_idle(idle);
    let mut out = TimestampWriter {
        buf: Vec::new(),
        flushed_at: None,
    };

    execute_probe(&DummyProbeCommunicator(), &config, &mut out).unwrap();
    let returned_at = Instant::now();

    let flushed_at = out.flushed_at.expect("report was never flushed");
    assert!(returned_at.duration_since(flushed_at) >= idle);
    assert!(!out.buf.is_empty());
}

#[test]
fn dummy_reports_os_host_name() {
    let mut out = Vec::new();
    let comm = DummyProbeCommunicator();

    let report = execute_probe(&comm, &quick_config(), &mut out).unwrap();

    assert_eq!(read_hostname(), report.hostname);
    assert_eq!(comm.host_name(), report.hostname);
}

#[test]
fn host_name_at_platform_limit_is_intact() {
    let host = "h".repeat(HOST_NAME_MAX);
    let outputs = run_channel(&[host.as_str(), host.as_str()], &quick_config()).unwrap();

    for output in outputs.values() {
        assert!(output.ends_with(". Sleeping for 0s.\n"));
        let report: Report = output.parse().unwrap();
        assert_eq!(host, report.hostname);
    }
}

#[test]
fn host_name_over_platform_limit_is_truncated() {
    let host = format!("{}-overflow", "h".repeat(HOST_NAME_MAX));
    let outputs = run_channel(&[host.as_str()], &quick_config()).unwrap();

    let report: Report = outputs[&0].parse().unwrap();
    assert_eq!("h".repeat(HOST_NAME_MAX), report.hostname);
    assert_eq!(0, report.local_rank);
}
