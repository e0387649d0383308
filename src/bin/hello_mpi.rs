use std::process::ExitCode;

use hello_mpi::probe::controller;

fn main() -> ExitCode {
    let result = controller::run_mpi();
    ExitCode::from(controller::exit_code(&result))
}
