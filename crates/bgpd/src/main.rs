use std::process::ExitCode;

fn main() -> ExitCode {
    match bgpd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("bgpd: {error}");
            ExitCode::FAILURE
        }
    }
}
