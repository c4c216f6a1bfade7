use std::process::ExitCode;

fn main() -> ExitCode {
    match vaxpool::run_with_args() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
