use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    match flashcards::cli::entrypoint() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
