use std::process::ExitCode;

fn main() -> ExitCode {
    foldconf_cli::run()
}
