//! autogen binary — bootstrap the venv, then build every `*.yaml` in the directory.

fn main() {
    if let Err(e) = autogen::run_cli() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
