// src/bin/hardlinkable.rs

fn main() {
    std::process::exit(hardlinkable_cli::run());
}
