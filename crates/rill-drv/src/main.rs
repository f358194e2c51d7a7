fn main() {
    if let Err(e) = rill_drv::main() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
