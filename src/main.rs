fn main() {
    if let Err(err) = csv2sql::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
