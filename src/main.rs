fn main() {
    if let Err(err) = csv_db_loader::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
