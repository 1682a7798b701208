fn main() -> std::process::ExitCode {
    cylscan_lib::run()
}
