fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let exit_code = adv_cli::run_cli_from_args(std::env::args_os());
    std::process::exit(exit_code);
}
