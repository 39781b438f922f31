fn main() -> anyhow::Result<()> {
    chainrouter::cli::run_cli()
}
