fn main() -> anyhow::Result<()> {
    backuper::cli::run()
}
