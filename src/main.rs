fn main() -> miette::Result<()> {
    goldrun::cli::run()
}
