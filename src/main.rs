fn main() -> anyhow::Result<()> {
    ppdext::run()
}
