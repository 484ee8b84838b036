use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = dirshard::cli::parse();
    app::run(args)
}
