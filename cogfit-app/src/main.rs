mod app;
mod cli;

use clap::Parser;

pub use app::App;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    app::init_tracing(args.verbose);

    let app = App::new(args)?;
    app.run()?;

    Ok(())
}
