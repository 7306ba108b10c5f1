mod commands;
mod terminal;

use commands::{CommandLine, Commands, sweep};
use pingmap_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);

    let mut cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
        ..Config::default()
    };
    print::banner(cfg.no_banner, cfg.quiet);

    match commands.command {
        Commands::Sweep(args) => {
            cfg.no_matrix = args.no_matrix;
            cfg.disable_input = args.no_input;
            print::header("getting ready for sweep", cfg.quiet);
            sweep::sweep(args, &cfg).await
        }
    }
}
