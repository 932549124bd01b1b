use clap::Parser;
use log::debug;

use vidsort::Opts;
use vidsort::cli::SubCommandExtend;
use vidsort::config::SubCommand;

fn main() {
    env_logger::init();

    let opts = Opts::parse();
    debug!("{:?}", opts);

    let result = match &opts.subcmd {
        SubCommand::Organize(config) => config.run(&opts),
        SubCommand::Inspect(config) => config.run(&opts),
    };

    if let Err(e) = result {
        eprintln!("[ERR] {:?}", e);
        std::process::exit(1);
    }
}
