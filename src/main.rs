use anyhow::Result;
use clap::Parser;

use patch_monitor::cli::{normalize, Cli};
use patch_monitor::{runner, util};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_logging(cli.verbose);

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: run the selected command
  runner::run(&cfg)
}
