use super::resolve_config;
use crate::cli::args::ConfigArgs;
use crate::exit_codes;

pub fn run(args: ConfigArgs) -> anyhow::Result<i32> {
    let yaml = resolve_config(args.config.as_deref()).and_then(|cfg| cfg.to_yaml());
    match yaml {
        Ok(yaml) => {
            print!("{yaml}");
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("config error: {e}");
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}
