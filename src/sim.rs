use std::process;

use sim_lib::config::HierarchyConfig;
use sim_lib::error::SimulatorResult;
use sim_lib::flags::SimArgs;
use sim_lib::report::{
    ConfigurationReport, ContentsReport, MeasurementsReport,
};
use sim_lib::{logging, run_wrapper};

fn main() {
    let flags = SimArgs::from_env_or_exit();
    logging::init(flags.verbose);

    if let Err(e) = run_sim(flags.into()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_sim(config: HierarchyConfig) -> SimulatorResult<()> {
    print!("{}", ConfigurationReport(&config));

    let mem = run_wrapper::run(&config)?;

    print!("{}", ContentsReport(mem.l1()));
    if let Some(l2) = mem.l2() {
        print!("{}", ContentsReport(l2));
    }
    print!("{}", MeasurementsReport(mem.stats()));

    Ok(())
}
