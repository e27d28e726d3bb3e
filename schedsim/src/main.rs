use std::io::Write;
use std::path::PathBuf;

use eyre::WrapErr;
use structopt::StructOpt;

use schedsim::input::read_processes;
use schedsim::{OutputFormat, SchedulerConfig, Simulation};

/// Simulates scheduling of processes on a single CPU.
#[derive(Debug, StructOpt)]
#[structopt(author)]
struct Opt {
    /// File with the scheduling algorithm on the first line, followed by its `key = value`
    /// options.
    #[structopt(parse(from_os_str))]
    scheduler: PathBuf,

    /// File with one process per line: arrival time followed by alternating CPU and I/O burst
    /// durations, starting and ending with a CPU burst.
    #[structopt(parse(from_os_str))]
    processes: PathBuf,

    /// Verbosity.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u64,

    /// Also write the logs to this file, replacing its contents.
    #[structopt(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[structopt(long)]
    no_stderr: bool,

    /// Report format.
    #[structopt(short, long, possible_values = &["text", "json"], default_value = "text")]
    format: OutputFormat,

    /// Print every handled event before the report.
    #[structopt(long)]
    trace: bool,
}

/// Maps the number of `-v` flags to the most detailed level logged.
fn log_level(verbose: u64) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Logs to stderr and, if requested, to a log file truncated at startup.
fn set_up_logger(opt: &Opt) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log_level(opt.verbose));
    if let Some(path) = &opt.log_output {
        dispatch = dispatch.chain(std::fs::File::create(path)?);
    }
    if !opt.no_stderr {
        dispatch = dispatch.chain(std::io::stderr());
    }
    dispatch.apply()?;
    Ok(())
}

fn run(opt: &Opt) -> eyre::Result<()> {
    let config = SchedulerConfig::from_path(&opt.scheduler).wrap_err_with(|| {
        format!(
            "unable to load scheduler description from {}",
            opt.scheduler.display()
        )
    })?;
    let processes = read_processes(&opt.processes).wrap_err_with(|| {
        format!(
            "unable to load process description from {}",
            opt.processes.display()
        )
    })?;
    let mut simulation = Simulation::new(processes, &config)?;
    let report = simulation.run()?;
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    if opt.trace {
        for event in simulation.trace() {
            writeln!(writer, "{}", event)?;
        }
    }
    report.write(&mut writer, opt.format)?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::from_args();
    set_up_logger(&opt)?;
    run(&opt)
}
