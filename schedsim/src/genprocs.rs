use std::io::Write;

use eyre::eyre;
use itertools::Itertools;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaChaRng};
use rand_distr::{Distribution, Poisson, Uniform};
use structopt::StructOpt;

use schedsim::Time;

/// Generates a random process description for the scheduling simulator.
#[derive(Debug, StructOpt)]
#[structopt(author)]
struct Opts {
    /// Number of processes.
    #[structopt(short, long)]
    count: usize,

    /// Seed to use for random number generator.
    #[structopt(short, long)]
    seed: Option<u64>,

    /// Latest possible arrival time.
    #[structopt(long, default_value = "100")]
    max_arrival: Time,

    /// Maximum number of CPU bursts per process.
    #[structopt(long, default_value = "5")]
    max_bursts: usize,

    /// Expected CPU burst duration.
    #[structopt(long, default_value = "10")]
    mean_cpu: f64,

    /// Expected I/O burst duration.
    #[structopt(long, default_value = "10")]
    mean_io: f64,
}

/// Burst durations are shifted by one so that every burst takes some time.
struct BurstDistr(Option<Poisson<f64>>);

impl BurstDistr {
    fn new(mean: f64) -> eyre::Result<Self> {
        if mean < 1.0 {
            return Err(eyre!("mean burst duration must be at least 1, got {}", mean));
        }
        if mean - 1.0 > 0.0 {
            Poisson::new(mean - 1.0)
                .map(|distr| Self(Some(distr)))
                .map_err(|_| eyre!("invalid mean burst duration: {}", mean))
        } else {
            Ok(Self(None))
        }
    }
}

impl Distribution<Time> for BurstDistr {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Time {
        let value: f64 = self.0.as_ref().map_or(0.0, |distr| distr.sample(rng));
        value as Time + 1
    }
}

fn generate<R: Rng>(opts: &Opts, rng: &mut R) -> eyre::Result<Vec<Vec<Time>>> {
    if opts.max_bursts == 0 {
        return Err(eyre!("there must be at least one CPU burst"));
    }
    let arrival_distr = Uniform::new_inclusive(0, opts.max_arrival);
    let bursts_distr = Uniform::new_inclusive(1, opts.max_bursts);
    let cpu_distr = BurstDistr::new(opts.mean_cpu)?;
    let io_distr = BurstDistr::new(opts.mean_io)?;
    let mut processes: Vec<Vec<Time>> = (0..opts.count)
        .map(|_| {
            let num_bursts = bursts_distr.sample(rng);
            let mut line = vec![arrival_distr.sample(rng)];
            for burst in 0..num_bursts {
                if burst > 0 {
                    line.push(io_distr.sample(rng));
                }
                line.push(cpu_distr.sample(rng));
            }
            line
        })
        .collect();
    processes.sort_by_key(|line| line[0]);
    Ok(processes)
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opts = Opts::from_args();

    let mut rng = if let Some(seed) = opts.seed {
        ChaChaRng::seed_from_u64(seed)
    } else {
        ChaChaRng::from_entropy()
    };

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    for line in generate(&opts, &mut rng)? {
        writeln!(writer, "{}", line.iter().format(" "))?;
    }
    Ok(())
}
