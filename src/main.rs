use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use traffic_schedule::generator::{self, GeneratorConfig};
use traffic_schedule::problem::Problem;
use traffic_schedule::simulation::{SchedulerConfig, SimWorld, StrategyKind, Tick};
use traffic_schedule::submission::Submission;

#[derive(Parser)]
#[command(name = "traffic_schedule")]
#[command(about = "Traffic light scheduling and scoring")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a schedule for a problem and write it in submission format
    Schedule {
        /// Problem description file
        input: PathBuf,

        /// How green time is assigned to each intersection's streets
        #[arg(long, value_enum, default_value_t = StrategyKind::Uniform)]
        strategy: StrategyKind,

        /// Green time per street for the uniform strategy
        #[arg(long, default_value = "1")]
        green: Tick,

        /// Ignore streets that no car drives through
        #[arg(long)]
        skip_unused: bool,

        /// Write the submission here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also simulate the schedule and print its score
        #[arg(long)]
        simulate: bool,
    },

    /// Simulate an existing submission and print its score
    Score {
        /// Problem description file
        input: PathBuf,

        /// Submission file
        schedule: PathBuf,
    },

    /// Write a random problem description
    Generate {
        #[arg(long, default_value = "0")]
        seed: u64,

        #[arg(long, default_value = "8")]
        nodes: usize,

        #[arg(long, default_value = "16")]
        streets: usize,

        #[arg(long, default_value = "20")]
        cars: usize,

        /// Simulated duration D
        #[arg(long, default_value = "60")]
        duration: Tick,

        /// Bonus F per finished car
        #[arg(long, default_value = "100")]
        bonus: u64,

        #[arg(long, default_value = "4")]
        max_length: Tick,

        #[arg(long, default_value = "6")]
        max_route: usize,

        /// Write the problem here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Schedule {
            input,
            strategy,
            green,
            skip_unused,
            output,
            simulate,
        } => {
            let mut problem = Problem::load(&input)?;
            if skip_unused {
                let before = problem.streets.len();
                problem = problem.without_unused_streets();
                info!(
                    "Skipping {} unused streets",
                    before - problem.streets.len()
                );
            }

            let config = SchedulerConfig {
                strategy,
                uniform_duration: green,
            };
            let mut world = SimWorld::from_problem(&problem)?;
            world.assign_schedules(config.build().as_ref())?;

            let submission = world.network().submission();
            match output {
                Some(path) => {
                    submission.save(&path)?;
                    info!(
                        "Wrote {} intersection schedules to {}",
                        submission.intersections.len(),
                        path.display()
                    );
                }
                None => print!("{}", submission),
            }

            if simulate {
                let score = world.run()?;
                println!("score: {}", score);
            }
        }
        Command::Score { input, schedule } => {
            let problem = Problem::load(&input)?;
            let submission = Submission::load(&schedule)?;

            let mut world = SimWorld::from_problem(&problem)?;
            world.apply_submission(&submission)?;
            let score = world.run()?;
            println!("score: {}", score);
        }
        Command::Generate {
            seed,
            nodes,
            streets,
            cars,
            duration,
            bonus,
            max_length,
            max_route,
            output,
        } => {
            let problem = generator::generate(&GeneratorConfig {
                seed,
                nodes,
                streets,
                cars,
                duration,
                bonus,
                max_street_length: max_length,
                max_route_streets: max_route,
            })?;
            match output {
                Some(path) => problem.save(&path)?,
                None => print!("{}", problem),
            }
        }
    }

    Ok(())
}
