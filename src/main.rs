// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use scratcher::audio::{self, StereoSource, TrackBuffer};
use scratcher::config::Settings;
use scratcher::project::Project;
use scratcher::sampler::{render, DirectSampler, Sampler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A time-warped resampler for turntable scratch effects."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates a new scratch project for a source file.
    Init {
        /// The audio file to scratch.
        source: PathBuf,
        /// Where to write the project. Files ending in .json are saved as JSON.
        project: PathBuf,
        /// An audio file mixed underneath the scratch at a fixed rate.
        #[arg(short, long)]
        background: Option<PathBuf>,
        /// The gain applied to the background.
        #[arg(long)]
        background_volume: Option<f64>,
    },
    /// Prints the duration and control points of a project.
    Info {
        /// The path to the project.
        project: PathBuf,
    },
    /// Prints the source position at regular output times.
    Timemap {
        /// The path to the project.
        project: PathBuf,
        /// Seconds between samples.
        #[arg(short, long, default_value_t = 0.05)]
        interval: f64,
    },
    /// Renders a project to an audio file.
    Render {
        /// The path to the project.
        project: PathBuf,
        /// The file to write.
        output: PathBuf,
        /// A YAML settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Writes raw interleaved 32-bit floats instead of a WAV file.
        #[arg(long)]
        raw: bool,
    },
    /// Resamples a file at a fixed rate.
    Direct {
        /// The audio file to resample.
        input: PathBuf,
        /// The WAV file to write.
        output: PathBuf,
        /// The output sample rate. Defaults to the configured output rate.
        #[arg(short, long)]
        rate: Option<u32>,
        /// A YAML settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            source,
            project,
            background,
            background_volume,
        } => {
            let source = fs::canonicalize(&source)?;
            let background = background.map(fs::canonicalize).transpose()?;
            let mut new_project = Project::new(source, background)?;
            if let Some(volume) = background_volume {
                new_project.sampler_mut().set_background_volume(volume);
            }
            new_project.save(&project)?;

            println!(
                "Created {} ({:.3}s)",
                project.display(),
                new_project.sampler().get_duration()
            );
        }
        Commands::Info { project } => {
            print_info(&project, &Project::open(&project)?);
        }
        Commands::Timemap { project, interval } => {
            if !(interval > 0.0 && interval.is_finite()) {
                return Err(format!("interval must be positive, got {}", interval).into());
            }

            let project = Project::open(&project)?;
            for (i, y) in project
                .sampler()
                .uniform_time_samples(interval)
                .iter()
                .enumerate()
            {
                println!("{:.6}\t{:.6}", i as f64 * interval, y);
            }
        }
        Commands::Render {
            project,
            output,
            config,
            raw,
        } => {
            let settings = Settings::load(config.as_deref())?;
            let mut sampler = Project::open(&project)?.into_sampler();
            sampler.set_tail_acceleration(settings.tail_acceleration());

            let mut track = TrackBuffer::new(settings.output_rate());
            render(&mut sampler, &mut track, settings.block_size());
            write_output(&track, &output, &settings, raw)?;
        }
        Commands::Direct {
            input,
            output,
            rate,
            config,
        } => {
            let settings = Settings::load(config.as_deref())?;
            let source = Arc::new(audio::decode(&input)?);
            let rate = rate.unwrap_or_else(|| settings.output_rate());
            if rate == 0 {
                return Err("rate must be greater than zero".into());
            }
            info!(from = source.rate(), to = rate, "Resampling");

            let mut sampler = DirectSampler::new(source);
            let mut track = TrackBuffer::new(rate);
            render(&mut sampler, &mut track, settings.block_size());
            write_output(&track, &output, &settings, false)?;
        }
    }

    Ok(())
}

fn print_info(path: &Path, project: &Project) {
    let sampler = project.sampler();
    println!("Project: {}", path.display());
    println!("Source: {}", project.source_path().display());
    match project.background_path() {
        Some(background) => println!(
            "Background: {} (volume {})",
            background.display(),
            sampler.background_volume()
        ),
        None => println!("Background: none"),
    }
    println!("Duration: {:.3}s", sampler.get_duration());
    println!(
        "Start: pos {} slope {}",
        sampler.start_pos(),
        sampler.start_slope()
    );

    println!(
        "\nControl points (count: {}):",
        sampler.num_control_points()
    );
    for i in 0..sampler.num_control_points() {
        let knot = sampler.control_point(i);
        println!("- x {} y {} slope {}", knot.x, knot.y, knot.slope);
    }

    println!("\nVolume (start: {}):", sampler.start_volume());
    for i in 0..sampler.num_volume_control_points() {
        let point = sampler.volume_control_point(i);
        println!("- x {} y {}", point.x, point.y);
    }
}

fn write_output(
    track: &TrackBuffer,
    output: &Path,
    settings: &Settings,
    raw: bool,
) -> Result<(), Box<dyn Error>> {
    if raw {
        audio::dump_raw(track, output)?;
    } else {
        audio::encode_wav(track, output, settings.output_format()?)?;
    }
    println!(
        "Wrote {} ({} frames at {} Hz)",
        output.display(),
        track.number_of_samples(),
        track.rate()
    );
    Ok(())
}
