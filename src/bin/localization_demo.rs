use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wall_localizer::common::timing::CancelToken;
use wall_localizer::simulation::{SimWorld, SimulatedRobot, SENSOR_MAX_RANGE};
use wall_localizer::{LocalizerConfig, UltrasonicLocalizer};

/// Run ultrasonic localization against a simulated wall corner
#[derive(Parser, Debug)]
#[command(name = "localization_demo")]
struct Args {
    /// True starting heading of the robot (degrees, clockwise from north)
    #[arg(long, default_value_t = 100.0, allow_hyphen_values = true)]
    heading: f64,

    /// Odometry heading error at the start (degrees)
    #[arg(long, default_value_t = 30.0, allow_hyphen_values = true)]
    drift: f64,

    /// Distance from the robot to each wall of the corner (cm)
    #[arg(long, default_value_t = 15.0)]
    corner_distance: f64,

    /// Sensor sample indices to replace with an out-of-range spike
    #[arg(long)]
    spike: Vec<usize>,

    /// Pace the simulation against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Localizer parameter override, e.g. --param debounce_ms=500
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,
}

fn parse_param(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let value = value
        .parse::<f64>()
        .map_err(|e| format!("bad value for {}: {}", name, e))?;
    Ok((name.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = LocalizerConfig::default();
    let params: HashMap<String, f64> = args.params.into_iter().collect();
    config
        .configure(&params)
        .context("Failed to configure localizer")?;

    let mut world = SimWorld::new(config.geometry)
        .with_corner(args.corner_distance)
        .with_heading(args.heading, args.drift);
    for &index in &args.spike {
        world = world.with_spike(index, SENSOR_MAX_RANGE);
    }
    let robot = SimulatedRobot::new(world);

    let cancel = CancelToken::new();
    let clock = robot
        .clock()
        .with_cancel_token(cancel.clone())
        .realtime(args.realtime);
    let mut localizer = UltrasonicLocalizer::new(
        config,
        Box::new(robot.pose_tracker()),
        Box::new(robot.actuator()),
        Box::new(robot.range_sensor()),
        Arc::new(clock),
    )?;
    let status = localizer.status();

    println!(
        "Starting at true heading {:.2}, odometry {:.2}",
        robot.true_heading(),
        robot.tracked_pose().heading
    );

    let mut run = tokio::task::spawn_blocking(move || localizer.start_localization());
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let result = loop {
        tokio::select! {
            joined = &mut run => break joined.context("Localization task panicked")?,
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Interrupt received, aborting localization");
                cancel.cancel();
            }
            _ = ticker.tick() => log::info!("State: {:?}", status.state()),
        }
    };

    let report = result.context("Localization failed")?;
    let world = robot.snapshot();
    println!(
        "Edges at {:.2} and {:.2}, correction {:.2}",
        report.angle_a, report.angle_b, report.correction
    );
    println!(
        "Final pose ({:.2}, {:.2}, {:.2}); true heading {:.2} after {:?} simulated",
        report.pose.x,
        report.pose.y,
        report.pose.heading,
        world.true_heading(),
        world.time()
    );
    Ok(())
}
