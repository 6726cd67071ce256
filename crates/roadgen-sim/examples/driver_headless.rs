//! Headless driving demo -- scripted steering, ASCII frames on stdout.
//!
//! Run with:
//!   cargo run --example driver_headless -p roadgen-sim -- [config.json] [ticks]
//!
//! The optional JSON file holds a `SimConfig`; missing fields take their
//! defaults. Set `RUST_LOG=roadgen_sim=debug` to see rerolls and zoom changes.

use std::env;
use std::fs;

use anyhow::Context;
use roadgen_sim::prelude::*;

const FRAME_EVERY: u64 = 300;

fn load_config(path: Option<&str>) -> anyhow::Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            seed: 2024,
            ..Default::default()
        });
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config: SimConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    config.validate()?;
    Ok(config)
}

/// Weave left and right so the car wanders on and off the road.
fn scripted_steering(tick: u64) -> Steering {
    match tick % 400 {
        0..=69 => Steering::Left,
        70..=209 => Steering::Right,
        210..=279 => Steering::Left,
        _ => Steering::None,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let ticks: u64 = match args.get(1) {
        Some(raw) => raw.parse().with_context(|| format!("invalid tick count {raw:?}"))?,
        None => 1_800,
    };

    let mut drive = DriveLoop::new(config).context("building the drive loop")?;
    let legend = [
        (Rgb::BACKGROUND, '.'),
        (Rgb::ROAD, '#'),
        (Rgb::VEHICLE, '@'),
    ];

    for _ in 0..ticks {
        let tick = drive.tick_count();
        drive.set_input(InputFrame {
            steering: scripted_steering(tick),
        });
        for event in drive.tick() {
            println!("{event:?}");
        }

        if (tick + 1) % FRAME_EVERY == 0 {
            let area = drive.camera().area();
            let mut frame = FrameBuffer::new(area.width() as u32, area.height() as u32);
            drive.render(&mut frame)?;
            let vehicle = drive.vehicle();
            println!(
                "tick {} at ({:.1}, {:.1}) shake {:.2}",
                tick + 1,
                vehicle.cx,
                vehicle.cy,
                drive.camera().shake_intensity()
            );
            print!("{}", frame.to_ascii(&legend));
        }
    }

    println!("{} ticks, state {}", drive.tick_count(), drive.state_hash());
    Ok(())
}
