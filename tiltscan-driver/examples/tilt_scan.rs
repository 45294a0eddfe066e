use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tiltscan_data::RangeScan;
use tiltscan_driver::{run_driver_with, run_fuser, AngleState, Dynamixel, TiltScanConfig};

/// Sweeps a servo-mounted 2D LiDAR and turns its scans into 3D point clouds.
///
/// Scans are read from stdin as JSON lines (`{"ranges": [...]}`) and clouds are
/// written to stdout as JSON lines.
#[derive(Parser)]
#[command(disable_version_flag = true)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// The device path to the servo's serial port. Overrides the configuration.
    #[arg(short, long)]
    port: Option<String>,
}

fn read_scans(scan_tx: mpsc::Sender<RangeScan>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read stdin: {e}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RangeScan>(&line) {
            Ok(scan) => {
                if scan_tx.send(scan).is_err() {
                    return;
                }
            }
            Err(e) => log::warn!("Skipping malformed scan: {e}"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match TiltScanConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => TiltScanConfig::default(),
    };
    if let Some(port) = args.port {
        config.actuator.port = port;
    }
    if let Err(e) = config.validate() {
        log::error!("{e}");
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::Relaxed)) {
        log::error!("Failed to set the Ctrl-C handler: {e}");
        std::process::exit(1);
    }

    let (scan_tx, scan_rx) = mpsc::channel();
    std::thread::spawn(move || read_scans(scan_tx));

    let actuator = Dynamixel::open(
        &config.actuator.port,
        config.actuator.baud_rate,
        config.actuator.id,
    );
    let (driver_threads, cloud_rx) = match actuator {
        Ok(actuator) => run_driver_with(actuator, &config, scan_rx),
        Err(e) => {
            log::error!("{e}. The sweep will not run; clouds use the initial position.");
            let angle = Arc::new(AngleState::new(config.actuator.initial_position));
            run_fuser(&config.fusion, angle, scan_rx)
        }
    };

    let stdout = std::io::stdout();
    while running.load(Ordering::Relaxed) {
        let cloud = match cloud_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(cloud) => cloud,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        let mut out = stdout.lock();
        let written = serde_json::to_writer(&mut out, &cloud)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(out));
        if let Err(e) = written {
            log::error!("Failed to write cloud: {e}");
            break;
        }
    }

    log::info!("Shutting down");
    drop(driver_threads);
}
