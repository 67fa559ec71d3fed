use anyhow::{anyhow, Result};
use clap::Parser;
use log::{error, info, warn};
use ntpquery::config::QueryConfig;
use ntpquery::report::PollSummary;
use ntpquery::timestamp::DisplayZone;
use ntpquery::traits::{NtpTransport, ReverseDns};
use ntpquery::{NoReverseDns, QueryResult, Session, SystemReverseDns, UdpTransport};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// NTP server to query (overrides the config file)
    host: Option<String>,

    /// UDP port of the server
    #[arg(short, long)]
    port: Option<u16>,

    /// Receive timeout in milliseconds
    #[arg(short, long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Number of queries to send
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Pause between queries in milliseconds
    #[arg(short, long = "interval-ms")]
    interval_ms: Option<u64>,

    /// Show timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Skip reverse DNS for reference identifiers
    #[arg(long)]
    no_dns: bool,

    /// Print one JSON object per sample
    #[arg(long)]
    json: bool,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(QueryConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => QueryConfig::from_json_file(path)?,
            None => QueryConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if self.utc {
            config.zone = DisplayZone::Utc;
        }
        if self.no_dns {
            config.reverse_dns = false;
        }

        config.validate()?;
        Ok((config, self.json))
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let (config, json) = Args::parse().into_config()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Stopping after the current query...");
        r.store(false, Ordering::SeqCst);
    })?;

    let summary = if config.reverse_dns {
        let session = Session::new(UdpTransport::new(), SystemReverseDns).with_zone(config.zone);
        poll(session, &config, json, &running)
    } else {
        let session = Session::new(UdpTransport::new(), NoReverseDns).with_zone(config.zone);
        poll(session, &config, json, &running)
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else if summary.successes() > 1 {
        print_summary(&config, &summary);
    }

    if summary.successes() == 0 {
        return Err(anyhow!(
            "No valid reply from {} ({} attempts failed)",
            config.host,
            summary.failures()
        ));
    }
    Ok(())
}

fn poll<T, R>(
    mut session: Session<T, R>,
    config: &QueryConfig,
    json: bool,
    running: &AtomicBool,
) -> PollSummary
where
    T: NtpTransport,
    R: ReverseDns,
{
    let mut summary = PollSummary::new();
    info!(
        "Querying {}:{} ({} sample(s), timeout {:?})",
        config.host,
        config.port,
        config.samples,
        config.timeout()
    );

    for attempt in 1..=config.samples {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let started = Instant::now();

        match session.query(&config.host, config.port, config.timeout()) {
            Ok(result) => {
                summary.record_success(result.round_trip);
                if json {
                    match serde_json::to_string(&result) {
                        Ok(line) => println!("{}", line),
                        Err(e) => error!("Failed to serialize sample {}: {}", attempt, e),
                    }
                } else {
                    print_result(attempt, &result);
                }
            }
            Err(e) => {
                summary.record_failure();
                warn!("[{}/{}] {:?}: {}", attempt, config.samples, e.kind(), e);
            }
        }

        if attempt < config.samples {
            let elapsed = started.elapsed();
            if elapsed < config.interval() {
                thread::sleep(config.interval() - elapsed);
            }
        }
    }

    summary
}

fn print_result(attempt: usize, result: &QueryResult) {
    println!("--- Sample {} from {} ---", attempt, result.host);
    println!("{}", result.packet);
    println!(
        "Destination timestamp: {}",
        result.destination_timestamp.to_rfc3339()
    );
    println!("Round-trip delay:    {:.3} ms", result.round_trip.delay_ms());
    println!("Local clock offset:  {:+.3} ms", result.round_trip.offset_ms());
}

fn print_summary(config: &QueryConfig, summary: &PollSummary) {
    let ms = |d: Option<chrono::TimeDelta>| {
        d.and_then(|d| d.num_nanoseconds())
            .map(|ns| ns as f64 / 1_000_000.0)
            .unwrap_or(f64::NAN)
    };

    println!("=== {} ===", config.host);
    println!(
        "Samples:     {} ok, {} failed",
        summary.successes(),
        summary.failures()
    );
    println!("Mean offset: {:+.3} ms", ms(summary.mean_offset()));
    println!("Mean delay:  {:.3} ms", ms(summary.mean_delay()));
    println!(
        "Best offset: {:+.3} ms (delay {:.3} ms)",
        ms(summary.best_offset()),
        ms(summary.min_delay())
    );
}
