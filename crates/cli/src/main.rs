use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use rtsp::{CallResult, Client, ClientConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rtsp-client",
    about = "Walk an RTSP server through OPTIONS, DESCRIBE, SETUP, PLAY and TEARDOWN"
)]
struct Args {
    /// Stream URL (scheme defaults to rtsp, port to 554)
    url: String,

    /// Seconds to wait for each response
    #[arg(long, short, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Maximum bytes read for one response
    #[arg(
        long,
        default_value_t = rtsp::transport::DEFAULT_MAX_RESPONSE_BYTES,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    max_bytes: usize,

    /// Client RTP-RTCP port pair offered in SETUP
    #[arg(long, default_value = "8000-8001")]
    client_port: String,

    /// Seconds to stay in PLAY before tearing down
    #[arg(long, default_value_t = 0)]
    play_secs: u64,

    /// Log every request and response line
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = ClientConfig {
        timeout: Duration::from_secs(args.timeout),
        max_response_bytes: args.max_bytes,
        log_messages: args.verbose,
        ..ClientConfig::default()
    };

    let mut client = match Client::connect(&args.url, config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.url, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(&mut client, &args) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(client: &mut Client, args: &Args) -> Result<(), String> {
    report("OPTIONS", client.options(&[]))?;
    let methods: Vec<_> = client.supported_methods().iter().map(|m| m.to_string()).collect();
    println!("server supports: {}", methods.join(", "));

    report("DESCRIBE", client.describe(&[("Accept", "application/sdp")]))?;
    let tracks = client.media_control_tracks().map_err(|e| e.to_string())?.to_vec();
    let aggregate = client
        .aggregate_control_track()
        .map_err(|e| e.to_string())?
        .to_string();
    println!("aggregate control: {aggregate}");
    for track in &tracks {
        println!("media track: {track}");
    }

    let transport = format!("RTP/AVP;unicast;client_port={}", args.client_port);
    for track in &tracks {
        report("SETUP", client.setup(track, &[("Transport", transport.as_str())]))?;
    }
    if let Ok(negotiated) = client.transport() {
        println!("transport: {negotiated}");
    }

    report("PLAY", client.play(&aggregate, &[("Range", "npt=0.000-")]))?;
    if args.play_secs > 0 {
        thread::sleep(Duration::from_secs(args.play_secs));
    }

    report("TEARDOWN", client.teardown(&aggregate, &[]))?;
    println!("session closed in state {}", client.state());
    Ok(())
}

fn report(step: &str, result: CallResult) -> Result<(), String> {
    match result {
        Ok(response) => {
            println!("{step}: {} {}", response.status_code, response.status_text);
            Ok(())
        }
        Err(e) => Err(format!("{step} failed: {e}")),
    }
}
