use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexpi::config::{CPU_CHUNK_LEN, DEFAULT_DIGIT_POSITION};
use hexpi::{extract_hex_digits, CpuBackend};

#[derive(Parser, Debug)]
#[command(
    name = "hexpi",
    version,
    about = "Bailey-Borwein-Plouffe hexadecimal digit extraction for pi"
)]
struct Args {
    /// 1-based hexadecimal digit position. Non-positive values fall back
    /// to the default instead of erroring.
    #[arg(
        short = 'd',
        long,
        allow_negative_numbers = true,
        default_value_t = DEFAULT_DIGIT_POSITION as i64
    )]
    digit: i64,

    /// Worker threads for the CPU backend. Defaults to hardware
    /// concurrency.
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Terms per worker chunk on the CPU backend.
    #[arg(long, default_value_t = CPU_CHUNK_LEN)]
    chunk_len: u64,

    /// Run on the GPU instead of CPU threads.
    #[cfg(feature = "cuda")]
    #[arg(long)]
    gpu: bool,

    /// CUDA device index.
    #[cfg(feature = "cuda")]
    #[arg(long, default_value_t = 0)]
    device: u32,

    /// Grid width in blocks for the GPU backend.
    #[cfg(feature = "cuda")]
    #[arg(long, default_value_t = hexpi::config::gpu::BLOCKS)]
    blocks: u32,

    /// Threads per block for the GPU backend.
    #[cfg(feature = "cuda")]
    #[arg(long, default_value_t = hexpi::config::gpu::THREADS_PER_BLOCK)]
    block_threads: u32,

    /// Terms per GPU lane per wave.
    #[cfg(feature = "cuda")]
    #[arg(long, default_value_t = hexpi::config::gpu::LANE_TERMS)]
    lane_terms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("Bailey-Borwein-Plouffe Formula for Pi");
    println!("hexpi {}", env!("CARGO_PKG_VERSION"));
    println!();

    let place = if args.digit > 0 {
        args.digit as u64
    } else {
        DEFAULT_DIGIT_POSITION
    };
    let d = place - 1;

    let digits = compute(&args, place, d)?;
    println!("Pi Estimation Hex: {digits}");
    Ok(())
}

fn compute(args: &Args, place: u64, d: u64) -> anyhow::Result<String> {
    #[cfg(feature = "cuda")]
    if args.gpu {
        use hexpi::{device_report, CudaBackend, GpuGeometry};

        let report = device_report(args.device)?;
        println!("-------- Detected CUDA Device Details --------");
        println!("          Name: {}", report.name);
        println!("     Total RAM: {} (MB)", report.total_memory_mb);
        println!(" Compute Units: {}", report.compute_units);
        println!();

        let geometry = GpuGeometry {
            blocks: args.blocks,
            threads_per_block: args.block_threads,
            lane_terms: args.lane_terms,
        };
        let mut backend = CudaBackend::new(args.device, geometry)?;
        println!("Calculating Position: {place}");
        return Ok(extract_hex_digits(&mut backend, d)?);
    }

    let threads = args
        .threads
        .unwrap_or_else(hexpi::backend::default_worker_count);
    println!("Calculating Position: {place}, Using {threads} CPU Threads");
    let mut backend = CpuBackend::new(threads, args.chunk_len);
    Ok(extract_hex_digits(&mut backend, d)?)
}
