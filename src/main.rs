use std::process::ExitCode;

use log::{error, info};
use mandelbrot_png::config::RenderConfig;
use mandelbrot_png::producer::RenderWorker;
use mandelbrot_png::storage::DirStorage;

const STORAGE_BASE: &str = "spiffs";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = RenderConfig::default();
    let raw = cfg.raw_len().unwrap_or(usize::MAX);

    let storage = match DirStorage::mount(STORAGE_BASE) {
        Ok(storage) => storage,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!("will use ~{} bytes memory", raw.saturating_mul(2));
    let worker = match RenderWorker::spawn(Box::new(storage)) {
        Ok(worker) => worker,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let result = worker.render(cfg);
    worker.shutdown();

    match result {
        Ok(size) => {
            info!("compressed {raw} byte image to {size} bytes");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
