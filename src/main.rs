use gimbal::{AppConfig, DemoConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("gimbal=info,wgpu=warn")).init();

    if let Err(err) = gimbal::run(AppConfig::new(), DemoConfig::new()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
