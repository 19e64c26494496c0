#![windows_subsystem = "windows"]

use profile_insights::ui::Dashboard;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application(Dashboard::title, Dashboard::update, Dashboard::view)
        .subscription(Dashboard::subscription)
        .theme(Dashboard::theme)
        .window(iced::window::Settings {
            size: (1200.0, 800.0).into(),
            min_size: Some((800.0, 560.0).into()),
            #[cfg(target_os = "linux")]
            platform_specific: iced::window::settings::PlatformSpecific {
                application_id: String::from("profile-insights"),
                ..Default::default()
            },
            ..Default::default()
        })
        .run_with(|| (Dashboard::new(), iced::Task::none()))
}
