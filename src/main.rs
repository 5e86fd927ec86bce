use edge_httpd::config::{self, Config};
use edge_httpd::error::Result;
use edge_httpd::event_loop::Server;
use edge_httpd::handlers;
use edge_httpd::router::RouterBuilder;
use logging::{log_system, LogLevel};

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let app_config = Config::load(config_path.as_deref().map(std::path::Path::new));
    config::validate(&app_config)?;

    logging::init(
        app_config.log_level,
        app_config.log_target,
        &app_config.log_path,
    )?;

    println!("{app_config}");

    let router = RouterBuilder::new()
        .route("POST", "/api/login", handlers::login)
        .route("GET", "/api/me", handlers::me)
        .route("GET", "/api/search", handlers::search)
        .build();

    log_system!(LogLevel::Info, "listening on 0.0.0.0:{}", app_config.listen_port);

    let mut server = Server::new(app_config, router)?;
    server.run()
}
