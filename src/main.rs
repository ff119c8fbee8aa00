use migration::{Migrator, MigratorTrait};
use nyumba_auth::api::{AdminApi, AuthApi, HealthApi, NotificationsApi, RolesApi, UsersApi};
use nyumba_auth::app_data::AppData;
use nyumba_auth::bootstrap;
use nyumba_auth::config::{init_logging, Settings};
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let settings = Settings::from_env().expect("Invalid configuration");

    let db: DatabaseConnection = Database::connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");
    info!("Connected to database: {}", settings.database_url);

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    info!("Database migrations completed");

    let app = AppData::init(db, &settings);
    bootstrap::seed(&app).await.expect("Failed to seed initial data");
    info!("Seed data verified");

    let api_service = OpenApiService::new(
        (
            HealthApi,
            AuthApi::new(app.clone()),
            AdminApi::new(app.clone()),
            UsersApi::new(app.clone()),
            RolesApi::new(app.clone()),
            NotificationsApi::new(app.clone()),
        ),
        "Nyumba Identity API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("http://{}/api", settings.bind_addr));

    let ui = api_service.swagger_ui();
    let routes = Route::new().nest("/api", api_service).nest("/swagger", ui);

    info!("Listening on {}", settings.bind_addr);
    Server::new(TcpListener::bind(&settings.bind_addr))
        .run(routes)
        .await
}
