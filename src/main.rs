use std::{process, sync::Arc};

use quire::{
    application::{
        admin::AdminContentService,
        bilingual::BilingualResolver,
        content::ContentService,
        error::AppError,
        repos::{
            ArticlesRepo, ArticlesWriteRepo, BooksRepo, BooksWriteRepo, EventsRepo, EventsWriteRepo,
        },
        retry::RetryPolicy,
    },
    cache::{CacheConfig, CacheStore},
    config,
    infra::{
        cache::create_cache_store,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminState, HttpState},
        telemetry,
    },
};
use tokio::try_join;
use tracing::{Dispatch, Level, debug, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(target = "quire::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache_config = CacheConfig::from(&settings.cache);
    let cache = Arc::new(create_cache_store(&cache_config).await);
    let (http_state, admin_state) =
        build_application_context(repositories, cache.clone(), &settings, &cache_config);

    let sweeper = spawn_cache_sweeper(cache, cache_config.content_ttl());
    let result = serve_http(&settings, http_state, admin_state).await;

    sweeper.abort();
    let _ = sweeper.await;

    result
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    cache: Arc<CacheStore>,
    settings: &config::Settings,
    cache_config: &CacheConfig,
) -> (HttpState, AdminState) {
    let books_repo: Arc<dyn BooksRepo> = repositories.clone();
    let books_write_repo: Arc<dyn BooksWriteRepo> = repositories.clone();
    let articles_repo: Arc<dyn ArticlesRepo> = repositories.clone();
    let articles_write_repo: Arc<dyn ArticlesWriteRepo> = repositories.clone();
    let events_repo: Arc<dyn EventsRepo> = repositories.clone();
    let events_write_repo: Arc<dyn EventsWriteRepo> = repositories.clone();

    let retry = RetryPolicy::new(settings.retry.max_attempts, settings.retry.base_delay);
    let content = ContentService::new(
        books_repo.clone(),
        articles_repo.clone(),
        events_repo.clone(),
        cache,
    )
    .with_retry_policy(retry)
    .with_ttl(cache_config.content_ttl());

    let bilingual = BilingualResolver::new(content.clone());
    let admin = Arc::new(AdminContentService::new(
        books_repo,
        books_write_repo,
        articles_repo,
        articles_write_repo,
        events_repo,
        events_write_repo,
        content.clone(),
    ));

    let http_state = HttpState {
        content,
        bilingual,
        db: repositories.clone(),
    };
    let admin_state = AdminState {
        admin,
        db: repositories,
    };

    (http_state, admin_state)
}

fn spawn_cache_sweeper(
    cache: Arc<CacheStore>,
    period: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            let removed = cache.cleanup_expired();
            debug!(
                target = "quire::cache",
                removed,
                "Swept expired cache entries"
            );
        }
    })
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "quire::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "Listening"
    );

    let public_server = axum::serve(public_listener, public_router.into_make_service());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
