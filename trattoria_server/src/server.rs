use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use payu_tools::PayuApi;
use trattoria_engine::{CatalogApi, GatewaySettings, OrderFlowApi, PaymentGatewayApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::BearerAuthMiddlewareFactory,
    routes::{
        health,
        CreateMenuItemRoute,
        DeleteMenuItemRoute,
        DeleteOrderRoute,
        ListOrdersRoute,
        MenuItemRoute,
        MenuRoute,
        OrderByIdRoute,
        PlaceOrderRoute,
        RetryPaymentRoute,
        UpdateMenuItemRoute,
        UpdateOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        info!("🗃️ Running database migrations");
        db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let payu = PayuApi::new(config.payu.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, payu)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase, payu: PayuApi) -> Result<Server, ServerError> {
    let settings = GatewaySettings::from(&config.payu);
    let options = ServerOptions::from_config(&config);
    let srv = HttpServer::new(move || {
        let gateway = PaymentGatewayApi::new(payu.clone(), settings.clone());
        let orders_api = OrderFlowApi::new(db.clone(), gateway);
        let catalog_api = CatalogApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        App::new()
            .wrap(BearerAuthMiddlewareFactory::new(token_issuer))
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("tog::access_log"))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(options))
            .service(health)
            .service(MenuRoute::<SqliteDatabase>::new())
            .service(MenuItemRoute::<SqliteDatabase>::new())
            .service(CreateMenuItemRoute::<SqliteDatabase>::new())
            .service(UpdateMenuItemRoute::<SqliteDatabase>::new())
            .service(DeleteMenuItemRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase, PayuApi>::new())
            .service(ListOrdersRoute::<SqliteDatabase, PayuApi>::new())
            .service(OrderByIdRoute::<SqliteDatabase, PayuApi>::new())
            .service(UpdateOrderRoute::<SqliteDatabase, PayuApi>::new())
            .service(DeleteOrderRoute::<SqliteDatabase, PayuApi>::new())
            .service(RetryPaymentRoute::<SqliteDatabase, PayuApi>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same error envelope as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ServerError::ValidationError(err.to_string()).into())
}
