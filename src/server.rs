use actix_web::{HttpRequest, HttpResponse, HttpServer, get, post, web};

use crate::error::FeedError;
use crate::feed_state::{FeedConfig, FeedState};
use crate::io_struct::{ErrorBody, TriggerResponse};

#[get("/health")]
pub async fn health(_req: HttpRequest, _: web::Data<FeedState>) -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

#[post("/trigger")]
pub async fn trigger(
    _req: HttpRequest,
    app_state: web::Data<FeedState>,
) -> Result<HttpResponse, FeedError> {
    let result = app_state.trigger().await?;
    Ok(HttpResponse::Ok().json(TriggerResponse::ok(result)))
}

#[get("/latest")]
pub async fn latest(_req: HttpRequest, app_state: web::Data<FeedState>) -> HttpResponse {
    match app_state.latest() {
        Some(entry) => HttpResponse::Ok().json(&entry.result),
        None => HttpResponse::NotFound().json(ErrorBody::new("No results available.")),
    }
}

#[get("/image/latest")]
pub async fn latest_image(_req: HttpRequest, app_state: web::Data<FeedState>) -> HttpResponse {
    match app_state.latest_image() {
        Some(image) => HttpResponse::Ok().content_type("image/jpeg").body(image),
        None => HttpResponse::NotFound().json(ErrorBody::new("No image available.")),
    }
}

pub async fn periodic_logging(feed_state: FeedState) {
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(feed_state.log_interval)).await;
        match feed_state.latest() {
            Some(entry) => log::info!(
                "latest: {} ({:.4}), image {} bytes",
                entry.result.class,
                entry.result.confidence,
                entry.image.len()
            ),
            None => log::info!("latest: nothing classified yet"),
        }
    }
}

pub async fn startup(feed_config: FeedConfig, feed_state: FeedState) -> std::io::Result<()> {
    let app_state = web::Data::new(feed_state);

    log::info!(
        "starting feed server at {}:{}",
        feed_config.host,
        feed_config.port
    );

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .service(health)
            .service(trigger)
            .service(latest)
            .service(latest_image)
    })
    .bind((feed_config.host, feed_config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
