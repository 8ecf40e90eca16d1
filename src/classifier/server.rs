use std::sync::Arc;

use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes as MultipartBytes;
use actix_web::{HttpRequest, HttpResponse, HttpServer, get, post, web};

use super::model::ImageModel;
use crate::error::ClassifierError;

#[derive(Clone)]
pub struct ClassifierState {
    pub model: Arc<ImageModel>,
}

#[derive(MultipartForm)]
pub struct PredictForm {
    #[multipart(limit = "20MiB")]
    pub image: MultipartBytes,
}

#[get("/health")]
pub async fn health(_req: HttpRequest, _: web::Data<ClassifierState>) -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

#[post("/predict")]
pub async fn predict(
    MultipartForm(form): MultipartForm<PredictForm>,
    app_state: web::Data<ClassifierState>,
) -> Result<HttpResponse, ClassifierError> {
    let payload = form.image.data;
    let model = app_state.model.clone();

    // Inference is CPU-bound; keep it off the request workers.
    let result = tokio::task::spawn_blocking(move || model.classify(&payload))
        .await
        .map_err(|e| ClassifierError::Model(format!("inference task failed: {e}")))??;

    Ok(HttpResponse::Ok().json(result))
}

pub async fn startup(host: String, port: u16, state: ClassifierState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    log::info!("starting classifier server at {host}:{port}");

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .service(health)
            .service(predict)
    })
    .bind((host, port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
