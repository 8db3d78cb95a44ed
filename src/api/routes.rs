use actix_web::{delete, get, post, web, HttpResponse, Result as WebResult};
use uuid::Uuid;

use crate::api::models::{ModelList, SaveRequest, SaveStatus, SendMessageRequest, SessionView};
use crate::chat::{ModelCatalog, SessionController, SessionRegistry};

// --- Models ---

#[get("/models")]
pub async fn list_models(catalog: web::Data<ModelCatalog>) -> WebResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ModelList {
        models: catalog.models().to_vec(),
        default: catalog.default_model().map(str::to_string),
    }))
}

// --- Sessions ---

#[post("/sessions")]
pub async fn create_session(registry: web::Data<SessionRegistry>) -> WebResult<HttpResponse> {
    let id = registry.create().await;
    Ok(HttpResponse::Created().json(SessionView { id, history: Vec::new() }))
}

#[get("/sessions/{id}")]
pub async fn get_session(
    registry: web::Data<SessionRegistry>,
    id: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let Some(session) = registry.get(id).await else {
        return Ok(HttpResponse::NotFound().body("Session not found"));
    };

    let session = session.lock().await;
    Ok(HttpResponse::Ok().json(SessionView { id, history: session.history().to_vec() }))
}

#[delete("/sessions/{id}")]
pub async fn delete_session(
    registry: web::Data<SessionRegistry>,
    id: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    if registry.remove(id.into_inner()).await {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(HttpResponse::NotFound().body("Session not found"))
    }
}

// --- Actions ---

#[post("/sessions/{id}/messages")]
pub async fn send_message(
    registry: web::Data<SessionRegistry>,
    controller: web::Data<SessionController>,
    catalog: web::Data<ModelCatalog>,
    id: web::Path<Uuid>,
    req: web::Json<SendMessageRequest>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let req = req.into_inner();

    if req.message.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("Message must not be empty"));
    }

    let Some(model) = catalog.resolve(req.model.as_deref()) else {
        return Ok(HttpResponse::BadRequest().body("Unknown model"));
    };

    let Some(session) = registry.get(id).await else {
        return Ok(HttpResponse::NotFound().body("Session not found"));
    };

    // Held until the turn is appended so this session's messages stay in order.
    let mut session = session.lock().await;
    controller.respond(&mut session, &req.message, model).await;

    Ok(HttpResponse::Ok().json(SessionView { id, history: session.history().to_vec() }))
}

#[post("/sessions/{id}/clear")]
pub async fn clear_session(
    registry: web::Data<SessionRegistry>,
    controller: web::Data<SessionController>,
    id: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let Some(session) = registry.get(id).await else {
        return Ok(HttpResponse::NotFound().body("Session not found"));
    };

    let mut session = session.lock().await;
    controller.clear(&mut session);

    Ok(HttpResponse::Ok().json(SessionView { id, history: Vec::new() }))
}

#[post("/sessions/{id}/save")]
pub async fn save_session(
    registry: web::Data<SessionRegistry>,
    controller: web::Data<SessionController>,
    catalog: web::Data<ModelCatalog>,
    id: web::Path<Uuid>,
    req: Option<web::Json<SaveRequest>>,
) -> WebResult<HttpResponse> {
    let req = req.map(web::Json::into_inner).unwrap_or_default();

    let Some(model) = catalog.resolve(req.model.as_deref()) else {
        return Ok(HttpResponse::BadRequest().body("Unknown model"));
    };

    let Some(session) = registry.get(id.into_inner()).await else {
        return Ok(HttpResponse::NotFound().body("Session not found"));
    };

    let session = session.lock().await;
    let status = controller.save(&session, model).await;

    Ok(HttpResponse::Ok().json(SaveStatus { status }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(list_models)
            .service(create_session)
            .service(get_session)
            .service(delete_session)
            .service(send_message)
            .service(clear_session)
            .service(save_session)
    );
}
