use crate::{
    clients::ServiceClients,
    config::Config,
    error::BotError,
    handler::{EventHandler, InboundRequest},
    prompt::PromptGenerator,
};
use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};

pub const EVENTS_PATH: &str = "/slack/events";

/// Builds the handler and its long-lived clients from configuration.
/// Every delivery it dispatches must carry a valid Slack signature.
pub fn build_handler(config: &Config) -> crate::Result<EventHandler> {
    let secret = config.slack.signing_secret.clone().ok_or_else(|| {
        BotError::ConfigError("SLACK_SIGNING_SECRET is required".into())
    })?;
    let clients = ServiceClients::new(config)?;

    let mut prompts = PromptGenerator::new(clients.text().clone());
    if let Some(model) = &config.openai.model {
        prompts = prompts.with_model(model.clone());
    }

    Ok(EventHandler::new(&clients)
        .with_prompt_generator(prompts)
        .with_signing_secret(secret))
}

async fn slack_events(
    handler: web::Data<EventHandler>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let mut request = InboundRequest::new(String::from_utf8_lossy(&body).into_owned());
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    let dispatch = handler.dispatch(&request);

    // Detached; the response does not wait for it.
    if let Some(work) = dispatch.work {
        actix_web::rt::spawn(work);
    }

    let status = StatusCode::from_u16(dispatch.response.status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type("application/json")
        .body(dispatch.response.body)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(EVENTS_PATH, web::post().to(slack_events))
        .route("/health", web::get().to(health));
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let handler = build_handler(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let handler = web::Data::new(handler);

    HttpServer::new(move || App::new().app_data(handler.clone()).configure(configure))
        .bind(("0.0.0.0", config.port_or_default()))?
        .run()
        .await
}
