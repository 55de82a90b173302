use crate::{
    api::{fee, health, receipt, student},
    config::Config,
    error::AppError,
    middleware::cors_middleware,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    http::Method,
    middleware::{Condition, from_fn},
    web,
};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build the per-peer limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            (60_000 / requests_per_min as u64).max(1)
        };
        let cfg = GovernorConfigBuilder::default()
            .milliseconds_per_request(per_ms)
            .burst_size(requests_per_min.max(1))
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap_or_default();
        Governor::new(&cfg)
    }

    // Every malformed body is reported through the same envelope as other failures
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(err.to_string()).into()
    }));

    // Read by the CORS middleware
    cfg.app_data(web::Data::new(config.clone()));

    cfg.service(
        resource("/")
            .wrap(from_fn(cors_middleware))
            .route(web::get().to(health::home)),
    )
    .service(
        resource("/health")
            .wrap(from_fn(cors_middleware))
            .route(web::get().to(health::health)),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(Condition::new(
                config.rate_per_min > 0,
                build_limiter(config.rate_per_min),
            ))
            .wrap(from_fn(cors_middleware))
            // students
            .service(resource("/student/add").route(web::post().to(student::add_student)))
            .service(resource("/students").route(web::get().to(student::list_students)))
            .service(
                resource("/student/{class_name}/{roll}").route(web::get().to(student::get_student)),
            )
            .service(resource("/update_student").route(web::post().to(student::update_student)))
            .service(resource("/student/delete").route(web::post().to(student::delete_student)))
            .service(
                resource("/student/delete_class").route(web::post().to(student::delete_class)),
            )
            // receipts
            .service(resource("/receipt/add").route(web::post().to(receipt::add_receipt)))
            .service(resource("/receipt/history").route(web::get().to(receipt::receipt_history)))
            .service(resource("/receipt/all").route(web::get().to(receipt::list_receipts)))
            .service(
                resource("/receipts/all").route(web::get().to(receipt::list_receipt_records)),
            )
            .service(
                resource("/receipt/delete/{id}").route(web::delete().to(receipt::delete_receipt)),
            )
            .service(
                resource("/receipt/delete_all")
                    .route(web::delete().to(receipt::delete_all_receipts)),
            )
            // fees
            .service(
                resource("/fees/setup_defaults").route(web::get().to(fee::setup_default_fees)),
            )
            .service(resource("/fees/get").route(web::get().to(fee::get_fees)))
            .service(resource("/fees/update").route(web::post().to(fee::update_fee)))
            .service(resource("/fees/reset").route(web::get().to(fee::reset_fees))),
    );
}

/// A resource that also answers CORS preflight.
fn resource(path: &str) -> actix_web::Resource {
    web::resource(path).route(web::method(Method::OPTIONS).to(health::preflight))
}
