use crate::{
    api::{employee, payrun, template},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Per-route limiter keyed by peer IP
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("per_millisecond and burst_size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let import_limiter = Arc::new(build_limiter(config.rate_import_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/template/{company_id}/{domain}")
                    // /template/{company_id}/{domain}
                    .service(
                        web::resource("")
                            .route(web::get().to(template::get_template))
                            .route(web::put().to(template::save_template)),
                    )
                    // /template/{company_id}/{domain}/sample
                    .service(web::resource("/sample").route(web::get().to(template::template_sample)))
                    // /template/{company_id}/{domain}/columns
                    .service(web::resource("/columns").route(web::post().to(template::add_column)))
                    // /template/{company_id}/{domain}/columns/{key}
                    .service(
                        web::resource("/columns/{key}")
                            .route(web::put().to(template::rename_template_column))
                            .route(web::delete().to(template::delete_template_column)),
                    ),
            )
            .service(
                web::scope("/payrun")
                    // /payrun?company_id=&month=&year=
                    .service(web::resource("").route(web::get().to(payrun::list_payruns)))
                    // /payrun/summary?company_id=&month=&year=
                    .service(web::resource("/summary").route(web::get().to(payrun::payrun_summary)))
                    // /payrun/import
                    .service(
                        web::resource("/import")
                            .wrap(import_limiter.clone())
                            .route(web::post().to(payrun::import_payrun)),
                    ),
            )
            .service(
                web::scope("/employee")
                    // /employee/import
                    .service(
                        web::resource("/import")
                            .wrap(import_limiter)
                            .route(web::post().to(employee::import_employees)),
                    ),
            ),
    );
}
