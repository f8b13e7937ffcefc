use crate::{
    api::{cache, dashboard, payroll, work_log},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms.max(1))
            .burst_size(requests_per_min.max(1))
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("rate limit settings must be non-zero");
        Governor::new(&cfg)
    }

    // A full dashboard refresh walks five collections upstream; lists are cheaper.
    let dashboard_limiter = Arc::new(build_limiter(config.rate_dashboard_per_min));
    let list_limiter = Arc::new(build_limiter(config.rate_list_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            // /dashboard
            .service(
                web::resource("/dashboard")
                    .wrap(dashboard_limiter)
                    .route(web::get().to(dashboard::get_dashboard)),
            )
            // /work-logs
            .service(
                web::resource("/work-logs")
                    .wrap(list_limiter.clone())
                    .route(web::get().to(work_log::list_work_logs)),
            )
            // /payrolls
            .service(
                web::resource("/payrolls")
                    .wrap(list_limiter.clone())
                    .route(web::get().to(payroll::list_payrolls)),
            )
            // /cache/{entity}
            .service(
                web::resource("/cache/{entity}")
                    .wrap(list_limiter)
                    .route(web::delete().to(cache::invalidate_cache)),
            ),
    );
}

// REFRESH (dashboard / list screen)
//  └─ collection cache hit?  ── yes ─▶ aggregate
//       └─ no ─▶ page through upstream ─▶ resolve employees ─▶ aggregate

// MUTATION (CRUD screen)
//  └─ DELETE /cache/{entity} ─▶ next refresh re-fetches that entity
