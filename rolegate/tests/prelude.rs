use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use rolegate::prelude::*;
use rolegate_test::{profile_with_roles, StaticResolver, TestApp};

async fn handler(ctx: RequestContext) -> String {
    ctx.profile(DEFAULT_PROFILE_KEY)
        .map(|p| p.user_id.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn prelude_is_enough_to_gate_a_route() {
    let resolver = StaticResolver::default().with("t", profile_with_roles("u1", &["staff"]));
    let filter = RoleFilter::new(Arc::new(resolver));
    let app = TestApp::new(
        Router::new()
            .route("/", get(handler))
            .layer(filter.restrict_to(["staff"]))
            .layer(default_trace()),
    );

    let resp = app.get("/").bearer("t").send().await.assert_ok();
    assert_eq!(resp.text(), "u1");
    app.get("/").bearer("other").send().await.assert_rejected();
}
