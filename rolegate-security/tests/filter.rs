use std::sync::Arc;

use axum::http::{Method, Request};
use axum::routing::{get, options};
use axum::Router;
use rolegate_security::{
    context_token, Profile, RequestContext, RoleFilter, DEFAULT_PROFILE_KEY,
};
use rolegate_test::{
    profile_with_roles, CountingResolver, FailingResolver, SpyResolver, StaticResolver, TestApp,
};

async fn whoami(ctx: RequestContext) -> String {
    ctx.profile(DEFAULT_PROFILE_KEY)
        .map(|p| p.user_id.clone())
        .unwrap_or_else(|| "anonymous".into())
}

fn resolver() -> StaticResolver {
    StaticResolver::default()
        .with("staff-token", profile_with_roles("u-staff", &["staff"]))
        .with("multi-token", profile_with_roles("u-multi", &["one", "some", "more"]))
        .with("empty-token", profile_with_roles("u-empty", &[]))
}

fn app<R: rolegate_security::ProfileResolver + 'static>(filter: RoleFilter<R>, roles: &[&str]) -> TestApp {
    TestApp::new(
        Router::new()
            .route("/", get(whoami))
            .route("/preflight", options(whoami))
            .layer(filter.restrict_to(roles.iter().copied())),
    )
}

#[tokio::test]
async fn matching_role_passes_with_profile_in_context() {
    let app = app(RoleFilter::new(Arc::new(resolver())), &["staff", "manager"]);
    let resp = app.get("/").bearer("staff-token").send().await.assert_ok();
    assert_eq!(resp.text(), "u-staff");
}

#[tokio::test]
async fn any_intersection_is_enough() {
    let app = app(RoleFilter::new(Arc::new(resolver())), &["more", "other"]);
    app.get("/").bearer("multi-token").send().await.assert_ok();
}

#[tokio::test]
async fn no_intersection_is_rejected() {
    let app = app(RoleFilter::new(Arc::new(resolver())), &["two"]);
    app.get("/").bearer("multi-token").send().await.assert_rejected();
}

#[tokio::test]
async fn profile_without_roles_is_rejected() {
    let app = app(RoleFilter::new(Arc::new(resolver())), &[""]);
    app.get("/").bearer("empty-token").send().await.assert_rejected();
}

#[tokio::test]
async fn resolver_errors_are_rejected_opaquely() {
    let app = app(RoleFilter::new(Arc::new(FailingResolver::undecodable())), &["staff"]);
    app.get("/").bearer("anything").send().await.assert_rejected();
}

#[tokio::test]
async fn missing_header_resolves_the_empty_credential() {
    let spy = Arc::new(SpyResolver::new(resolver()));
    let app = app(RoleFilter::new(spy.clone()), &["staff"]);

    app.get("/").send().await.assert_rejected();
    assert_eq!(spy.seen(), vec![String::new()]);
}

#[tokio::test]
async fn empty_role_list_passes_everything_untouched() {
    let counting = Arc::new(CountingResolver::new(FailingResolver::unauthorized()));
    let app = app(RoleFilter::new(counting.clone()), &[]);

    let resp = app.get("/").send().await.assert_ok();
    assert_eq!(resp.text(), "anonymous");
    app.get("/").bearer("whatever").send().await.assert_ok();
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn options_bypasses_the_filter() {
    let counting = Arc::new(CountingResolver::new(FailingResolver::unauthorized()));
    let app = app(RoleFilter::new(counting.clone()), &["staff"]);

    let resp = app.options("/preflight").send().await.assert_ok();
    assert_eq!(resp.text(), "anonymous");
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn custom_key_stores_the_profile_there() {
    async fn by_key(ctx: RequestContext) -> String {
        let default = ctx.profile(DEFAULT_PROFILE_KEY).is_some();
        let custom = ctx.profile("me").map(|p| p.user_id.clone()).unwrap_or_default();
        format!("{default}:{custom}")
    }

    let filter = RoleFilter::with_key(Arc::new(resolver()), "me");
    let app = TestApp::new(
        Router::new()
            .route("/", get(by_key))
            .layer(filter.restrict_to(["staff"])),
    );

    let resp = app.get("/").bearer("staff-token").send().await.assert_ok();
    assert_eq!(resp.text(), "false:u-staff");
}

#[tokio::test]
async fn context_extractor_reads_the_stashed_credential() {
    let spy = Arc::new(SpyResolver::new(resolver()));
    let filter = RoleFilter::custom(spy.clone(), DEFAULT_PROFILE_KEY, context_token("jwt"));
    let app = app(filter, &["staff"]);

    let resp = app
        .get("/")
        .bearer("ignored")
        .stash("jwt", "staff-token")
        .send()
        .await
        .assert_ok();
    assert_eq!(resp.text(), "u-staff");
    assert_eq!(spy.seen(), vec!["staff-token".to_string()]);
}

#[tokio::test]
async fn stashed_values_survive_next_to_the_profile() {
    async fn both(ctx: RequestContext) -> String {
        let raw = ctx.raw("jwt").map(|b| b.len()).unwrap_or(0);
        format!("{raw}:{}", ctx.profile(DEFAULT_PROFILE_KEY).is_some())
    }

    let filter = RoleFilter::custom(Arc::new(resolver()), DEFAULT_PROFILE_KEY, context_token("jwt"));
    let app = TestApp::new(
        Router::new()
            .route("/", get(both))
            .layer(filter.restrict_to(["staff"])),
    );

    let resp = app.get("/").stash("jwt", "staff-token").send().await.assert_ok();
    assert_eq!(resp.text(), "11:true");
}

#[tokio::test]
async fn one_filter_serves_routes_with_different_roles() {
    let filter = RoleFilter::new(Arc::new(resolver()));
    let app = TestApp::new(
        Router::new()
            .route("/staff", get(whoami).layer(filter.restrict_to(["staff"])))
            .route("/one", get(whoami).layer(filter.restrict_to(["one"]))),
    );

    app.get("/staff").bearer("staff-token").send().await.assert_ok();
    app.get("/one").bearer("staff-token").send().await.assert_rejected();
    app.get("/one").bearer("multi-token").send().await.assert_ok();
}

#[tokio::test]
async fn policy_decides_without_tower() {
    let filter = RoleFilter::new(Arc::new(resolver()));
    let policy = filter.policy(["staff"]);

    let req = Request::builder()
        .method(Method::GET)
        .header("authorization", "Bearer staff-token")
        .body(())
        .unwrap();
    let (parts, _) = req.into_parts();
    let profile: Option<Profile> = policy.authorize(&parts).await.unwrap();
    assert_eq!(profile.map(|p| p.user_id), Some("u-staff".to_string()));

    let (parts, _) = Request::builder()
        .method(Method::OPTIONS)
        .body(())
        .unwrap()
        .into_parts();
    assert!(policy.authorize(&parts).await.unwrap().is_none());

    let (parts, _) = Request::new(()).into_parts();
    assert!(policy.authorize(&parts).await.unwrap_err().is_unauthorized());
}

#[test]
fn filter_accessors() {
    let filter = RoleFilter::with_key(Arc::new(resolver()), "k");
    assert_eq!(filter.profile_key(), "k");
    let layer = filter.restrict_to(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
    assert_eq!(layer.policy().required().len(), 2);
    assert!(!layer.policy().is_open());
    assert!(filter.restrict_to(Vec::<String>::new()).policy().is_open());
}
