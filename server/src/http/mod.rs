// server/src/http/mod.rs

//! Warp filters mapping HTTP verbs and paths onto repository calls.

pub mod errors;
pub mod handlers;
pub mod routes;

use std::convert::Infallible;
use warp::cors::Builder as CorsBuilder;
use warp::filters::BoxedFilter;
use warp::http::Method;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub use errors::{handle_rejection, ApiError};
pub use handlers::AppState;
pub use routes::{EntityRoute, Mount, Operations, MOUNTS};

const MAX_BODY_BYTES: u64 = 64 * 1024;

type RouteFilter = BoxedFilter<(Response,)>;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn body_bytes() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::bytes())
}

/// The browser frontend is served from another origin.
fn cors() -> CorsBuilder {
    warp::cors()
        .allow_any_origin()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(["content-type"])
}

fn mount_filter(mount: &'static Mount, state: &AppState) -> Option<RouteFilter> {
    let route: &'static EntityRoute = mount.route;
    let ops = mount.operations;
    let collection = warp::path(mount.path).and(warp::path::end());
    let member = warp::path(mount.path)
        .and(warp::path::param::<String>())
        .and(warp::path::end());
    let mut filters: Vec<RouteFilter> = Vec::new();

    if ops.list {
        filters.push(
            collection
                .clone()
                .and(warp::get())
                .and(with_state(state.clone()))
                .and_then(move |state: AppState| handlers::list(route, state))
                .boxed(),
        );
    }
    if ops.create {
        filters.push(
            collection
                .and(warp::post())
                .and(body_bytes())
                .and(with_state(state.clone()))
                .and_then(move |body: Bytes, state: AppState| handlers::create(route, body, state))
                .boxed(),
        );
    }
    if ops.get {
        filters.push(
            member
                .clone()
                .and(warp::get())
                .and(with_state(state.clone()))
                .and_then(move |id: String, state: AppState| handlers::get(route, id, state))
                .boxed(),
        );
    }
    if ops.update {
        filters.push(
            member
                .clone()
                .and(warp::put().or(warp::patch()).unify())
                .and(body_bytes())
                .and(with_state(state.clone()))
                .and_then(move |id: String, body: Bytes, state: AppState| {
                    handlers::update(route, id, body, state)
                })
                .boxed(),
        );
    }
    if ops.delete {
        filters.push(
            member
                .and(warp::delete())
                .and(with_state(state.clone()))
                .and_then(move |id: String, state: AppState| handlers::delete(route, id, state))
                .boxed(),
        );
    }

    filters.into_iter().reduce(|acc, next| acc.or(next).unify().boxed())
}

/// The full API: `/healthz` plus every entry of [`MOUNTS`], behind CORS, with
/// warp's own rejections rendered as JSON errors.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let health = warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health)
        .boxed();

    MOUNTS
        .iter()
        .filter_map(|mount| mount_filter(mount, &state))
        .fold(health, |acc, next| acc.or(next).unify().boxed())
        .with(cors())
        .recover(handle_rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::repository::EntityRepository;
    use lib::storage_engine::InMemoryStorage;
    use schema::SchemaService;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use warp::http::StatusCode;

    const FRONTEND_ORIGIN: &str = "http://localhost:3000";

    fn api() -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + 'static {
        let schema = Arc::new(SchemaService::new().unwrap());
        let repository = EntityRepository::new(schema, Arc::new(InMemoryStorage::new()));
        routes(AppState::new(repository))
    }

    fn body_of(response: &warp::http::Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn patient() -> Value {
        json!({
            "first_name": "A",
            "last_name": "B",
            "date_of_birth": "1980-01-15",
            "gender": "F",
            "contact_info": "555-0100",
            "address": "12 Elm St"
        })
    }

    #[tokio::test]
    async fn health_check() {
        let res = warp::test::request().path("/healthz").reply(&api()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"ok");
    }

    #[tokio::test]
    async fn register_update_and_delete_a_patient() {
        let api = api();

        let res = warp::test::request()
            .method("POST")
            .path("/registration")
            .json(&patient())
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = body_of(&res);
        assert_eq!(body["message"], json!("Patient registered successfully!"));
        assert_eq!(body["patient"]["patient_id"], json!(1));

        let res = warp::test::request()
            .method("PATCH")
            .path("/patients/1")
            .json(&json!({"last_name": "C"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_of(&res);
        assert_eq!(body["message"], json!("Patient updated successfully"));
        assert_eq!(body["patient"]["last_name"], json!("C"));
        assert_eq!(body["patient"]["first_name"], json!("A"));

        let res = warp::test::request()
            .method("PUT")
            .path("/patient/1")
            .json(&json!({"address": "99 Oak Ave"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = warp::test::request().method("DELETE").path("/patients/1").reply(&api).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_of(&res)["patient"]["address"], json!("99 Oak Ave"));

        let res = warp::test::request().path("/patients/1").reply(&api).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(&res), json!({"error": "Patient not found"}));
    }

    #[tokio::test]
    async fn validation_failures_are_bad_requests() {
        let api = api();
        warp::test::request()
            .method("POST")
            .path("/patients")
            .json(&patient())
            .reply(&api)
            .await;

        let bodies = [
            json!({}),
            json!({"patient_id": 2}),
            json!({"last_name = 'x'": 1}),
            json!([1]),
        ];
        for body in bodies {
            let res = warp::test::request()
                .method("PUT")
                .path("/patients/1")
                .json(&body)
                .reply(&api)
                .await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {}", body);
            assert!(body_of(&res)["error"].is_string());
        }

        let res = warp::test::request()
            .method("PUT")
            .path("/patients/abc")
            .json(&json!({"last_name": "C"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = warp::test::request()
            .method("PUT")
            .path("/patients/999")
            .json(&json!({"last_name": "C"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scheduling_is_an_alias_for_appointments() {
        let api = api();
        let res = warp::test::request()
            .method("POST")
            .path("/scheduling")
            .json(&json!({
                "patient_id": 1,
                "staff_id": 1,
                "appointment_date": "2026-07-01T09:00:00"
            }))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = body_of(&res);
        assert_eq!(body["message"], json!("Appointment scheduled successfully!"));
        assert_eq!(body["appointment"]["status"], json!("Pending"));

        let res = warp::test::request()
            .method("PUT")
            .path("/appointments/1")
            .json(&json!({"status": "Archived"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = warp::test::request().path("/scheduling").reply(&api).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_of(&res).as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn staff_listing_and_read_only_verbs() {
        let api = api();
        let res = warp::test::request().path("/staff").reply(&api).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(&res), json!({"error": "No staff data found"}));

        let res = warp::test::request()
            .method("POST")
            .path("/staff")
            .json(&json!({"first_name": "M", "last_name": "Grey", "position": "Surgeon"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(body_of(&res)["staff"]["contact_info"], Value::Null);

        let res = warp::test::request()
            .method("DELETE")
            .path("/staff/1")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn medical_records_use_their_own_field_names() {
        let api = api();
        let res = warp::test::request()
            .method("POST")
            .path("/medical-records")
            .json(&json!({"patient_id": 1, "diagnosis": "Flu"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(body_of(&res)["newRecord"]["record_id"], json!(1));

        let res = warp::test::request()
            .method("PUT")
            .path("/medical-records/1")
            .json(&json!({"treatment": "Rest"}))
            .reply(&api)
            .await;
        let body = body_of(&res);
        assert_eq!(body["message"], json!("Medical record updated!"));
        assert_eq!(body["record"]["treatment"], json!("Rest"));

        let res = warp::test::request()
            .method("PATCH")
            .path("/medical-records/77")
            .json(&json!({"treatment": "Rest"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(&res), json!({"error": "Medical record not found"}));
    }

    #[tokio::test]
    async fn billing_requires_its_amounts() {
        let res = warp::test::request()
            .method("POST")
            .path("/billing")
            .json(&json!({"patient_id": 1, "billing_date": "2026-05-01"}))
            .reply(&api())
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(&res),
            json!({"error": "Missing required fields: amount_due, outstanding_balance"})
        );
    }

    #[tokio::test]
    async fn browser_preflight_and_cross_origin_reads() {
        let api = api();
        let res = warp::test::request()
            .method("OPTIONS")
            .path("/patients/1")
            .header("origin", FRONTEND_ORIGIN)
            .header("access-control-request-method", "PUT")
            .header("access-control-request-headers", "content-type")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("access-control-allow-origin"));
        let methods = res.headers()["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("PUT"));
        assert!(methods.contains("DELETE"));

        let res = warp::test::request()
            .path("/patients")
            .header("origin", FRONTEND_ORIGIN)
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("access-control-allow-origin"));

        let res = warp::test::request()
            .method("OPTIONS")
            .path("/patients/1")
            .header("origin", FRONTEND_ORIGIN)
            .header("access-control-request-method", "TRACE")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(body_of(&res)["error"].is_string());
    }

    #[tokio::test]
    async fn deleting_an_absent_key_is_a_json_404() {
        let res = warp::test::request()
            .method("DELETE")
            .path("/patients/41")
            .reply(&api())
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(&res), json!({"error": "Patient not found"}));
    }

    #[tokio::test]
    async fn unknown_paths_are_json_404s() {
        let res = warp::test::request().path("/pharmacy").reply(&api()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(&res), json!({"error": "Not found"}));
    }
}
