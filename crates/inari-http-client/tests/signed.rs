use bytes::Bytes;
use core::convert::Infallible;
use http::StatusCode;
use http_body_util::Empty;
use http_signatures::{cavage, crypto, Clock};
use hyper::{Request, Response};
use inari_http_client::{Body, Client};
use std::{
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};
use tower::service_fn;

const KEY_ID: &str = "https://a.example/users/alice#main-key";

fn check(req: &Request<Body>, public_key: &crypto::parse::PublicKey) -> bool {
    let Some(header) = req.headers().get("signature") else {
        return false;
    };
    let Ok(signature_header) = cavage::parse(header.to_str().unwrap()) else {
        return false;
    };
    let Ok(signature_string) = cavage::signature_string::construct(req, &signature_header) else {
        return false;
    };

    let digest = req.headers()["digest"].to_str().unwrap();
    http_signatures::digest::matches(digest, req.body().as_bytes())
        && crypto::verify(
            signature_string.as_bytes(),
            signature_header.signature,
            public_key,
        )
        .is_ok()
}

#[tokio::test]
async fn signed_delivery() {
    let key_pair = crypto::generate::generate().unwrap();
    let private_key = crypto::parse::private_key(&key_pair.private_key_pem).unwrap();
    let public_key = Arc::new(crypto::parse::public_key(&key_pair.public_key_pem).unwrap());

    let service = service_fn(move |req: Request<Body>| {
        let public_key = Arc::clone(&public_key);
        async move {
            assert_eq!(req.headers()["host"], "b.example");
            assert_eq!(req.headers()["date"], "Tue, 14 Nov 2023 22:13:20 GMT");

            let status = if check(&req, &public_key) {
                StatusCode::ACCEPTED
            } else {
                StatusCode::UNAUTHORIZED
            };

            let mut response = Response::new(Empty::<Bytes>::new());
            *response.status_mut() = status;
            Ok::<_, Infallible>(response)
        }
    });

    let (clock, _handle) = Clock::frozen(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
    let client = Client::builder().clock(clock).service(service);

    let req = Request::post("https://b.example/inbox")
        .header("content-type", "application/activity+json")
        .body(Body::data(r#"{"type":"Like","actor":"https://a.example/users/alice"}"#))
        .unwrap();
    let response = client.execute_signed(req, KEY_ID, private_key).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn unsigned_is_rejected() {
    let key_pair = crypto::generate::generate().unwrap();
    let public_key = Arc::new(crypto::parse::public_key(&key_pair.public_key_pem).unwrap());

    let service = service_fn(move |req: Request<Body>| {
        let public_key = Arc::clone(&public_key);
        async move {
            let mut response = Response::new(Empty::<Bytes>::new());
            if !check(&req, &public_key) {
                *response.status_mut() = StatusCode::UNAUTHORIZED;
            }
            Ok::<_, Infallible>(response)
        }
    });
    let client = Client::builder().service(service);

    let req = Request::post("https://b.example/inbox")
        .body(Body::data("{}"))
        .unwrap();
    let response = client.execute(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
