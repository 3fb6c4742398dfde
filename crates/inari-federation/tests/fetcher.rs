use bytes::Bytes;
use core::convert::Infallible;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use http_signatures::{cavage::easy, crypto, Clock};
use inari_federation::{ap::Activity, fetcher::ACTIVITY_JSON, HttpKeyFetcher, KeyFetcher, Verifier};
use inari_http_client::{Body, Client};
use tower::service_fn;
use url::Url;

const ALICE: &str = "https://a.example/users/alice";

fn actor_json(public_key_pem: &str) -> String {
    format!(
        r#"{{
            "@context": ["https://www.w3.org/ns/activitystreams", "https://w3id.org/security/v1"],
            "id": "{ALICE}",
            "type": "Person",
            "preferredUsername": "alice",
            "inbox": "{ALICE}/inbox",
            "publicKey": {{
                "id": "{ALICE}#main-key",
                "owner": "{ALICE}",
                "publicKeyPem": {}
            }}
        }}"#,
        sonic_rs::to_string(public_key_pem).unwrap()
    )
}

fn client_serving(status: StatusCode, body: String) -> Client {
    let service = service_fn(move |req: Request<Body>| {
        let body = body.clone();
        async move {
            assert_eq!(req.uri(), ALICE);
            assert_eq!(req.headers()["accept"], ACTIVITY_JSON);

            let mut response = Response::new(Full::new(Bytes::from(body)));
            *response.status_mut() = status;
            Ok::<_, Infallible>(response)
        }
    });

    Client::builder().service(service)
}

#[tokio::test]
async fn fetches_actor() {
    let client = client_serving(StatusCode::OK, actor_json("PEM"));
    let fetcher = HttpKeyFetcher::builder().client(client).build();

    let actor = fetcher.fetch(&Url::parse(ALICE).unwrap()).await.unwrap();
    assert_eq!(actor.id, ALICE);
    assert_eq!(actor.public_key.public_key_pem, "PEM");
}

#[tokio::test]
async fn not_found() {
    let client = client_serving(StatusCode::NOT_FOUND, String::new());
    let fetcher = HttpKeyFetcher::builder().client(client).build();

    assert!(fetcher.fetch(&Url::parse(ALICE).unwrap()).await.is_err());
}

#[tokio::test]
async fn not_an_actor() {
    let client = client_serving(StatusCode::OK, r#"{"id":"https://a.example/users/alice"}"#.into());
    let fetcher = HttpKeyFetcher::builder().client(client).build();

    assert!(fetcher.fetch(&Url::parse(ALICE).unwrap()).await.is_err());
}

#[tokio::test]
async fn alice_delivers_to_bob() {
    let key_pair = crypto::generate::generate().unwrap();
    let client = client_serving(StatusCode::OK, actor_json(&key_pair.public_key_pem));
    let verifier = Verifier::builder()
        .fetcher(HttpKeyFetcher::builder().client(client).build())
        .build();

    let body = format!(
        r#"{{"@context":"https://www.w3.org/ns/activitystreams","type":"Follow","actor":"{ALICE}","object":"https://b.example/users/bob"}}"#
    );
    let request = Request::post("https://b.example/inbox")
        .header("content-type", "application/activity+json")
        .body(Bytes::from(body))
        .unwrap();
    let key = crypto::parse::private_key(&key_pair.private_key_pem).unwrap();
    let request = easy::sign(request, &format!("{ALICE}#main-key"), key, &Clock::new())
        .await
        .unwrap();

    let accepted = verifier
        .verify::<Activity, _>(request.map(Full::new))
        .await
        .unwrap();
    assert_eq!(accepted.actor.as_str(), ALICE);
    assert_eq!(accepted.body.r#type.as_deref(), Some("Follow"));
}
