use crate::{
    args::SignArgs,
    util::{error_kaomoji, success_kaomoji},
};
use bytes::Bytes;
use http::{header::CONTENT_TYPE, Method, Request};
use http_signatures::{cavage::easy, crypto, Clock};
use inari_federation::config::Configuration;
use inari_http_client::Body;
use miette::IntoDiagnostic;
use tokio::fs;

const ACTIVITY_JSON: &str = "application/activity+json";

pub async fn do_it(args: SignArgs) -> miette::Result<()> {
    let pem = fs::read_to_string(&args.key).await.into_diagnostic()?;
    let key = crypto::parse::private_key(&pem)?;

    let body = match args.body {
        Some(ref path) => Bytes::from(fs::read(path).await.into_diagnostic()?),
        None => Bytes::new(),
    };

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes()).into_diagnostic()?;
    let mut builder = Request::builder().method(method).uri(args.url.as_str());
    if !body.is_empty() {
        builder = builder.header(CONTENT_TYPE, ACTIVITY_JSON);
    }
    let request = builder.body(body).into_diagnostic()?;

    if !args.send {
        let request = easy::sign(request, &args.key_id, key, &Clock::new())
            .await
            .into_diagnostic()?;

        for (name, value) in request.headers() {
            println!("{name}: {}", value.to_str().into_diagnostic()?);
        }

        return Ok(());
    }

    let config = match args.config {
        Some(ref path) => Configuration::load(path)
            .await
            .map_err(|err| miette::miette!("{err:?}"))?,
        None => Configuration::default(),
    };
    let client = config
        .http_client
        .client_builder()
        .into_diagnostic()?
        .build()
        .into_diagnostic()?;

    let response = client
        .execute_signed(request.map(Body::data), &args.key_id, key)
        .await
        .into_diagnostic()?;

    let status = response.status();
    let text = response.text().await.into_diagnostic()?;
    println!("{status}");
    if !text.is_empty() {
        println!("{text}");
    }

    if status.is_success() {
        println!("Delivered! {}", success_kaomoji());
    } else {
        miette::bail!("Remote server answered with {status} {}", error_kaomoji());
    }

    Ok(())
}
