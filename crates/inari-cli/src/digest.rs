use miette::IntoDiagnostic;
use std::path::Path;

pub async fn do_it(file: &Path) -> miette::Result<()> {
    let body = tokio::fs::read(file).await.into_diagnostic()?;
    println!("digest: {}", http_signatures::digest::digest(&body));

    Ok(())
}
