use crate::util::success_kaomoji;
use miette::IntoDiagnostic;
use std::path::Path;
use tokio::fs;

pub async fn do_it(out_dir: &Path) -> miette::Result<()> {
    let key_pair = tokio::task::spawn_blocking(http_signatures::crypto::generate::generate)
        .await
        .into_diagnostic()??;

    fs::create_dir_all(out_dir).await.into_diagnostic()?;

    let private_key_path = out_dir.join("private.pem");
    let public_key_path = out_dir.join("public.pem");
    fs::write(&private_key_path, key_pair.private_key_pem)
        .await
        .into_diagnostic()?;
    fs::write(&public_key_path, key_pair.public_key_pem)
        .await
        .into_diagnostic()?;

    println!(
        "Wrote {} and {} {}",
        private_key_path.display(),
        public_key_path.display(),
        success_kaomoji()
    );

    Ok(())
}
