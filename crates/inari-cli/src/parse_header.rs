use crate::{
    args::SignatureScheme,
    util::{error_kaomoji, success_kaomoji},
};

pub fn do_it(header: String, scheme: SignatureScheme) -> miette::Result<()> {
    if scheme != SignatureScheme::Cavage {
        miette::bail!(
            "Only the Cavage scheme is supported at this time. {}",
            error_kaomoji()
        );
    }

    let result = http_signatures::cavage::parse(&header).map(|signature_header| {
        let headers = signature_header.headers.collect::<Vec<_>>().join(" ");
        format!(
            "keyId: {}\nalgorithm: {}\nheaders: {headers}",
            signature_header.key_id,
            signature_header.algorithm.unwrap_or("<unset>"),
        )
    });

    match result {
        Ok(summary) => {
            println!("{summary}");
            println!("✅ Header is valid! {}", success_kaomoji());
            Ok(())
        }
        Err(err) => Err(miette::Error::new(err).with_source_code(header)),
    }
}
