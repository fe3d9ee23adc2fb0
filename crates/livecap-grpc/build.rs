fn main() -> Result<(), Box<dyn std::error::Error>> {
    match tonic_build::configure()
        .build_server(false)
        .compile(&["proto/speech.proto"], &["proto"])
    {
        Ok(()) => Ok(()),
        // protoc is not installed; fall back to the vendored pre-generated
        // code so the crate still builds offline.
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let out_dir = std::env::var("OUT_DIR")?;
            std::fs::copy(
                "generated/google.cloud.speech.v2.rs",
                std::path::Path::new(&out_dir).join("google.cloud.speech.v2.rs"),
            )?;
            println!("cargo:rerun-if-changed=generated/google.cloud.speech.v2.rs");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
