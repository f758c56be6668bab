fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/payment.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/payment.proto"], &["proto"])?;
    Ok(())
}
